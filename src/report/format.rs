//! Formatted terminal output.
//!
//! Formatting lives here so the calculator core stays free of presentation
//! concerns and output changes stay in one file.

use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Table};

use crate::data::ResolvedRate;
use crate::domain::{CostGrid, ScenarioInputs, group_thousands};

/// Rate banner plus the scenario inputs used for the pass.
pub fn format_run_summary(rate: &ResolvedRate, scenario: &ScenarioInputs) -> String {
    let mut out = String::new();

    out.push_str("=== hgrid - Expected Monthly Housing Costs ===\n");
    if rate.is_warning() {
        out.push_str("warning: ");
    }
    out.push_str(&rate.banner());
    out.push('\n');
    out.push_str(&rate.summary());
    out.push('\n');
    out.push_str(&format!(
        "Property tax: {:.2}% | Insurance: {:.2}% | Term: {}y\n",
        scenario.property_tax_rate * 100.0,
        scenario.insurance_rate * 100.0,
        scenario.term.years(),
    ));

    out
}

/// Render the grid as an ASCII table with currency cells.
pub fn format_grid_table(grid: &CostGrid) -> String {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);

    let mut header = vec![Cell::new("")];
    header.extend(
        grid.column_labels
            .iter()
            .map(|l| Cell::new(l).add_attribute(Attribute::Bold).set_alignment(CellAlignment::Right)),
    );
    table.set_header(header);

    for (label, row) in grid.row_labels.iter().zip(&grid.rows) {
        let mut cells = vec![Cell::new(label).add_attribute(Attribute::Bold)];
        cells.extend(
            row.iter()
                .map(|&v| Cell::new(fmt_currency(v)).set_alignment(CellAlignment::Right)),
        );
        table.add_row(cells);
    }

    table.to_string()
}

/// `3201` -> `$3,201`.
pub fn fmt_currency(value: u64) -> String {
    format!("${}", group_thousands(value))
}
