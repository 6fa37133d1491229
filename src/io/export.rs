//! Export the cost grid to CSV.
//!
//! Layout mirrors the on-screen table: the header row is an empty corner cell
//! followed by the column labels, and every data row starts with its row label.
//! Cells are whole currency units.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::domain::CostGrid;
use crate::error::AppError;

/// Default file name offered by the TUI export action.
pub const DEFAULT_EXPORT_NAME: &str = "housing_costs.csv";

/// Write the grid as CSV to any writer.
pub fn write_grid_csv_to<W: Write>(writer: W, grid: &CostGrid) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);

    let header = std::iter::once("").chain(grid.column_labels.iter().map(String::as_str));
    wtr.write_record(header)
        .map_err(|e| AppError::config(format!("Failed to write export CSV header: {e}")))?;

    for (label, row) in grid.row_labels.iter().zip(&grid.rows) {
        let record = std::iter::once(label.clone()).chain(row.iter().map(u64::to_string));
        wtr.write_record(record)
            .map_err(|e| AppError::config(format!("Failed to write export CSV row: {e}")))?;
    }

    wtr.flush()
        .map_err(|e| AppError::config(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Render the grid as CSV bytes (UTF-8).
pub fn grid_csv_bytes(grid: &CostGrid) -> Result<Vec<u8>, AppError> {
    let mut buf = Vec::new();
    write_grid_csv_to(&mut buf, grid)?;
    Ok(buf)
}

/// Write the grid to a CSV file, replacing any existing file.
pub fn write_grid_csv(path: &Path, grid: &CostGrid) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_grid_csv_to(file, grid)?;
    info!(path = %path.display(), "exported grid");
    Ok(())
}
