//! Shared domain types.
//!
//! Everything in here is plain data: the calculator core (`crate::calc`) takes
//! these by reference and never mutates them, and the front ends rebuild them
//! whenever an input changes.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::AppError;

/// Annual property tax rate used when none is given (percent).
pub const DEFAULT_TAX_PERCENT: f64 = 1.2;

/// Annual home insurance rate used when none is given (percent).
pub const DEFAULT_INSURANCE_PERCENT: f64 = 0.35;

/// Interest rate used when there is neither a manual override nor a live quote (percent).
pub const DEFAULT_RATE_PERCENT: f64 = 6.6;

/// Home prices: $500k to $1.5M inclusive, every $100k.
pub const DEFAULT_PRICE_AXIS: AxisSpec = AxisSpec {
    start: 500_000,
    end: 1_500_000,
    step: 100_000,
};

/// Down payments: $100k to $350k inclusive, every $50k.
pub const DEFAULT_DOWN_PAYMENT_AXIS: AxisSpec = AxisSpec {
    start: 100_000,
    end: 350_000,
    step: 50_000,
};

/// Loan term. Only the two common fixed-rate terms are offered, which keeps
/// the payment count strictly positive by construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum LoanTerm {
    #[value(name = "15")]
    Fifteen,
    #[value(name = "30")]
    #[default]
    Thirty,
}

impl LoanTerm {
    pub fn years(self) -> u32 {
        match self {
            LoanTerm::Fifteen => 15,
            LoanTerm::Thirty => 30,
        }
    }

    /// Total number of monthly payments.
    pub fn payments(self) -> u32 {
        self.years() * 12
    }

    pub fn toggle(self) -> Self {
        match self {
            LoanTerm::Fifteen => LoanTerm::Thirty,
            LoanTerm::Thirty => LoanTerm::Fifteen,
        }
    }
}

/// Immutable inputs for one computation pass.
///
/// All rates are decimal fractions (`0.012` for 1.2%). Use
/// [`ScenarioInputs::from_percentages`] when starting from user-facing values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioInputs {
    pub property_tax_rate: f64,
    pub insurance_rate: f64,
    pub term: LoanTerm,
    pub interest_rate: f64,
}

impl ScenarioInputs {
    /// Build a scenario from percentages, rejecting negative or non-finite values.
    pub fn from_percentages(
        tax_percent: f64,
        insurance_percent: f64,
        term: LoanTerm,
        rate_percent: f64,
    ) -> Result<Self, AppError> {
        Ok(Self {
            property_tax_rate: percent_to_fraction("property tax rate", tax_percent)?,
            insurance_rate: percent_to_fraction("insurance rate", insurance_percent)?,
            term,
            interest_rate: percent_to_fraction("interest rate", rate_percent)?,
        })
    }
}

fn percent_to_fraction(name: &str, percent: f64) -> Result<f64, AppError> {
    if !percent.is_finite() || percent < 0.0 {
        return Err(AppError::config(
            format!("Invalid {name}: {percent}% (must be a non-negative number)."),
        ));
    }
    Ok(percent / 100.0)
}

/// Range definition for one grid axis: `start..=end` every `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSpec {
    pub start: u64,
    pub end: u64,
    pub step: u64,
}

/// Which dimension an axis describes; only affects labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisKind {
    Price,
    DownPayment,
}

impl AxisKind {
    /// Short `$500k` / `Down 100k` form for whole thousands, exact digits
    /// (`$500,500`) otherwise so distinct values never share a label.
    pub fn label(self, value: u64) -> String {
        let amount = if value % 1000 == 0 {
            format!("{}k", value / 1000)
        } else {
            group_thousands(value)
        };
        match self {
            AxisKind::Price => format!("${amount}"),
            AxisKind::DownPayment => format!("Down {amount}"),
        }
    }
}

/// `1234567` -> `1,234,567`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// A fixed, ordered sequence of whole-currency values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Axis {
    pub kind: AxisKind,
    pub values: Vec<u64>,
}

impl Axis {
    pub fn from_spec(kind: AxisKind, spec: AxisSpec) -> Result<Self, AppError> {
        if spec.step == 0 {
            return Err(AppError::config("Axis step must be greater than zero."));
        }
        if spec.end < spec.start {
            return Err(AppError::config(
                format!("Axis end ({}) is below its start ({}).", spec.end, spec.start),
            ));
        }
        let values = (spec.start..=spec.end).step_by(spec.step as usize).collect();
        Ok(Self { kind, values })
    }

    pub fn prices() -> Self {
        Self::stepped(AxisKind::Price, DEFAULT_PRICE_AXIS)
    }

    pub fn down_payments() -> Self {
        Self::stepped(AxisKind::DownPayment, DEFAULT_DOWN_PAYMENT_AXIS)
    }

    // Only for the compile-time defaults, which are known to be well formed.
    fn stepped(kind: AxisKind, spec: AxisSpec) -> Self {
        let values = (spec.start..=spec.end).step_by(spec.step as usize).collect();
        Self { kind, values }
    }

    pub fn labels(&self) -> Vec<String> {
        self.values.iter().map(|&v| self.kind.label(v)).collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Unrounded components of one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBreakdown {
    pub principal: f64,
    pub mortgage: f64,
    pub tax: f64,
    pub insurance: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.mortgage + self.tax + self.insurance
    }

    /// Whole currency units, half away from zero.
    pub fn rounded_total(&self) -> u64 {
        self.total().round().max(0.0) as u64
    }
}

/// Labeled table of total monthly costs.
///
/// `rows[i][j]` is the cell for `row_labels[i]` × `column_labels[j]`. As built by
/// [`crate::calc::build_grid`], rows are down payments and columns are prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostGrid {
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    pub rows: Vec<Vec<u64>>,
}

impl CostGrid {
    /// `(rows, columns)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.row_labels.len(), self.column_labels.len())
    }

    pub fn get(&self, row: usize, column: usize) -> Option<u64> {
        self.rows.get(row).and_then(|r| r.get(column)).copied()
    }

    /// Swap rows and columns (price-major presentation).
    pub fn transposed(&self) -> CostGrid {
        let (n_rows, n_cols) = self.dimensions();
        let rows = (0..n_cols)
            .map(|c| (0..n_rows).map(|r| self.rows[r][c]).collect())
            .collect();
        CostGrid {
            row_labels: self.column_labels.clone(),
            column_labels: self.row_labels.clone(),
            rows,
        }
    }
}

/// Validated, user-facing configuration shared by the CLI and the TUI.
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    pub tax_percent: f64,
    pub insurance_percent: f64,
    pub term: LoanTerm,
    /// Manual override; when `None` the live quote (or the default) is used.
    pub manual_rate_percent: Option<f64>,
    /// Skip the live fetch entirely.
    pub offline: bool,
    pub prices: AxisSpec,
    pub down_payments: AxisSpec,
    /// Present prices as rows instead of columns.
    pub transpose: bool,
    pub export: Option<PathBuf>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tax_percent: DEFAULT_TAX_PERCENT,
            insurance_percent: DEFAULT_INSURANCE_PERCENT,
            term: LoanTerm::default(),
            manual_rate_percent: None,
            offline: false,
            prices: DEFAULT_PRICE_AXIS,
            down_payments: DEFAULT_DOWN_PAYMENT_AXIS,
            transpose: false,
            export: None,
        }
    }
}

impl GridConfig {
    pub fn price_axis(&self) -> Result<Axis, AppError> {
        Axis::from_spec(AxisKind::Price, self.prices)
    }

    pub fn down_payment_axis(&self) -> Result<Axis, AppError> {
        Axis::from_spec(AxisKind::DownPayment, self.down_payments)
    }
}
