//! Domain types used throughout the calculator.
//!
//! This module defines:
//!
//! - scenario inputs (`ScenarioInputs`, `LoanTerm`)
//! - grid axes (`Axis`, `AxisSpec`, `AxisKind`)
//! - computed output (`CostGrid`, `CostBreakdown`)
//! - the user-facing configuration (`GridConfig`)

pub mod types;

pub use types::*;
