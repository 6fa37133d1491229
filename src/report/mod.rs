//! Terminal reports: run summary and the cost table.

pub mod format;

pub use format::*;
