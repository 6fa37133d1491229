//! Output files.
//!
//! - CSV export of the cost grid (`export`)

pub mod export;

pub use export::*;
