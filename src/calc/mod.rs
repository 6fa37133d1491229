//! Calculator core: amortized payment and the cost grid.

pub mod grid;
pub mod payment;

pub use grid::*;
pub use payment::*;
