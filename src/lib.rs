//! `housing-grid` library crate.
//!
//! The binary (`hgrid`) is a thin wrapper around this library so that:
//!
//! - the calculator core is testable without spawning processes
//! - the rate boundary can be swapped out (tests use a stub provider)
//! - the CLI and TUI share one pipeline

pub mod app;
pub mod calc;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
pub mod tui;
