//! Command-line parsing for the housing cost grid.
//!
//! Parsing stays separate from the calculator; `crate::app` turns
//! [`GridArgs`] into a [`crate::domain::GridConfig`].

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::domain::{
    DEFAULT_DOWN_PAYMENT_AXIS, DEFAULT_INSURANCE_PERCENT, DEFAULT_PRICE_AXIS, DEFAULT_TAX_PERCENT, LoanTerm,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hgrid", version, about = "Monthly housing cost grid (mortgage + tax + insurance)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write logs to this file (the TUI logs nowhere otherwise).
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the rate banner and the cost table, optionally exporting CSV.
    Grid(GridCommandArgs),
    /// Print today's live 30-year fixed rate and exit.
    Rate,
    /// Launch the interactive TUI.
    Tui(GridArgs),
}

/// How `hgrid grid` prints the table on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

/// Scenario inputs and grid options.
#[derive(Debug, Parser, Clone)]
pub struct GridArgs {
    /// Annual property tax rate (%).
    #[arg(long, default_value_t = DEFAULT_TAX_PERCENT, value_parser = parse_percent)]
    pub tax: f64,

    /// Annual home insurance rate (%).
    #[arg(long, default_value_t = DEFAULT_INSURANCE_PERCENT, value_parser = parse_percent)]
    pub insurance: f64,

    /// Loan term in years.
    #[arg(long, value_enum, default_value_t = LoanTerm::Thirty)]
    pub term: LoanTerm,

    /// Annual interest rate (%). Defaults to the live rate, else 6.6.
    #[arg(long, value_parser = parse_percent)]
    pub rate: Option<f64>,

    /// Do not contact the rate service.
    #[arg(long)]
    pub offline: bool,

    /// Lowest home price.
    #[arg(long, default_value_t = DEFAULT_PRICE_AXIS.start)]
    pub price_min: u64,

    /// Highest home price (inclusive).
    #[arg(long, default_value_t = DEFAULT_PRICE_AXIS.end)]
    pub price_max: u64,

    /// Home price step.
    #[arg(long, default_value_t = DEFAULT_PRICE_AXIS.step)]
    pub price_step: u64,

    /// Lowest down payment.
    #[arg(long, default_value_t = DEFAULT_DOWN_PAYMENT_AXIS.start)]
    pub down_min: u64,

    /// Highest down payment (inclusive).
    #[arg(long, default_value_t = DEFAULT_DOWN_PAYMENT_AXIS.end)]
    pub down_max: u64,

    /// Down payment step.
    #[arg(long, default_value_t = DEFAULT_DOWN_PAYMENT_AXIS.step)]
    pub down_step: u64,

    /// Show prices as rows and down payments as columns.
    #[arg(long)]
    pub transpose: bool,

    /// Export the table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

/// `hgrid grid`: the shared options plus stdout formatting.
#[derive(Debug, Parser, Clone)]
pub struct GridCommandArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    /// Stdout format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

fn parse_percent(raw: &str) -> Result<f64, String> {
    let v: f64 = raw
        .trim()
        .trim_end_matches('%')
        .parse()
        .map_err(|e| format!("not a number: {e}"))?;
    if !v.is_finite() || v < 0.0 {
        return Err(format!("{v} is not a non-negative percentage"));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_defaults() {
        let cli = Cli::parse_from(["hgrid", "grid"]);
        let Command::Grid(cmd) = cli.command else {
            panic!("expected grid command");
        };
        assert_eq!(cmd.format, OutputFormat::Table);
        let args = cmd.grid;
        assert_eq!(args.tax, 1.2);
        assert_eq!(args.insurance, 0.35);
        assert_eq!(args.term, LoanTerm::Thirty);
        assert_eq!(args.rate, None);
        assert_eq!(args.price_step, 100_000);
    }

    #[test]
    fn format_belongs_to_the_grid_command() {
        let cli = Cli::parse_from(["hgrid", "grid", "--format", "csv", "--offline"]);
        let Command::Grid(cmd) = cli.command else {
            panic!("expected grid command");
        };
        assert_eq!(cmd.format, OutputFormat::Csv);
        assert!(cmd.grid.offline);

        assert!(Cli::try_parse_from(["hgrid", "tui", "--format", "csv"]).is_err());
    }

    #[test]
    fn term_accepts_years() {
        let cli = Cli::parse_from(["hgrid", "tui", "--term", "15", "--rate", "5.5%", "-vv"]);
        let Command::Tui(args) = cli.command else {
            panic!("expected tui command");
        };
        assert_eq!(args.term, LoanTerm::Fifteen);
        assert_eq!(args.rate, Some(5.5));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn rejects_negative_and_unknown_terms() {
        assert!(Cli::try_parse_from(["hgrid", "grid", "--tax", "-1"]).is_err());
        assert!(Cli::try_parse_from(["hgrid", "grid", "--term", "20"]).is_err());
    }
}
