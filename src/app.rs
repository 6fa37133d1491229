//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs the log subscriber
//! - resolves the interest rate
//! - prints, exports, or hands over to the TUI

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use tracing::Level;

use crate::cli::{Command, GridArgs, GridCommandArgs, OutputFormat};
use crate::data::{EnvSecrets, LiveRate, MortgageRateClient, RateProvider};
use crate::domain::{AxisSpec, GridConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `hgrid` binary.
pub fn run() -> Result<(), AppError> {
    // `hgrid` and `hgrid --rate 6` behave like `hgrid tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let to_terminal = !matches!(cli.command, Command::Tui(_));
    init_tracing(cli.verbose, cli.log_file.as_deref(), to_terminal)?;

    match cli.command {
        Command::Grid(args) => handle_grid(args),
        Command::Rate => handle_rate(),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_grid(cmd: GridCommandArgs) -> Result<(), AppError> {
    let config = grid_config_from_args(&cmd.grid);
    let secrets = EnvSecrets::load();
    let run = pipeline::run_grid(&config, &secrets)?;
    let table = run.presented();

    match cmd.format {
        OutputFormat::Table => {
            println!("{}", crate::report::format_run_summary(&run.rate, &run.scenario));
            println!("{}", crate::report::format_grid_table(&table));
        }
        OutputFormat::Csv => {
            crate::io::write_grid_csv_to(io::stdout().lock(), &table)?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&table)
                .map_err(|e| AppError::runtime(format!("Failed to serialize grid: {e}")))?;
            println!("{json}");
        }
    }

    if let Some(path) = &config.export {
        crate::io::write_grid_csv(path, &table)?;
        eprintln!("Wrote {}", path.display());
    }

    Ok(())
}

fn handle_rate() -> Result<(), AppError> {
    let secrets = EnvSecrets::load();
    let client = MortgageRateClient::from_secrets(&secrets)?;
    let quote = client.fetch_rate()?;
    println!("{:.2}", quote.percent);
    Ok(())
}

fn handle_tui(args: GridArgs) -> Result<(), AppError> {
    let config = grid_config_from_args(&args);
    check_config(&config)?;
    crate::tui::run(config)
}

/// Reject inputs no TUI control can repair (axes, tax, insurance, manual
/// rate) before taking over the terminal.
fn check_config(config: &GridConfig) -> Result<(), AppError> {
    pipeline::run_grid_with_live(config, LiveRate::Skipped).map(|_| ())
}

pub fn grid_config_from_args(args: &GridArgs) -> GridConfig {
    GridConfig {
        tax_percent: args.tax,
        insurance_percent: args.insurance,
        term: args.term,
        manual_rate_percent: args.rate,
        offline: args.offline,
        prices: AxisSpec {
            start: args.price_min,
            end: args.price_max,
            step: args.price_step,
        },
        down_payments: AxisSpec {
            start: args.down_min,
            end: args.down_max,
            step: args.down_step,
        },
        transpose: args.transpose,
        export: args.export.clone(),
    }
}

/// Install the `fmt` subscriber.
///
/// One-shot commands log to stderr. The TUI owns the terminal, so it only
/// logs when `--log-file` is given.
fn init_tracing(verbose: u8, log_file: Option<&Path>, to_terminal: bool) -> Result<(), AppError> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    if let Some(path) = log_file {
        let file = File::create(path)
            .map_err(|e| AppError::config(format!("Failed to create log file '{}': {e}", path.display())))?;
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if to_terminal {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(io::stderr)
            .init();
    }

    Ok(())
}

/// Rewrite argv so `hgrid` defaults to `hgrid tui`.
///
/// Rules:
/// - `hgrid`                        -> `hgrid tui`
/// - `hgrid --term 15 ...`          -> `hgrid tui --term 15 ...`
/// - `hgrid -v grid ...`            -> unchanged (a subcommand follows the flags)
/// - `hgrid --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = |arg: &str| matches!(arg, "grid" | "rate" | "tui");
    if argv[1..].iter().any(|arg| is_subcommand(arg)) {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
