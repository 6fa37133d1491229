//! Shared grid pipeline used by both the CLI and the TUI.
//!
//! live rate lookup -> rate resolution -> scenario -> grid
//!
//! The lookup is split from the rest so the TUI can fetch once and then
//! recompute on every input change without touching the network.

use tracing::{debug, info};

use crate::calc::{build_grid, cost_breakdown};
use crate::data::{LiveRate, MortgageRateClient, RateProvider, ResolvedRate, SecretSource, resolve_rate};
use crate::domain::{Axis, CostBreakdown, CostGrid, GridConfig, ScenarioInputs};
use crate::error::AppError;

/// All computed outputs of a single pass.
#[derive(Debug, Clone)]
pub struct GridRun {
    pub rate: ResolvedRate,
    pub scenario: ScenarioInputs,
    pub prices: Axis,
    pub down_payments: Axis,
    /// Down payments as rows, prices as columns.
    pub grid: CostGrid,
    transpose: bool,
}

impl GridRun {
    /// The grid in the orientation the user asked for.
    pub fn presented(&self) -> CostGrid {
        if self.transpose {
            self.grid.transposed()
        } else {
            self.grid.clone()
        }
    }

    /// `(price, down payment)` behind a cell of [`GridRun::presented`].
    pub fn cell_inputs(&self, row: usize, column: usize) -> Option<(u64, u64)> {
        let (down_idx, price_idx) = if self.transpose { (column, row) } else { (row, column) };
        let price = *self.prices.values.get(price_idx)?;
        let down = *self.down_payments.values.get(down_idx)?;
        Some((price, down))
    }

    /// Unrounded breakdown for a cell of [`GridRun::presented`].
    pub fn cell_breakdown(&self, row: usize, column: usize) -> Option<CostBreakdown> {
        let (price, down) = self.cell_inputs(row, column)?;
        Some(cost_breakdown(price, down, &self.scenario))
    }
}

/// Perform the live lookup (unless offline) using the key from `secrets`.
pub fn fetch_live_rate(config: &GridConfig, secrets: &dyn SecretSource) -> LiveRate {
    if config.offline {
        debug!("offline mode; skipping live rate lookup");
        return LiveRate::Skipped;
    }
    match MortgageRateClient::from_secrets(secrets) {
        Ok(client) => LiveRate::fetch(&client),
        Err(err) => LiveRate::from(Err(err)),
    }
}

/// Fetch and compute in one go.
pub fn run_grid(config: &GridConfig, secrets: &dyn SecretSource) -> Result<GridRun, AppError> {
    let live = fetch_live_rate(config, secrets);
    run_grid_with_live(config, live)
}

/// Same as [`run_grid`] with an explicit provider.
pub fn run_grid_with_provider(config: &GridConfig, provider: &dyn RateProvider) -> Result<GridRun, AppError> {
    let live = if config.offline {
        LiveRate::Skipped
    } else {
        LiveRate::fetch(provider)
    };
    run_grid_with_live(config, live)
}

/// Compute a pass from an already-performed lookup.
pub fn run_grid_with_live(config: &GridConfig, live: LiveRate) -> Result<GridRun, AppError> {
    let rate = resolve_rate(config.manual_rate_percent, live);
    let scenario = ScenarioInputs::from_percentages(
        config.tax_percent,
        config.insurance_percent,
        config.term,
        rate.percent,
    )?;

    let prices = config.price_axis()?;
    let down_payments = config.down_payment_axis()?;
    let grid = build_grid(&prices, &down_payments, &scenario);

    let (rows, cols) = grid.dimensions();
    info!(
        rows,
        cols,
        rate = rate.percent,
        source = rate.source.display_name(),
        "computed cost grid"
    );

    Ok(GridRun {
        rate,
        scenario,
        prices,
        down_payments,
        grid,
        transpose: config.transpose,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MapSecrets, RateSource};
    use crate::domain::DEFAULT_RATE_PERCENT;

    #[test]
    fn missing_key_falls_back_without_network() {
        let config = GridConfig::default();
        let run = run_grid(&config, &MapSecrets::new()).unwrap();
        assert_eq!(run.rate.source, RateSource::Default);
        assert_eq!(run.rate.percent, DEFAULT_RATE_PERCENT);
        assert!(matches!(run.rate.live, LiveRate::Unavailable(_)));
        assert_eq!(run.grid.get(0, 0), Some(3200));
    }

    #[test]
    fn invalid_manual_rate_is_a_config_error() {
        let config = GridConfig {
            manual_rate_percent: Some(-3.0),
            offline: true,
            ..GridConfig::default()
        };
        let err = run_grid_with_live(&config, LiveRate::Skipped).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
    }

    #[test]
    fn transpose_only_changes_presentation() {
        let config = GridConfig {
            transpose: true,
            ..GridConfig::default()
        };
        let run = run_grid_with_live(&config, LiveRate::Skipped).unwrap();
        assert_eq!(run.grid.dimensions(), (6, 11));
        assert_eq!(run.presented().dimensions(), (11, 6));
        assert_eq!(run.presented().row_labels[0], "$500k");
    }

    #[test]
    fn cell_inputs_follow_orientation() {
        let straight = run_grid_with_live(&GridConfig::default(), LiveRate::Skipped).unwrap();
        assert_eq!(straight.cell_inputs(1, 2), Some((700_000, 150_000)));

        let config = GridConfig {
            transpose: true,
            ..GridConfig::default()
        };
        let flipped = run_grid_with_live(&config, LiveRate::Skipped).unwrap();
        assert_eq!(flipped.cell_inputs(2, 1), Some((700_000, 150_000)));
        assert_eq!(flipped.cell_inputs(11, 0), None);

        let b = flipped.cell_breakdown(2, 1).unwrap();
        assert_eq!(b.rounded_total(), flipped.presented().get(2, 1).unwrap());
    }
}
