//! Picking the interest rate for a computation pass.
//!
//! Order: manual override, then the live quote, then [`DEFAULT_RATE_PERCENT`].
//! A failed lookup is never fatal; it is logged once and shown in the banner.

use tracing::warn;

use crate::data::mortgage_rate::{RateError, RateProvider, RateQuote};
use crate::domain::DEFAULT_RATE_PERCENT;

/// Outcome of the (single) live lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveRate {
    Quote(RateQuote),
    Unavailable(String),
    /// Lookup not attempted (offline mode).
    Skipped,
}

impl LiveRate {
    pub fn fetch(provider: &dyn RateProvider) -> Self {
        Self::from(provider.fetch_rate())
    }

    pub fn quote(&self) -> Option<&RateQuote> {
        match self {
            LiveRate::Quote(q) => Some(q),
            _ => None,
        }
    }
}

impl From<Result<RateQuote, RateError>> for LiveRate {
    fn from(result: Result<RateQuote, RateError>) -> Self {
        match result {
            Ok(quote) => LiveRate::Quote(quote),
            Err(err) => {
                warn!(error = %err, "could not retrieve live rate");
                LiveRate::Unavailable(err.to_string())
            }
        }
    }
}

/// Where the effective rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateSource {
    Manual,
    Live,
    Default,
}

impl RateSource {
    pub fn display_name(self) -> &'static str {
        match self {
            RateSource::Manual => "manual",
            RateSource::Live => "live",
            RateSource::Default => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRate {
    /// Effective annual rate in percent.
    pub percent: f64,
    pub source: RateSource,
    pub live: LiveRate,
}

impl ResolvedRate {
    /// The rate banner line.
    pub fn banner(&self) -> String {
        match &self.live {
            LiveRate::Quote(q) => format!(
                "Today's 30-year fixed rate: {:.2}% (as of {})",
                q.percent,
                q.fetched_at.format("%Y-%m-%d %H:%M")
            ),
            LiveRate::Unavailable(reason) => {
                format!("Could not retrieve live rate ({reason}); enter one manually.")
            }
            LiveRate::Skipped => "Live rate lookup skipped (offline).".to_string(),
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self.live, LiveRate::Unavailable(_))
    }

    pub fn summary(&self) -> String {
        format!("Interest rate: {:.2}% ({})", self.percent, self.source.display_name())
    }
}

/// Combine a manual override with the live lookup.
pub fn resolve_rate(manual_percent: Option<f64>, live: LiveRate) -> ResolvedRate {
    let (percent, source) = match (manual_percent, &live) {
        (Some(p), _) => (p, RateSource::Manual),
        (None, LiveRate::Quote(q)) => (q.percent, RateSource::Live),
        (None, _) => (DEFAULT_RATE_PERCENT, RateSource::Default),
    };
    ResolvedRate {
        percent,
        source,
        live,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl RateProvider for Failing {
        fn fetch_rate(&self) -> Result<RateQuote, RateError> {
            Err(RateError::MissingRate)
        }
    }

    struct Fixed(f64);

    impl RateProvider for Fixed {
        fn fetch_rate(&self) -> Result<RateQuote, RateError> {
            Ok(RateQuote::new(self.0))
        }
    }

    #[test]
    fn failed_lookup_falls_back_to_default() {
        let resolved = resolve_rate(None, LiveRate::fetch(&Failing));
        assert_eq!(resolved.percent, DEFAULT_RATE_PERCENT);
        assert_eq!(resolved.source, RateSource::Default);
        assert!(resolved.is_warning());
        assert!(resolved.banner().contains("Could not retrieve live rate"));
    }

    #[test]
    fn live_quote_is_used_without_override() {
        let resolved = resolve_rate(None, LiveRate::fetch(&Fixed(7.25)));
        assert_eq!(resolved.percent, 7.25);
        assert_eq!(resolved.source, RateSource::Live);
        assert!(resolved.banner().starts_with("Today's 30-year fixed rate: 7.25%"));
    }

    #[test]
    fn manual_override_wins_but_keeps_live_banner() {
        let resolved = resolve_rate(Some(5.0), LiveRate::fetch(&Fixed(7.0)));
        assert_eq!(resolved.percent, 5.0);
        assert_eq!(resolved.source, RateSource::Manual);
        assert_eq!(resolved.live.quote().map(|q| q.percent), Some(7.0));
    }

    #[test]
    fn offline_uses_default() {
        let resolved = resolve_rate(None, LiveRate::Skipped);
        assert_eq!(resolved.source, RateSource::Default);
        assert!(!resolved.is_warning());
    }
}
