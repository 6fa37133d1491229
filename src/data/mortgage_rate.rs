//! Live mortgage-rate quote (API Ninjas `mortgagerate` endpoint).
//!
//! One blocking GET with the key in an `X-Api-Key` header. The body is a JSON
//! object whose `rate_30yr_fixed` field holds today's 30-year fixed rate in
//! percent (`6.60` meaning 6.60%). No retries: a failed lookup is reported
//! once and the caller falls back (see [`crate::data::resolve`]).

use chrono::{DateTime, Local};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::data::secrets::SecretSource;

pub const RATE_URL: &str = "https://api.api-ninjas.com/v1/mortgagerate";

/// Secret name holding the quote service API key.
pub const API_KEY_NAME: &str = "MORTGAGE_API_KEY";

const API_KEY_HEADER: &str = "X-Api-Key";

/// A live 30-year fixed rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateQuote {
    /// Annual rate in percent.
    pub percent: f64,
    pub fetched_at: DateTime<Local>,
}

impl RateQuote {
    pub fn new(percent: f64) -> Self {
        Self {
            percent,
            fetched_at: Local::now(),
        }
    }
}

/// Why no live rate is available.
#[derive(Debug, Error)]
pub enum RateError {
    #[error("no {} configured", API_KEY_NAME)]
    MissingKey,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("service responded with status {0}")]
    Status(StatusCode),

    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response has no rate_30yr_fixed value")]
    MissingRate,

    #[error("response rate {0} is not a usable percentage")]
    InvalidRate(f64),
}

/// Anything that can produce a live rate.
pub trait RateProvider {
    fn fetch_rate(&self) -> Result<RateQuote, RateError>;
}

#[derive(Debug, Deserialize)]
struct MortgageRateResponse {
    rate_30yr_fixed: Option<RateValue>,
}

// The service has been seen to quote the rate both as a number and as a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RateValue {
    Number(f64),
    Text(String),
}

/// Parse a response body into a rate in percent.
///
/// A missing or null field, an unparseable string, and zero, negative or
/// non-finite values all mean "no live rate".
pub fn parse_rate_body(body: &str) -> Result<f64, RateError> {
    let response: MortgageRateResponse = serde_json::from_str(body)?;
    let percent = match response.rate_30yr_fixed {
        None => return Err(RateError::MissingRate),
        Some(RateValue::Number(v)) => v,
        Some(RateValue::Text(raw)) => raw.trim().parse::<f64>().map_err(|_| RateError::MissingRate)?,
    };

    if !(percent.is_finite() && percent > 0.0) {
        return Err(RateError::InvalidRate(percent));
    }
    Ok(percent)
}

pub struct MortgageRateClient {
    client: Client,
    api_key: String,
    url: String,
}

impl MortgageRateClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            url: RATE_URL.to_string(),
        }
    }

    /// Build a client from the `MORTGAGE_API_KEY` secret.
    pub fn from_secrets(secrets: &dyn SecretSource) -> Result<Self, RateError> {
        let api_key = secrets.secret(API_KEY_NAME).ok_or(RateError::MissingKey)?;
        Ok(Self::new(api_key))
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

impl RateProvider for MortgageRateClient {
    fn fetch_rate(&self) -> Result<RateQuote, RateError> {
        info!(url = %self.url, "fetching live mortgage rate");

        let resp = self
            .client
            .get(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RateError::Status(status));
        }

        let body = resp.text()?;
        debug!(bytes = body.len(), "rate response received");

        let percent = parse_rate_body(&body)?;
        info!(percent, "live rate");
        Ok(RateQuote::new(percent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::secrets::MapSecrets;

    #[test]
    fn parses_numeric_rate() {
        let v = parse_rate_body(r#"{"rate_30yr_fixed": 6.6}"#).unwrap();
        assert!((v - 6.6).abs() < 1e-12);
    }

    #[test]
    fn parses_string_rate_and_ignores_other_fields() {
        let v = parse_rate_body(r#"{"rate_15yr_fixed": "5.9", "rate_30yr_fixed": " 6.72 "}"#).unwrap();
        assert!((v - 6.72).abs() < 1e-12);
    }

    #[test]
    fn missing_or_null_rate_is_absent() {
        assert!(matches!(parse_rate_body("{}"), Err(RateError::MissingRate)));
        assert!(matches!(
            parse_rate_body(r#"{"rate_30yr_fixed": null}"#),
            Err(RateError::MissingRate)
        ));
        assert!(matches!(
            parse_rate_body(r#"{"rate_30yr_fixed": "n/a"}"#),
            Err(RateError::MissingRate)
        ));
    }

    #[test]
    fn zero_or_negative_rate_is_rejected() {
        assert!(matches!(
            parse_rate_body(r#"{"rate_30yr_fixed": 0}"#),
            Err(RateError::InvalidRate(_))
        ));
        assert!(matches!(
            parse_rate_body(r#"{"rate_30yr_fixed": -1.5}"#),
            Err(RateError::InvalidRate(_))
        ));
    }

    #[test]
    fn non_object_body_is_a_parse_error() {
        assert!(matches!(parse_rate_body("not json"), Err(RateError::Parse(_))));
        assert!(matches!(parse_rate_body("[]"), Err(RateError::Parse(_))));
    }

    #[test]
    fn missing_key_fails_before_any_request() {
        let err = MortgageRateClient::from_secrets(&MapSecrets::new()).err();
        assert!(matches!(err, Some(RateError::MissingKey)));
    }
}
