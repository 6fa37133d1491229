//! Rate boundary: secrets lookup, the live quote client, and the fallback chain.

pub mod mortgage_rate;
pub mod resolve;
pub mod secrets;

pub use mortgage_rate::{MortgageRateClient, RateError, RateProvider, RateQuote, parse_rate_body};
pub use resolve::{LiveRate, RateSource, ResolvedRate, resolve_rate};
pub use secrets::{EnvSecrets, MapSecrets, SecretSource};
