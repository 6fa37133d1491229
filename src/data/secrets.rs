//! Where API keys come from.
//!
//! The rate client only sees a [`SecretSource`]; the binary hands it
//! [`EnvSecrets`], tests hand it a [`MapSecrets`].

use std::collections::HashMap;

pub trait SecretSource {
    /// Look up a secret by name. Blank values count as missing.
    fn secret(&self, name: &str) -> Option<String>;
}

/// Process environment, after loading `.env` from the working directory (if any).
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecrets;

impl EnvSecrets {
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self
    }
}

impl SecretSource for EnvSecrets {
    fn secret(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.trim().is_empty())
    }
}

/// Fixed in-memory secrets.
#[derive(Debug, Clone, Default)]
pub struct MapSecrets {
    values: HashMap<String, String>,
}

impl MapSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl SecretSource for MapSecrets {
    fn secret(&self, name: &str) -> Option<String> {
        self.values
            .get(name)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_secrets_treat_blank_as_missing() {
        let secrets = MapSecrets::new().with("A", "key").with("B", "   ");
        assert_eq!(secrets.secret("A").as_deref(), Some("key"));
        assert_eq!(secrets.secret("B"), None);
        assert_eq!(secrets.secret("C"), None);
    }
}
