use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use tracing::{debug, info, warn};

pub const GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const QDRANT_URL: &str = "QDRANT_URL";
pub const QDRANT_API_KEY: &str = "QDRANT_API_KEY";
pub const GROQ_MODEL: &str = "GROQ_MODEL";
pub const FASTEMBED_CACHE_DIR: &str = "FASTEMBED_CACHE_DIR";
pub const PAPERSCOPE_ADDR: &str = "PAPERSCOPE_ADDR";

/// Keys that must all be present before storage or answering is attempted.
pub const REQUIRED_KEYS: [&str; 3] = [GROQ_API_KEY, QDRANT_URL, QDRANT_API_KEY];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub groq_api_key: Option<String>,
    pub qdrant_url: Option<String>,
    pub qdrant_api_key: Option<String>,
    #[serde(default = "default_groq_model")]
    pub groq_model: String,
    #[serde(default)]
    pub embedding_cache_dir: Option<String>,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

fn default_groq_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            qdrant_url: None,
            qdrant_api_key: None,
            groq_model: default_groq_model(),
            embedding_cache_dir: None,
            bind_addr: default_bind_addr(),
        }
    }
}

impl Configuration {
    /// Reads the process environment. Call `crate::init()` first so `.env`
    /// values are visible.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup. Empty values are
    /// treated as missing.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        for key in REQUIRED_KEYS {
            match get(key) {
                Some(_) => debug!("Found env var {}: ***", key),
                None => warn!("{} not found", key),
            }
        }

        let bind_addr = match get(PAPERSCOPE_ADDR) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Invalid {} '{}', using default", PAPERSCOPE_ADDR, raw);
                default_bind_addr()
            }),
            None => default_bind_addr(),
        };

        let config = Configuration {
            groq_api_key: get(GROQ_API_KEY),
            qdrant_url: get(QDRANT_URL),
            qdrant_api_key: get(QDRANT_API_KEY),
            groq_model: get(GROQ_MODEL).unwrap_or_else(default_groq_model),
            embedding_cache_dir: get(FASTEMBED_CACHE_DIR),
            bind_addr,
        };

        info!(
            configured = config.is_configured(),
            model = %config.groq_model,
            "Loaded configuration"
        );
        config
    }

    pub fn is_configured(&self) -> bool {
        self.missing_keys().is_empty()
    }

    pub fn has_groq(&self) -> bool {
        self.groq_api_key.is_some()
    }

    pub fn has_qdrant(&self) -> bool {
        self.qdrant_url.is_some() && self.qdrant_api_key.is_some()
    }

    pub fn missing_keys(&self) -> Vec<&'static str> {
        let present = [
            self.groq_api_key.is_some(),
            self.qdrant_url.is_some(),
            self.qdrant_api_key.is_some(),
        ];
        REQUIRED_KEYS
            .iter()
            .zip(present)
            .filter(|(_, ok)| !ok)
            .map(|(key, _)| *key)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Configuration {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Configuration::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn configured_only_when_all_three_present() {
        let config = config_from(&[
            (GROQ_API_KEY, "gsk"),
            (QDRANT_URL, "http://localhost:6333"),
            (QDRANT_API_KEY, "secret"),
        ]);
        assert!(config.is_configured());
        assert!(config.missing_keys().is_empty());

        let partial = config_from(&[(GROQ_API_KEY, "gsk"), (QDRANT_URL, "http://localhost:6333")]);
        assert!(!partial.is_configured());
        assert_eq!(partial.missing_keys(), vec![QDRANT_API_KEY]);
        assert!(partial.has_groq());
        assert!(!partial.has_qdrant());
    }

    #[test]
    fn empty_values_count_as_missing() {
        let config = config_from(&[(GROQ_API_KEY, ""), (QDRANT_URL, "  ")]);
        assert_eq!(config.missing_keys(), REQUIRED_KEYS.to_vec());
    }

    #[test]
    fn defaults_apply() {
        let config = config_from(&[(PAPERSCOPE_ADDR, "not an address")]);
        assert_eq!(config.groq_model, "llama-3.1-8b-instant");
        assert_eq!(config.bind_addr, default_bind_addr());

        let config = config_from(&[(GROQ_MODEL, "llama-3.3-70b-versatile"), (PAPERSCOPE_ADDR, "127.0.0.1:8080")]);
        assert_eq!(config.groq_model, "llama-3.3-70b-versatile");
        assert_eq!(config.bind_addr.port(), 8080);
    }
}
