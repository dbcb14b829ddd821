//! Session configuration files.
//!
//! Configuration is loaded from TOML with the following resolution order:
//! 1. explicit path (CLI flag or caller-supplied)
//! 2. `$MEMOGATE_CONFIG`
//! 3. `~/.memogate/config.toml` (user)
//! 4. `/etc/memogate/config.toml` (system)
//!
//! ```toml
//! base_url = "https://eu.httpbin.org/"
//! cache_ttl_secs = 20
//! key_prefix = "httpbin"
//!
//! [headers]
//! Authorization = "Auth Token"
//!
//! [http]
//! timeout_secs = 10
//! max_redirects = 5
//!
//! [store]
//! max_entries = 5000
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{MemogateError, Result};

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "MEMOGATE_CONFIG";

/// Session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Base URL all call paths are resolved against.
    pub base_url: String,
    /// Default TTL in seconds for calls from this session (default: 0, no caching).
    #[serde(default)]
    pub cache_ttl_secs: u64,
    /// Optional fingerprint namespace.
    #[serde(default)]
    pub key_prefix: Option<String>,
    /// Headers sent with every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// HTTP client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Maximum redirects followed (default: 10).
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_redirects: default_max_redirects(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_redirects() -> usize {
    10
}

/// In-memory store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Maximum cached entries (default: 10,000).
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

fn default_max_entries() -> u64 {
    10_000
}

impl SessionConfig {
    /// Load configuration from the standard locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_config_path(explicit_path)?;
        let content = fs::read_to_string(&path).map_err(|e| {
            MemogateError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            MemogateError::Configuration(msg) => {
                MemogateError::Configuration(format!("{msg} (in {path:?})"))
            }
            other => other,
        })
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| MemogateError::Configuration(format!("Failed to parse config: {e}")))
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            return Err(MemogateError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(path);
            }
            return Err(MemogateError::Configuration(format!(
                "Config file from ${CONFIG_ENV_VAR} not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".memogate").join("config.toml");
            if user_config.exists() {
                return Ok(user_config);
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/memogate/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }

        Err(MemogateError::Configuration(
            "No config file found. Create ~/.memogate/config.toml or /etc/memogate/config.toml"
                .to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let config = SessionConfig::from_toml(r#"base_url = "https://api.test/""#).unwrap();
        assert_eq!(config.base_url, "https://api.test/");
        assert_eq!(config.cache_ttl_secs, 0);
        assert!(config.key_prefix.is_none());
        assert!(config.headers.is_empty());
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.http.max_redirects, 10);
        assert_eq!(config.store.max_entries, 10_000);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            base_url = "https://eu.httpbin.org/"
            cache_ttl_secs = 20
            key_prefix = "httpbin"

            [headers]
            Authorization = "Auth Token"

            [http]
            timeout_secs = 5

            [store]
            max_entries = 50
        "#;
        let config = SessionConfig::from_toml(toml).unwrap();
        assert_eq!(config.cache_ttl_secs, 20);
        assert_eq!(config.key_prefix.as_deref(), Some("httpbin"));
        assert_eq!(config.headers["Authorization"], "Auth Token");
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http.max_redirects, 10);
        assert_eq!(config.store.max_entries, 50);
    }

    #[test]
    fn missing_base_url_is_error() {
        let err = SessionConfig::from_toml("cache_ttl_secs = 5").unwrap_err();
        assert!(matches!(err, MemogateError::Configuration(_)));
    }

    #[test]
    fn explicit_missing_path_is_error() {
        let err = SessionConfig::load(Some(Path::new("/nonexistent/memogate.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
