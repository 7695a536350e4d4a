//! Configuration loader
//!
//! Merges configuration sources with Figment and validates the result
//! before the process starts serving.

use crate::config::AppConfig;
use crate::domain::error::{Error, Result};
use crate::infrastructure::logging::parse_log_level;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILENAME: &str = "solbalance.toml";

/// Environment variable prefix; nested keys use a double underscore,
/// e.g. `SOLBAL__RATE_LIMIT__WINDOW_SECS=30`.
pub const CONFIG_ENV_PREFIX: &str = "SOLBAL__";

/// Configuration loader service
#[derive(Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a loader with default settings.
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path.
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix.
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources.
    ///
    /// Sources are merged in this order (later overrides earlier):
    /// 1. `AppConfig::default()`
    /// 2. TOML file (explicit path, or `solbalance.toml` if present)
    /// 3. Environment variables with the configured prefix
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        let path = self
            .config_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME));
        if path.exists() {
            figment = figment.merge(Toml::file(&path));
            info!("configuration loaded from {}", path.display());
        }

        figment = figment.merge(Env::prefixed(&self.env_prefix).split("__"));

        let config: AppConfig = figment.extract()?;
        validate_app_config(&config)?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate application configuration, failing fast on nonsense values.
pub(crate) fn validate_app_config(config: &AppConfig) -> Result<()> {
    if config.server.port == 0 {
        return Err(Error::config("server port cannot be 0"));
    }
    if config.rpc.endpoint.trim().is_empty() {
        return Err(Error::config("rpc endpoint cannot be empty"));
    }
    if config.rpc.timeout_secs == 0 {
        return Err(Error::config("rpc timeout cannot be 0"));
    }
    if config.cache.ttl_secs == 0 {
        return Err(Error::config("cache TTL cannot be 0"));
    }
    if config.rate_limit.enabled {
        if config.rate_limit.max_requests_per_window == 0 {
            return Err(Error::config(
                "rate limit max_requests_per_window cannot be 0 when rate limiting is enabled",
            ));
        }
        if config.rate_limit.window_secs == 0 {
            return Err(Error::config(
                "rate limit window cannot be 0 when rate limiting is enabled",
            ));
        }
    }
    if config.auth.enabled && config.auth.api_keys.is_empty() {
        return Err(Error::config(
            "at least one API key is required when authentication is enabled",
        ));
    }
    parse_log_level(&config.logging.level)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(validate_app_config(&config).is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cache.ttl_secs, 10);
        assert_eq!(config.rate_limit.max_requests_per_window, 10);
        assert!(!config.auth.enabled);
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let mut config = AppConfig::default();
        config.cache.ttl_secs = 0;
        assert!(validate_app_config(&config).is_err());
    }

    #[test]
    fn zero_window_is_rejected_only_when_enabled() {
        let mut config = AppConfig::default();
        config.rate_limit.window_secs = 0;
        assert!(validate_app_config(&config).is_err());
        config.rate_limit.enabled = false;
        assert!(validate_app_config(&config).is_ok());
    }

    #[test]
    fn enabled_auth_requires_keys() {
        let mut config = AppConfig::default();
        config.auth.enabled = true;
        assert!(validate_app_config(&config).is_err());
        config.auth.api_keys.push("secret".to_string());
        assert!(validate_app_config(&config).is_ok());
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let mut config = AppConfig::default();
        config.logging.level = "loud".to_string();
        assert!(validate_app_config(&config).is_err());
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = std::env::temp_dir().join("solbalance-loader-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            "[cache]\nttl_secs = 42\n\n[rate_limit]\nmax_requests_per_window = 3\n",
        )
        .unwrap();

        let config = ConfigLoader::new().with_config_path(&path).load().unwrap();
        assert_eq!(config.cache.ttl_secs, 42);
        assert_eq!(config.rate_limit.max_requests_per_window, 3);
        // untouched sections keep their defaults
        assert_eq!(config.server.port, 8080);
    }
}
