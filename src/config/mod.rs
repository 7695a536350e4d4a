//! Configuration types
//!
//! Typed configuration sections with serde defaults. Sources are merged by
//! [`loader::ConfigLoader`] in priority order: defaults, then a TOML file,
//! then `SOLBAL__`-prefixed environment variables.

pub mod loader;

pub use crate::infrastructure::rate_limit::RateLimitConfig;

use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Upstream Solana RPC settings
    pub rpc: RpcConfig,
    /// Balance cache settings
    pub cache: CacheConfig,
    /// Per-client rate limiting
    pub rate_limit: RateLimitConfig,
    /// API-key authentication
    pub auth: AuthConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to
    pub address: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Upstream Solana RPC configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.mainnet-beta.solana.com".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Balance cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Time-to-live for cached balances, in seconds
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 10 }
    }
}

/// API-key authentication configuration
///
/// Disabled by default; when enabled, at least one key must be configured
/// or startup fails (an enabled-but-keyless boundary would reject everyone).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Whether API-key authentication is enforced
    pub enabled: bool,
    /// Header carrying the key
    pub header: String,
    /// Accepted keys
    pub api_keys: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            header: "x-api-key".to_string(),
            api_keys: Vec::new(),
        }
    }
}

impl AuthConfig {
    /// Check a presented key against the configured set.
    pub fn validate_key(&self, provided: &str) -> bool {
        self.api_keys.iter().any(|key| key == provided)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON-formatted log lines
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}
