//! Configuration loading

use anyhow::{Context, Result};
use sakila_auth::HashParams;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Minimum allowed token lifetime (60 seconds)
const MIN_TOKEN_TTL_SECS: i64 = 60;

/// Maximum allowed token lifetime (30 days)
/// Issued tokens cannot be revoked, so this bounds the exposure of a leaked one
const MAX_TOKEN_TTL_SECS: i64 = 30 * 24 * 3600;

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign new tokens
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Previous secrets still accepted for verification during a key rotation
    #[serde(default)]
    pub retired_secrets: Vec<String>,
    /// Token lifetime in seconds
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,
    /// Argon2 cost for newly registered passwords
    #[serde(default)]
    pub hash: HashParams,
}

impl AuthConfig {
    /// Clamp the token TTL to [60s, 30 days], logging a warning if adjusted
    pub fn validated_ttl_secs(&self) -> i64 {
        if self.token_ttl_secs < MIN_TOKEN_TTL_SECS {
            warn!(
                "token_ttl_secs {} is below minimum {}, using minimum",
                self.token_ttl_secs, MIN_TOKEN_TTL_SECS
            );
            MIN_TOKEN_TTL_SECS
        } else if self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            warn!(
                "token_ttl_secs {} exceeds maximum {}, using maximum",
                self.token_ttl_secs, MAX_TOKEN_TTL_SECS
            );
            MAX_TOKEN_TTL_SECS
        } else {
            self.token_ttl_secs
        }
    }

    /// Whether the signing secret is still the shipped placeholder
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == default_jwt_secret()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            retired_secrets: Vec::new(),
            token_ttl_secs: default_token_ttl_secs(),
            hash: HashParams::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default)]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: "pretty".to_string(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_db_path() -> String {
    "./data/sakila.db".to_string()
}

fn default_jwt_secret() -> String {
    "change-me-in-production".to_string()
}

fn default_token_ttl_secs() -> i64 {
    24 * 3600
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        // Check if config file exists
        if !config_path.exists() {
            info!("Config file not found at {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        info!("Loaded configuration from {}", path);
        Ok(config)
    }
}
