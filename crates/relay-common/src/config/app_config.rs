//! Application configuration structs
//!
//! Loads configuration from environment variables, with defaults that let
//! the server start bare.

use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub gateway: ServerConfig,
    pub heartbeat: HeartbeatConfig,
    pub limits: LimitsConfig,
    pub fun: FunConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Gateway server bind configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Liveness monitor configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HeartbeatConfig {
    /// Sweep period in seconds
    #[serde(default = "default_heartbeat_interval")]
    pub interval_secs: u64,
}

/// Per-connection and per-message size limits
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Capacity of each connection's outbound frame queue
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
    /// Maximum attachment upload size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

/// Novelty command configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FunConfig {
    #[serde(default = "default_fun_enabled")]
    pub enabled: bool,
}

// Default value functions
fn default_app_name() -> String {
    "relay".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_heartbeat_interval() -> u64 {
    10
}

fn default_outbound_queue() -> usize {
    64
}

fn default_max_upload_bytes() -> usize {
    10_000_000
}

fn default_fun_enabled() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: default_env(),
            },
            gateway: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            heartbeat: HeartbeatConfig {
                interval_secs: default_heartbeat_interval(),
            },
            limits: LimitsConfig {
                outbound_queue: default_outbound_queue(),
                max_upload_bytes: default_max_upload_bytes(),
            },
            fun: FunConfig {
                enabled: default_fun_enabled(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            gateway: ServerConfig {
                host: env::var("GATEWAY_HOST").unwrap_or_else(|_| default_host()),
                port: parse_var("GATEWAY_PORT", default_port())?,
            },
            heartbeat: HeartbeatConfig {
                interval_secs: parse_var("HEARTBEAT_INTERVAL_SECS", default_heartbeat_interval())?,
            },
            limits: LimitsConfig {
                outbound_queue: parse_var("OUTBOUND_QUEUE_SIZE", default_outbound_queue())?,
                max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", default_max_upload_bytes())?,
            },
            fun: FunConfig {
                enabled: parse_var("FUN_ENABLED", default_fun_enabled())?,
            },
        })
    }
}

/// Parse an optional environment variable, falling back to a default
fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
