//! # relay-common
//!
//! Shared infrastructure for the relay workspace: configuration loading,
//! tracing setup, and the application-wide error type.

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::{
    AppConfig, AppSettings, ConfigError, Environment, FunConfig, HeartbeatConfig, LimitsConfig,
    ServerConfig,
};
pub use error::{AppError, AppResult};
pub use telemetry::{init_tracing, try_init_tracing, TracingConfig, TracingError};
