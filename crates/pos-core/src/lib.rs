//! Shared foundation for the POS backend: configuration, the TTL cache used
//! by the geocode pipeline and the store-location provider, geographic math,
//! and panel layout validation/normalization. No I/O lives here.

use thiserror::Error;

pub mod app_config;
pub mod cache;
mod config;
pub mod geo;
pub mod layout;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
