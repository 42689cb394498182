mod app_config;
mod config;
mod devices;

pub use app_config::{AppConfig, Environment, LogFormat};
pub use config::{load_app_config, load_app_config_from_env, DEFAULT_IMPORT_BATCH_SIZE};
pub use devices::{
    parse_timestamp_text, timestamp_from_millis, Device, DeviceHealth, DeviceKeys, DeviceType,
    WireDevice, WireTimestamp,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid device type: {0}")]
    InvalidDeviceType(String),

    #[error("invalid device health: {0}")]
    InvalidDeviceHealth(String),

    #[error("{0} must be non-empty")]
    EmptyKey(&'static str),

    #[error("invalid price: {0}")]
    InvalidPrice(String),

    #[error("invalid last_used timestamp: {0}")]
    InvalidTimestamp(String),
}
