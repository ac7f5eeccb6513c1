//! Configuration module for Switchyard host applications.
//!
//! This module provides layered configuration loading (defaults, files,
//! environment) and validation of the resulting settings.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, SpanEventConfig, SwitchyardConfig,
};
pub use validation::validate_config;
