//! Switchyard Runtime - configuration and logging for host applications.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`, `SwitchyardConfig`)
//! - Logging setup on top of `tracing-subscriber` (`LoggingBuilder`)
//!
//! ```ignore
//! use switchyard_runtime::{ConfigLoader, logging, validate_config};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().load()?;
//!     validate_config(&config)?;
//!     logging::init_from_config(&config.logging);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;

// Re-exports
pub use config::{
    ConfigError, ConfigLoader, ConfigResult, LogFormat, LogLevel, LogOutput, LogRotation,
    LoggingConfig, Profile, SwitchyardConfig, validate_config,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, event, info, instrument, span, trace, warn};
}
