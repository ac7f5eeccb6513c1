//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while setting up a host application.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The rolling log file could not be created.
    #[error("Failed to create log file appender: {0}")]
    LogAppender(#[from] tracing_appender::rolling::InitError),

    /// A global subscriber was already installed.
    #[error("Failed to install log subscriber: {0}")]
    LogInit(#[from] tracing_subscriber::util::TryInitError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
