//! Error types for the dayplan bot.

use crate::config::ConfigError;
use crate::storage::StorageError;
use crate::transport::TransportError;

/// Top-level error type for startup and the HTTP gateway.
#[derive(Debug, thiserror::Error)]
pub enum DayplanError {
    /// Missing or invalid configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Persistence backend error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Outbound message delivery error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Gateway bind/serve error.
    #[error("gateway error: {0}")]
    Gateway(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, DayplanError>;
