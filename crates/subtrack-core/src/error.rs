use thiserror::Error;

/// Top-level error type for subtrack.
#[derive(Debug, Error)]
pub enum SubtrackError {
    /// User input that failed validation (price, date, name, billing day).
    #[error("validation error: {0}")]
    Validation(String),

    /// Storage-layer failure (I/O, constraint violation, bad row).
    #[error("storage error: {0}")]
    Storage(String),

    /// Error from the messaging channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
