//! Error types for confreg.

/// Result type alias for confreg operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when working with the configuration registry.
///
/// None of these ever surface through the public registry API — every failure
/// mode there degrades to a default-constructed value and a log line. The
/// variants exist for the internal seams: the external source delegate, watch
/// setup, and content reading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error occurred while reading configuration content.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse configuration content.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// The external configuration source failed.
    #[error("External source error: {0}")]
    ExternalSourceError(String),

    /// File watching is not supported or failed to initialize.
    #[error("File watching error: {0}")]
    WatchError(String),

    /// Generic error for other cases.
    #[error("Configuration error: {0}")]
    Other(String),
}

#[cfg(feature = "file-watch")]
impl From<notify::Error> for ConfigError {
    fn from(err: notify::Error) -> Self {
        ConfigError::WatchError(err.to_string())
    }
}
