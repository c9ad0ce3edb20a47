use thiserror::Error;

/// Top-level error type for Lorekeeper.
///
/// Subsystem crates define their own error types and implement
/// `From<LorekeeperError>` so that `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LorekeeperError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for LorekeeperError {
    fn from(err: toml::de::Error) -> Self {
        LorekeeperError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for LorekeeperError {
    fn from(err: toml::ser::Error) -> Self {
        LorekeeperError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for LorekeeperError {
    fn from(err: serde_json::Error) -> Self {
        LorekeeperError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Lorekeeper operations.
pub type Result<T> = std::result::Result<T, LorekeeperError>;
