//! Error types shared across frameline crates
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Common error type for frameline crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file parse errors
    #[error("Configuration parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using the common Error
pub type Result<T> = std::result::Result<T, Error>;
