//! # Error Types
//!
//! Custom error types for GCC Bridge using `thiserror`.

use thiserror::Error;

/// Main error type for GCC Bridge
#[derive(Debug, Error)]
pub enum GccBridgeError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Calibration storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serial transport errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// No serial device could be opened
    #[error("No serial device found (tried: {0})")]
    SerialPortNotFound(String),

    /// Controller transport errors
    #[error("Controller error: {0}")]
    Controller(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for GCC Bridge
pub type Result<T> = std::result::Result<T, GccBridgeError>;
