//! # Error Types
//!
//! Custom error types for Motion Bridge using `thiserror`.

use thiserror::Error;

/// Main error type for Motion Bridge
#[derive(Debug, Error)]
pub enum MotionBridgeError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding errors (telemetry, recordings)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed or unusable motion recording
    #[error("Replay error: {0}")]
    Replay(String),

    /// Motion source / device access errors
    #[error("Device error: {0}")]
    Device(String),

    /// Pointer injection errors
    #[error("Pointer error: {0}")]
    Pointer(String),
}

/// Result type alias for Motion Bridge
pub type Result<T> = std::result::Result<T, MotionBridgeError>;
