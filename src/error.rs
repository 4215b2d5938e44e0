//! Error Types for Passfill
//!
//! One taxonomy for every failure the engine can produce.

use thiserror::Error;

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, PassfillError>;

/// Main error type for the engine
#[derive(Error, Debug)]
pub enum PassfillError {
    // ===== Credential Store Errors =====
    /// No backing credential store location is configured
    #[error("credential store location is not configured")]
    ConfigurationRequired,

    // ===== Decryption Backend Errors =====
    /// The backend rejected the decrypt-and-verify request
    #[error("decryption failed (code {code}): {message}")]
    DecryptionFailed { code: i64, message: String },

    // ===== Configuration Errors =====
    /// Configuration file could not be read or written
    #[error("configuration error: {0}")]
    ConfigError(String),

    // ===== I/O Errors =====
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PassfillError {
    /// Check if this error is recoverable by user action
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PassfillError::ConfigurationRequired)
    }
}
