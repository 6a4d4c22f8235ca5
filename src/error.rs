//! Error types for the Auxa lighting engine

use thiserror::Error;

/// Errors that can occur while deriving settings from a profile
#[derive(Debug, Error)]
pub enum LightingError {
    /// The profile cannot drive the engine: `lightSensitivity` is missing,
    /// non-numeric, or outside 1-5.
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Failed to parse profile: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
