//! Error types for character image generation.

use thiserror::Error;

/// Shown when the API succeeds but returns no predictions.
pub const NO_IMAGE_MESSAGE: &str = "No image was generated. Please try a different prompt.";

/// Shown when a failure carries no message of its own.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Failures a generation attempt can end in. Every attempt is terminal:
/// no retries, the error is surfaced to the user as a single string.
#[derive(Debug, Error)]
pub enum FusionError {
    /// API call succeeded but the prediction list was empty.
    #[error("No image was generated. Please try a different prompt.")]
    NoImage,

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The image payload was not valid base64.
    #[error("failed to decode image data: {0}")]
    Decode(#[from] base64::DecodeError),

    /// I/O error (e.g., building the worker runtime).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FusionError {
    /// The single string shown in the UI for this failure: the failure's
    /// own message when it has one, else the generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } if message.is_empty() => GENERIC_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for generation operations.
pub type Result<T> = std::result::Result<T, FusionError>;
