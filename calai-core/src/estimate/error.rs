//! Estimation gateway error types.

use thiserror::Error;

/// Errors that can occur while asking the gateway for an estimate.
///
/// None of these touch the ledger; a failed estimate simply produces no
/// pending entry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    /// The attached image is too large, not an image, or unreadable.
    #[error("Invalid attachment: {0}")]
    InvalidAttachment(String),

    /// No API key is configured.
    #[error("Estimation unavailable. Set your Groq API key with `calai settings api-key <KEY>`.")]
    GatewayUnavailable,

    /// The service answered, but not with usable JSON.
    #[error("Could not parse AI response: {0}")]
    GatewayParseError(String),

    /// The service rejected the API key.
    #[error("Invalid Groq API key. Check it with `calai settings show`.")]
    GatewayAuthError,

    /// Neither a description nor an image was given.
    #[error("Describe the meal or attach a photo")]
    EmptyRequest,

    /// Transport failure or unexpected HTTP status.
    #[error("HTTP error: {0}")]
    Http(String),
}
