//! Error types for provider calls and profile persistence.
//!
//! Engine transitions never fail; everything that can go wrong lives at
//! the edges (network, disk) and is turned into a state transition or a
//! logged warning by the caller.

use thiserror::Error;

/// Failure of a question or feedback fetch.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the model API.
    #[error("Gemini HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The model returned no usable text.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// The batch parsed, but violated the question contract.
    #[error("malformed question batch: {0}")]
    Malformed(String),

    /// The response text was not the JSON we asked for.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure while reading or writing the saved profile.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
