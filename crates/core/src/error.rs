//! Error types for the Parley domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Parley operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Completion errors ---
    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    // --- Session errors ---
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    // --- Feedback log errors ---
    #[error("Feedback log error: {0}")]
    Feedback(#[from] FeedbackError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of the completion bridge. All of them are fatal for the
/// interaction that triggered the call; nothing is retried.
#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by completion service")]
    RateLimited,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("Completion service returned an empty text")]
    EmptyCompletion,

    #[error("Completion provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Conversation has not been started; reset it first")]
    NotInitialized,

    #[error("No bot reply after the greeting to regenerate")]
    NothingToRegenerate,

    #[error("No bot reply after the greeting to rate")]
    NothingToRate,

    #[error("Unknown model: {0}")]
    UnknownModel(String),
}

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Failed to encode feedback record: {0}")]
    Encoding(String),
}
