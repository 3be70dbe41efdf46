//! Inference error types.
//!
//! Only transport-level conditions live here. Unparseable model output is
//! not an error — it degrades to the out-of-scope sentinel in the parser.

use thiserror::Error;

/// Errors from the language-model endpoint call.
///
/// These propagate to the turn loop and end the session; they are never
/// folded into the out-of-scope sentinel.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Request, HTTP-status, or body-decode failure.
    #[error("language-model endpoint request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with an empty completion array.
    #[error("language-model endpoint returned an empty reply")]
    EmptyReply,
}

/// Convenience alias for inference results.
pub type InferenceResult<T> = Result<T, InferenceError>;
