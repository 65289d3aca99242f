//! Error types for the translation path.

use thiserror::Error;

/// A single failed call to the translation backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The request never produced an HTTP response (connect, timeout, body read).
    #[error("request to backend failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend responded with {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse backend response: {0}")]
    MalformedResponse(String),

    #[error("backend response contained no text")]
    EmptyResponse,

    #[error("missing API key: set ANTHROPIC_API_KEY or pass --api-key")]
    MissingApiKey,
}

impl BackendError {
    /// Whether sending the identical request again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(err) => !err.is_builder(),
            Self::Api { status, .. } => matches!(status, 408 | 429 | 500..=599),
            Self::MalformedResponse(_) | Self::EmptyResponse => true,
            Self::MissingApiKey => false,
        }
    }
}

/// Errors surfaced by the batch translator and the document pipeline.
#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("translation backend failed after {attempts} attempt(s): {source}")]
    Backend {
        attempts: u32,
        #[source]
        source: BackendError,
    },

    /// The backend returned a different number of segments than were sent.
    #[error("batch {batch} returned {received} segment(s) for {sent} sent")]
    AlignmentMismatch {
        batch: usize,
        sent: usize,
        received: usize,
    },

    /// Block text contains the segment separator and cannot be batched safely.
    #[error("block {block} contains the segment separator `---`")]
    SeparatorInText { block: usize },

    /// A translated segment contains a blank line, which would split its block.
    #[error("translation of block {block} contains a blank line")]
    BlankLineInText { block: usize },

    #[error("unsupported language `{0}`")]
    UnsupportedLanguage(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_api_statuses() {
        let api = |status| BackendError::Api {
            status,
            message: String::new(),
        };
        assert!(api(429).is_retryable());
        assert!(api(500).is_retryable());
        assert!(api(529).is_retryable());
        assert!(api(408).is_retryable());
        assert!(!api(400).is_retryable());
        assert!(!api(401).is_retryable());
        assert!(BackendError::EmptyResponse.is_retryable());
    }
}
