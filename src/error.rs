//! Error taxonomy for provider calls and the matching pipeline.
//!
//! Empty extraction results are not errors: no tasks or no teams yields an
//! empty [`AssignmentTable`](taskmatch_core::models::AssignmentTable).

use reqwest::StatusCode;
use thiserror::Error;

use taskmatch_core::similarity::SimilarityError;

/// Errors raised by configuration, providers, and matching.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Missing or invalid configuration (fatal, never retried).
    #[error("configuration error: {0}")]
    Config(String),

    /// The API key could not be exchanged for a bearer token.
    #[error("token exchange failed: {0}")]
    AuthFailure(String),

    /// An inference endpoint rejected the bearer token (HTTP 401).
    #[error("bearer token rejected by {endpoint}")]
    TokenRejected { endpoint: &'static str },

    /// An inference endpoint answered with a non-success status.
    #[error("{endpoint} returned {status}: {body}")]
    Provider {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    /// Connection failure, timeout, or other transport-level error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A success response without the expected JSON shape.
    #[error("malformed {endpoint} response: {detail}")]
    MalformedResponse {
        endpoint: &'static str,
        detail: String,
    },

    #[error(transparent)]
    Similarity(#[from] SimilarityError),

    /// A document could not be read or decoded.
    #[error("failed to read document {path}: {detail}")]
    Document { path: String, detail: String },
}

impl MatchError {
    /// Transient failures that the embedding retry loop may try again.
    ///
    /// Application-level error statuses are not transient: they surface
    /// on the first attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            MatchError::Network(_) | MatchError::AuthFailure(_) | MatchError::TokenRejected { .. }
        )
    }

    /// HTTP 504 from the provider, or a request that hit its own timeout.
    pub fn is_gateway_timeout(&self) -> bool {
        match self {
            MatchError::Provider { status, .. } => *status == StatusCode::GATEWAY_TIMEOUT,
            MatchError::Network(e) => e.is_timeout(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(status: StatusCode) -> MatchError {
        MatchError::Provider {
            endpoint: "chat",
            status,
            body: String::new(),
        }
    }

    #[test]
    fn status_errors_are_not_transient() {
        assert!(!provider(StatusCode::INTERNAL_SERVER_ERROR).is_transient());
        assert!(!provider(StatusCode::GATEWAY_TIMEOUT).is_transient());
        assert!(MatchError::AuthFailure("boom".into()).is_transient());
        assert!(MatchError::TokenRejected { endpoint: "embeddings" }.is_transient());
        assert!(!MatchError::Similarity(SimilarityError::DegenerateVector).is_transient());
    }

    #[test]
    fn only_504_is_gateway_timeout() {
        assert!(provider(StatusCode::GATEWAY_TIMEOUT).is_gateway_timeout());
        assert!(!provider(StatusCode::BAD_GATEWAY).is_gateway_timeout());
        assert!(!MatchError::Config("x".into()).is_gateway_timeout());
    }

    #[test]
    fn display_includes_status_and_body() {
        let e = MatchError::Provider {
            endpoint: "embeddings",
            status: StatusCode::BAD_REQUEST,
            body: "bad model".into(),
        };
        assert_eq!(e.to_string(), "embeddings returned 400 Bad Request: bad model");
    }
}
