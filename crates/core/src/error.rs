//! Error types for the Veilroute domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Veilroute operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Classifier errors ---
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    // --- Decision parsing errors ---
    #[error("Decision error: {0}")]
    Decision(#[from] DecisionError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies whether an error is worth retrying.
///
/// The resilience layer retries only operations whose error says so;
/// everything else propagates immediately.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

// --- Bounded context errors ---

/// Failures from the intent-classifier backend (the only networked call).
#[derive(Debug, Clone, Error)]
pub enum ClassifierError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited by backend, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Classifier not configured: {0}")]
    NotConfigured(String),
}

impl Retryable for ClassifierError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Network(_) | Self::RateLimited { .. } => true,
            // Server-side errors are transient; client-side errors are not.
            Self::Api { status_code, .. } => *status_code >= 500,
            Self::AuthenticationFailed(_) | Self::NotConfigured(_) => false,
        }
    }
}

/// Failures extracting a routing decision from raw classifier output.
///
/// Never retried: the malformed text has already been received, and a fresh
/// classifier call would blow the latency budget.
#[derive(Debug, Clone, Error)]
pub enum DecisionError {
    #[error("No JSON object found in classifier output")]
    NoJson,

    #[error("Malformed decision JSON: {0}")]
    Malformed(String),

    #[error("Unknown handler: {0}")]
    UnknownHandler(String),
}

impl Retryable for DecisionError {
    fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifier_error_displays_correctly() {
        let err = Error::Classifier(ClassifierError::Api {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn timeout_and_network_are_retryable() {
        assert!(ClassifierError::Timeout("30s".into()).is_retryable());
        assert!(ClassifierError::Network("conn refused".into()).is_retryable());
        assert!(ClassifierError::RateLimited { retry_after_secs: 5 }.is_retryable());
    }

    #[test]
    fn auth_and_client_errors_are_not_retryable() {
        assert!(!ClassifierError::AuthenticationFailed("bad key".into()).is_retryable());
        assert!(
            !ClassifierError::Api {
                status_code: 400,
                message: "bad request".into()
            }
            .is_retryable()
        );
    }

    #[test]
    fn server_errors_are_retryable() {
        assert!(
            ClassifierError::Api {
                status_code: 503,
                message: "unavailable".into()
            }
            .is_retryable()
        );
    }

    #[test]
    fn decision_errors_never_retry() {
        assert!(!DecisionError::NoJson.is_retryable());
        assert!(!DecisionError::Malformed("oops".into()).is_retryable());
        assert!(!DecisionError::UnknownHandler("ghost".into()).is_retryable());
    }
}
