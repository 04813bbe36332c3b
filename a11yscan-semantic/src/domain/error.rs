//! Semantic analyzer error types

/// Errors raised by a semantic analysis provider.
///
/// None of these propagate beyond the adapter boundary: the pipeline
/// treats any analyzer failure as zero findings.
#[derive(Debug, thiserror::Error)]
pub enum SemanticError {
    /// Authentication failed (invalid API key, expired token)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limited by the provider
    #[error("Rate limited: {message}")]
    RateLimited {
        /// Seconds to wait before retrying, when the provider says
        retry_after: Option<u64>,
        message: String,
    },

    /// Network/connection error
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out
    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Service temporarily unavailable (5xx)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Provider returned a response no parsing strategy could handle
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// Request was rejected as malformed (4xx other than auth/429)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl SemanticError {
    /// Whether a retry has a chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. }
                | Self::Network(_)
                | Self::Timeout { .. }
                | Self::ServiceUnavailable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(SemanticError::Network("reset".into()).is_retryable());
        assert!(SemanticError::Timeout { seconds: 60 }.is_retryable());
        assert!(SemanticError::ServiceUnavailable("503".into()).is_retryable());
        assert!(
            SemanticError::RateLimited {
                retry_after: Some(5),
                message: "slow down".into()
            }
            .is_retryable()
        );
    }

    #[test]
    fn permanent_errors_are_not_retryable() {
        assert!(!SemanticError::Authentication("bad key".into()).is_retryable());
        assert!(!SemanticError::InvalidResponse("garbage".into()).is_retryable());
        assert!(!SemanticError::InvalidRequest("too long".into()).is_retryable());
    }
}
