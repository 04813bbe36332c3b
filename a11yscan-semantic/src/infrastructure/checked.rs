//! Degrade-to-empty wrapper around any semantic analyzer
//!
//! The audit pipeline must never fail because the semantic pass failed.
//! This wrapper retries retryable provider errors with backoff and turns
//! any final error into an empty finding list, logging it on the way.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::warn;

use a11yscan_core::domain::{ContentDigest, SemanticViolation};
use a11yscan_core::infrastructure::resilience::{RetryConfig, retry_with_backoff};

use crate::domain::{SemanticAnalyzer, SemanticError};

/// Wraps a [`SemanticAnalyzer`] with retry, cooperative pacing, and
/// error absorption.
pub struct CheckedAnalyzer {
    inner: Arc<dyn SemanticAnalyzer>,
    retry: RetryConfig,
    pacing_delay: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl CheckedAnalyzer {
    pub fn new(inner: Arc<dyn SemanticAnalyzer>, retry: RetryConfig, pacing_delay: Duration) -> Self {
        Self {
            inner,
            retry,
            pacing_delay,
            last_call: Mutex::new(None),
        }
    }

    /// Analyze the digest, absorbing every failure.
    ///
    /// Consecutive calls are paced by the configured delay to respect
    /// provider rate limits. An error after retries yields an empty
    /// list; the caller cannot distinguish "nothing found" from
    /// "analysis unavailable", which is exactly the degraded-but-valid
    /// contract the pipeline relies on.
    pub async fn analyze_or_empty(&self, digest: &ContentDigest) -> Vec<SemanticViolation> {
        self.pace().await;

        let result = retry_with_backoff(
            &self.retry,
            || self.inner.analyze(digest),
            SemanticError::is_retryable,
        )
        .await;

        match result {
            Ok(violations) => violations,
            Err(error) => {
                warn!(error = %error, "Semantic check failed, degrading to empty result");
                Vec::new()
            }
        }
    }

    /// Sleep out the remainder of the pacing window since the last call.
    async fn pace(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.pacing_delay {
                tokio::time::sleep(self.pacing_delay - elapsed).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    struct FlakyAnalyzer {
        calls: AtomicU32,
        fail_first: u32,
        error_is_retryable: bool,
    }

    #[async_trait]
    impl SemanticAnalyzer for FlakyAnalyzer {
        async fn analyze(
            &self,
            _digest: &ContentDigest,
        ) -> Result<Vec<SemanticViolation>, SemanticError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                if self.error_is_retryable {
                    Err(SemanticError::ServiceUnavailable("503".into()))
                } else {
                    Err(SemanticError::Authentication("bad key".into()))
                }
            } else {
                Ok(vec![SemanticViolation {
                    category: "unclear-link-text".into(),
                    severity: Some("serious".into()),
                    description: "link text".into(),
                    recommendation: "rename link".into(),
                    examples: vec!["click here".into()],
                }])
            }
        }
    }

    fn quick_retry() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            backoff_multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn retries_transient_errors_then_succeeds() {
        let inner = Arc::new(FlakyAnalyzer {
            calls: AtomicU32::new(0),
            fail_first: 2,
            error_is_retryable: true,
        });
        let checked = CheckedAnalyzer::new(inner.clone(), quick_retry(), Duration::ZERO);

        let violations = checked.analyze_or_empty(&ContentDigest::default()).await;
        assert_eq!(violations.len(), 1);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_error_degrades_without_retry() {
        let inner = Arc::new(FlakyAnalyzer {
            calls: AtomicU32::new(0),
            fail_first: u32::MAX,
            error_is_retryable: false,
        });
        let checked = CheckedAnalyzer::new(inner.clone(), quick_retry(), Duration::ZERO);

        let violations = checked.analyze_or_empty(&ContentDigest::default()).await;
        assert!(violations.is_empty());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_retries_degrade_to_empty() {
        let inner = Arc::new(FlakyAnalyzer {
            calls: AtomicU32::new(0),
            fail_first: u32::MAX,
            error_is_retryable: true,
        });
        let checked = CheckedAnalyzer::new(inner.clone(), quick_retry(), Duration::ZERO);

        let violations = checked.analyze_or_empty(&ContentDigest::default()).await;
        assert!(violations.is_empty());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_calls_are_paced() {
        let inner = Arc::new(FlakyAnalyzer {
            calls: AtomicU32::new(0),
            fail_first: 0,
            error_is_retryable: true,
        });
        let checked = CheckedAnalyzer::new(inner.clone(), quick_retry(), Duration::from_millis(500));

        let start = Instant::now();
        checked.analyze_or_empty(&ContentDigest::default()).await;
        checked.analyze_or_empty(&ContentDigest::default()).await;

        assert!(start.elapsed() >= Duration::from_millis(500));
    }
}
