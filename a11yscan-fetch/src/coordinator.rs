//! Fetch coordinator: retry, backoff, and egress rotation around the
//! render engine

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use a11yscan_core::config::FetchConfig;
use a11yscan_core::infrastructure::resilience::RetryConfig;

use crate::engine::{EgressDescriptor, FetchResult, RenderEngine, RenderSession};
use crate::error::FetchError;
use crate::proxy::ProxyRotation;

/// Runtime configuration for the coordinator.
#[derive(Debug, Clone)]
pub struct FetchCoordinatorConfig {
    pub retry: RetryConfig,
    pub navigation_timeout: Duration,
    pub proxies: Vec<String>,
}

impl Default for FetchCoordinatorConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            navigation_timeout: Duration::from_secs(30),
            proxies: Vec::new(),
        }
    }
}

impl From<&FetchConfig> for FetchCoordinatorConfig {
    fn from(config: &FetchConfig) -> Self {
        Self {
            retry: config.retry.to_retry_config(),
            navigation_timeout: Duration::from_secs(config.navigation_timeout_seconds),
            proxies: config.proxies.clone(),
        }
    }
}

/// Produces a `{rule violations, content digest, screenshot}` triple for
/// one URL, resilient to transient network failure.
///
/// Each attempt owns exactly one render session, torn down on success
/// and failure paths alike. Retryable failures wait a capped exponential
/// backoff and rotate the egress proxy (when a pool is configured)
/// before the next attempt; rotation implies a fresh session because the
/// proxy is bound at session creation.
pub struct FetchCoordinator {
    engine: Arc<dyn RenderEngine>,
    retry: RetryConfig,
    navigation_timeout: Duration,
    proxies: ProxyRotation,
}

impl FetchCoordinator {
    pub fn new(engine: Arc<dyn RenderEngine>, config: FetchCoordinatorConfig) -> Self {
        Self {
            engine,
            retry: config.retry,
            navigation_timeout: config.navigation_timeout,
            proxies: ProxyRotation::new(config.proxies),
        }
    }

    /// Fetch and evaluate one page.
    ///
    /// Non-retryable errors surface immediately. Retryable errors are
    /// retried up to the configured attempt budget; exhaustion yields
    /// [`FetchError::RetriesExhausted`] wrapping the last observed error.
    pub async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        let mut attempt: u32 = 0;
        let mut egress = self.proxies.current();

        loop {
            attempt += 1;
            debug!(url, attempt, egress = %egress, "Fetching page");

            match self.attempt(url, &egress).await {
                Ok(result) => {
                    debug!(
                        url,
                        attempt,
                        violations = result.rule_violations.len(),
                        "Page fetch succeeded"
                    );
                    return Ok(result);
                }
                Err(error) if !error.is_retryable() => {
                    warn!(url, attempt, error = %error, "Non-retryable fetch failure");
                    return Err(error);
                }
                Err(error) => {
                    if attempt >= self.retry.max_attempts {
                        warn!(url, attempt, error = %error, "Fetch retries exhausted");
                        return Err(FetchError::RetriesExhausted {
                            attempts: attempt,
                            last: Box::new(error),
                        });
                    }

                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(
                        url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Transient fetch failure, retrying"
                    );
                    tokio::time::sleep(delay).await;

                    if !self.proxies.is_empty() {
                        egress = self.proxies.rotate();
                        debug!(url, egress = %egress, "Rotated egress proxy");
                    }
                }
            }
        }
    }

    /// Probe whether the underlying engine can open sessions at all.
    pub async fn health_check(&self) -> Result<(), FetchError> {
        self.engine.health_check().await
    }

    /// Release the shared engine resource. In-flight sessions finish on
    /// their own; new fetches fail afterwards.
    pub async fn close(&self) {
        self.engine.shutdown().await;
    }

    /// One attempt, one session. The session is closed no matter how
    /// collection ends.
    async fn attempt(
        &self,
        url: &str,
        egress: &EgressDescriptor,
    ) -> Result<FetchResult, FetchError> {
        let mut session = self
            .engine
            .open(url, egress, self.navigation_timeout)
            .await?;

        let result = Self::collect(session.as_mut()).await;
        session.close().await;
        result
    }

    async fn collect(session: &mut dyn RenderSession) -> Result<FetchResult, FetchError> {
        let rule_violations = session.evaluate_rules().await?;
        let content_digest = session.content_digest().await?;
        let screenshot = session.screenshot().await?;

        Ok(FetchResult {
            rule_violations,
            content_digest,
            screenshot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use a11yscan_core::domain::{ContentDigest, RawViolation, Severity};

    enum Step {
        FailOpen(FetchError),
        FailRules(FetchError),
        Succeed,
    }

    struct ScriptedEngine {
        script: Mutex<VecDeque<Step>>,
        opens: Mutex<Vec<EgressDescriptor>>,
        sessions_opened: AtomicUsize,
        sessions_closed: Arc<AtomicUsize>,
    }

    impl ScriptedEngine {
        fn new(script: Vec<Step>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                opens: Mutex::new(Vec::new()),
                sessions_opened: AtomicUsize::new(0),
                sessions_closed: Arc::new(AtomicUsize::new(0)),
            })
        }

        fn opens(&self) -> Vec<EgressDescriptor> {
            self.opens.lock().unwrap().clone()
        }
    }

    struct ScriptedSession {
        rules: Option<Result<Vec<RawViolation>, FetchError>>,
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RenderSession for ScriptedSession {
        async fn evaluate_rules(&mut self) -> Result<Vec<RawViolation>, FetchError> {
            self.rules.take().unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn content_digest(&mut self) -> Result<ContentDigest, FetchError> {
            Ok(ContentDigest {
                title: Some("Example".into()),
                lang: Some("en".into()),
                text: "page text".into(),
            })
        }

        async fn screenshot(&mut self) -> Result<Option<Vec<u8>>, FetchError> {
            Ok(None)
        }

        async fn close(&mut self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl RenderEngine for ScriptedEngine {
        async fn open(
            &self,
            _url: &str,
            egress: &EgressDescriptor,
            _navigation_timeout: Duration,
        ) -> Result<Box<dyn RenderSession>, FetchError> {
            self.opens.lock().unwrap().push(egress.clone());

            let step = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Step::Succeed);

            match step {
                Step::FailOpen(error) => Err(error),
                Step::FailRules(error) => {
                    self.sessions_opened.fetch_add(1, Ordering::SeqCst);
                    Ok(Box::new(ScriptedSession {
                        rules: Some(Err(error)),
                        closed: self.sessions_closed.clone(),
                    }))
                }
                Step::Succeed => {
                    self.sessions_opened.fetch_add(1, Ordering::SeqCst);
                    Ok(Box::new(ScriptedSession {
                        rules: Some(Ok(vec![sample_violation()])),
                        closed: self.sessions_closed.clone(),
                    }))
                }
            }
        }

        async fn shutdown(&self) {}
    }

    fn sample_violation() -> RawViolation {
        RawViolation {
            rule_id: "image-alt".into(),
            impact: Severity::Critical,
            description: "Images must have alternate text".into(),
            help_text: "Add an alt attribute".into(),
            help_url: "https://rules.example/image-alt".into(),
            tags: vec!["wcag111".into()],
            affected_node_count: 2,
            sample_nodes: Vec::new(),
        }
    }

    fn fast_config(proxies: Vec<String>) -> FetchCoordinatorConfig {
        FetchCoordinatorConfig {
            retry: RetryConfig {
                max_attempts: 3,
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
                backoff_multiplier: 2.0,
            },
            navigation_timeout: Duration::from_secs(30),
            proxies,
        }
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let engine = ScriptedEngine::new(vec![
            Step::FailOpen(FetchError::ConnectionReset("peer".into())),
            Step::FailOpen(FetchError::DnsFailure("example.com".into())),
            Step::Succeed,
        ]);
        let coordinator = FetchCoordinator::new(engine.clone(), fast_config(Vec::new()));

        let result = coordinator.fetch("https://example.com").await.unwrap();
        assert_eq!(result.rule_violations.len(), 1);
        assert_eq!(engine.opens().len(), 3);
    }

    #[tokio::test]
    async fn non_retryable_fails_on_first_attempt() {
        let engine = ScriptedEngine::new(vec![Step::FailRules(FetchError::EngineNotReady(
            "script injection failed".into(),
        ))]);
        let coordinator = FetchCoordinator::new(engine.clone(), fast_config(Vec::new()));

        let error = coordinator.fetch("https://example.com").await.unwrap_err();
        assert!(matches!(error, FetchError::EngineNotReady(_)));
        assert_eq!(engine.opens().len(), 1);
        // The session that produced the failure was still torn down.
        assert_eq!(engine.sessions_closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_waits_follow_the_capped_series() {
        let engine = ScriptedEngine::new(vec![
            Step::FailOpen(FetchError::ConnectionReset("peer".into())),
            Step::FailOpen(FetchError::ConnectionReset("peer".into())),
            Step::FailOpen(FetchError::ConnectionReset("peer".into())),
            Step::Succeed,
        ]);
        let coordinator = FetchCoordinator::new(
            engine.clone(),
            FetchCoordinatorConfig {
                retry: RetryConfig {
                    max_attempts: 4,
                    initial_delay: Duration::from_millis(1000),
                    max_delay: Duration::from_millis(2500),
                    backoff_multiplier: 2.0,
                },
                navigation_timeout: Duration::from_secs(30),
                proxies: Vec::new(),
            },
        );

        let started = tokio::time::Instant::now();
        coordinator.fetch("https://example.com").await.unwrap();

        // 1000ms + 2000ms + min(4000, 2500)ms across the four attempts.
        assert_eq!(started.elapsed(), Duration::from_millis(5500));
        assert_eq!(engine.opens().len(), 4);
    }

    #[tokio::test]
    async fn exhaustion_reports_attempt_count_and_last_error() {
        let engine = ScriptedEngine::new(vec![
            Step::FailOpen(FetchError::ConnectionTimeout("peer".into())),
            Step::FailOpen(FetchError::ConnectionTimeout("peer".into())),
            Step::FailOpen(FetchError::NavigationTimeout { seconds: 30 }),
        ]);
        let coordinator = FetchCoordinator::new(engine.clone(), fast_config(Vec::new()));

        let error = coordinator.fetch("https://example.com").await.unwrap_err();
        match error {
            FetchError::RetriesExhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, FetchError::NavigationTimeout { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(engine.opens().len(), 3);
    }

    #[tokio::test]
    async fn proxies_rotate_between_retries() {
        let engine = ScriptedEngine::new(vec![
            Step::FailOpen(FetchError::ConnectionRefused("p1".into())),
            Step::FailOpen(FetchError::ConnectionRefused("p2".into())),
            Step::Succeed,
        ]);
        let coordinator = FetchCoordinator::new(
            engine.clone(),
            fast_config(vec!["p1".into(), "p2".into(), "p3".into()]),
        );

        coordinator.fetch("https://example.com").await.unwrap();

        assert_eq!(
            engine.opens(),
            vec![
                EgressDescriptor::via_proxy("p1"),
                EgressDescriptor::via_proxy("p2"),
                EgressDescriptor::via_proxy("p3"),
            ]
        );
    }

    #[tokio::test]
    async fn session_closed_on_success_path() {
        let engine = ScriptedEngine::new(vec![Step::Succeed]);
        let coordinator = FetchCoordinator::new(engine.clone(), fast_config(Vec::new()));

        coordinator.fetch("https://example.com").await.unwrap();

        assert_eq!(engine.sessions_opened.load(Ordering::SeqCst), 1);
        assert_eq!(engine.sessions_closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn every_failed_session_is_closed() {
        let engine = ScriptedEngine::new(vec![
            Step::FailRules(FetchError::Protocol("h2 goaway".into())),
            Step::FailRules(FetchError::Protocol("h2 goaway".into())),
            Step::Succeed,
        ]);
        let coordinator = FetchCoordinator::new(engine.clone(), fast_config(Vec::new()));

        coordinator.fetch("https://example.com").await.unwrap();

        assert_eq!(engine.sessions_opened.load(Ordering::SeqCst), 3);
        assert_eq!(engine.sessions_closed.load(Ordering::SeqCst), 3);
    }
}
