//! Render engine contract
//!
//! A session renders exactly one URL through one egress path. The proxy
//! is bound at session creation, so changing egress means discarding the
//! session and opening a new one; sessions are cheap to create and
//! discard by contract.

use std::time::Duration;

use async_trait::async_trait;

use a11yscan_core::domain::{ContentDigest, RawViolation};

use crate::error::FetchError;

/// Egress path for a render session: direct, or through one proxy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EgressDescriptor {
    /// Proxy URL; `None` means direct egress
    pub proxy: Option<String>,
}

impl EgressDescriptor {
    pub fn direct() -> Self {
        Self { proxy: None }
    }

    pub fn via_proxy(proxy: impl Into<String>) -> Self {
        Self {
            proxy: Some(proxy.into()),
        }
    }
}

impl std::fmt::Display for EgressDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.proxy {
            Some(proxy) => write!(f, "proxy:{proxy}"),
            None => write!(f, "direct"),
        }
    }
}

/// Everything the coordinator extracts from one page fetch.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Findings from the deterministic rule evaluation
    pub rule_violations: Vec<RawViolation>,
    /// Bounded text signals for the semantic analyzer
    pub content_digest: ContentDigest,
    /// PNG screenshot, when the engine captured one
    pub screenshot: Option<Vec<u8>>,
}

/// Factory for render sessions.
///
/// Implementations wrap a real rendering capability (headless browser,
/// remote rendering service). The engine-level resource may be shared
/// across fetches; sessions never are.
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Navigate to `url` through the given egress path.
    async fn open(
        &self,
        url: &str,
        egress: &EgressDescriptor,
        navigation_timeout: Duration,
    ) -> Result<Box<dyn RenderSession>, FetchError>;

    /// Check that the shared rendering capability is up and can open
    /// sessions. Workers probe this before attempting a batch.
    async fn health_check(&self) -> Result<(), FetchError> {
        Ok(())
    }

    /// Release the shared engine-level resource. In-flight sessions are
    /// unaffected; new `open` calls fail afterwards.
    async fn shutdown(&self);
}

/// One rendered page, owned by at most one in-flight job.
#[async_trait]
pub trait RenderSession: Send {
    /// Run the rule engine against the rendered DOM.
    ///
    /// Fails with [`FetchError::EngineNotReady`] when the evaluation
    /// capability cannot initialize on an otherwise loaded page.
    async fn evaluate_rules(&mut self) -> Result<Vec<RawViolation>, FetchError>;

    /// Extract the page's bounded text digest.
    async fn content_digest(&mut self) -> Result<ContentDigest, FetchError>;

    /// Capture a screenshot, when supported.
    async fn screenshot(&mut self) -> Result<Option<Vec<u8>>, FetchError>;

    /// Tear the session down. Must be called on success and failure
    /// paths alike; idempotent.
    async fn close(&mut self);
}
