//! Semantic analyzer trait

use async_trait::async_trait;

use a11yscan_core::domain::{ContentDigest, SemanticViolation};

use super::error::SemanticError;

/// Core trait for semantic accessibility analysis.
///
/// Implementations examine page text for issues that require language
/// understanding (link text that makes no sense out of context, reading
/// level, uninformative headings). Object-safe; used through
/// `Arc<dyn SemanticAnalyzer>`.
#[async_trait]
pub trait SemanticAnalyzer: Send + Sync {
    /// Analyze a bounded content digest.
    ///
    /// An empty list is a valid outcome: it means the analyzer found
    /// nothing, not that it failed.
    async fn analyze(&self, digest: &ContentDigest) -> Result<Vec<SemanticViolation>, SemanticError>;
}
