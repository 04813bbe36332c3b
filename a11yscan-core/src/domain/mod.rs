//! Core domain models

pub mod page;
pub mod report;
pub mod violation;
pub mod wcag;

pub use page::ContentDigest;
pub use report::{CombinedReport, ComplianceLevel, SeverityCounts, SourceCounts, WcagCoverage};
pub use violation::{
    NormalizedViolation, RawViolation, SampleNode, SemanticViolation, Severity, ViolationSource,
};
pub use wcag::{ConformanceLevel, WcagCriterion};
