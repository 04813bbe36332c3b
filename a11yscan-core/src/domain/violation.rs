//! Violation entities produced by the rule engine and the semantic analyzer

use serde::{Deserialize, Serialize};

/// Violation severity, ordered from most to least severe.
///
/// The rank (`critical = 0` … `minor = 3`) drives report ordering and is
/// stable across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks access for affected users
    Critical,
    /// Severely degrades access
    Serious,
    /// Noticeably degrades access
    Moderate,
    /// Minor friction
    Minor,
}

impl Severity {
    /// Sort rank used by the combiner (critical = 0 … minor = 3).
    pub fn rank(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::Serious => 1,
            Self::Moderate => 2,
            Self::Minor => 3,
        }
    }

    /// Parse a severity name, case-insensitive. Unknown names yield `None`;
    /// callers decide the default (the combiner uses `Moderate` for
    /// semantic findings).
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "critical" => Some(Self::Critical),
            "serious" => Some(Self::Serious),
            "moderate" => Some(Self::Moderate),
            "minor" => Some(Self::Minor),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::Serious => write!(f, "serious"),
            Self::Moderate => write!(f, "moderate"),
            Self::Minor => write!(f, "minor"),
        }
    }
}

/// Which analysis pass produced a normalized violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationSource {
    /// Deterministic DOM rule evaluation
    Rule,
    /// Language/context analysis
    Semantic,
}

/// A sample DOM node affected by a rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleNode {
    /// HTML snippet of the offending element
    pub html: String,
    /// CSS selector path to the element
    pub selector: String,
    /// Rule engine's failure explanation for this node
    pub failure_summary: String,
}

/// Raw finding from the rule evaluation engine, one entry per rule id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawViolation {
    /// Rule identifier (e.g. "color-contrast")
    pub rule_id: String,
    /// Impact as reported by the engine
    pub impact: Severity,
    /// Human-readable description of the rule
    pub description: String,
    /// Guidance on how to fix the violation
    pub help_text: String,
    /// Link to the rule documentation
    pub help_url: String,
    /// Engine tags; WCAG tags follow the `wcag###` pattern
    pub tags: Vec<String>,
    /// Total number of nodes failing this rule
    pub affected_node_count: usize,
    /// Up to three representative nodes, in engine order
    pub sample_nodes: Vec<SampleNode>,
}

/// Raw finding from the semantic analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticViolation {
    /// Analyzer category (e.g. "unclear-link-text"), mapped to WCAG
    /// criteria through a fixed lookup table
    pub category: String,
    /// Severity name as emitted by the analyzer; unknown or missing
    /// values default to moderate during normalization
    #[serde(default)]
    pub severity: Option<String>,
    /// Human-readable description of the issue
    pub description: String,
    /// Suggested remediation
    pub recommendation: String,
    /// Concrete examples quoted from the page
    #[serde(default)]
    pub examples: Vec<String>,
}

/// Unified violation shape produced by the combiner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedViolation {
    /// Stable identifier: the rule id for rule findings, the category
    /// for semantic findings
    pub id: String,
    /// Which pass produced the finding
    pub source: ViolationSource,
    pub severity: Severity,
    pub description: String,
    /// Remediation guidance (help text or analyzer recommendation)
    pub recommendation: String,
    /// Documentation link, rule findings only
    pub help_url: Option<String>,
    /// Inferred WCAG success criteria in dotted form (e.g. "1.4.3")
    pub wcag_criteria: Vec<String>,
    /// Nodes affected; zero for semantic findings
    pub affected_node_count: usize,
    /// Examples quoted from the page, semantic findings only
    pub examples: Vec<String>,
}
