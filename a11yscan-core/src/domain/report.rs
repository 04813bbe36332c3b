//! Combined compliance report

use serde::{Deserialize, Serialize};

use super::violation::NormalizedViolation;

/// Compliance level label derived from coverage percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceLevel {
    #[serde(rename = "AAA")]
    Aaa,
    #[serde(rename = "AA")]
    Aa,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "Not Compliant")]
    NotCompliant,
}

impl std::fmt::Display for ComplianceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aaa => write!(f, "AAA"),
            Self::Aa => write!(f, "AA"),
            Self::A => write!(f, "A"),
            Self::NotCompliant => write!(f, "Not Compliant"),
        }
    }
}

/// Violation counts per severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub serious: usize,
    pub moderate: usize,
    pub minor: usize,
}

impl SeverityCounts {
    pub fn total(&self) -> usize {
        self.critical + self.serious + self.moderate + self.minor
    }
}

/// Violation counts per source pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceCounts {
    pub rule: usize,
    pub semantic: usize,
}

/// Coverage percentage (0-100) per conformance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WcagCoverage {
    pub a: u8,
    pub aa: u8,
    pub aaa: u8,
}

impl Default for WcagCoverage {
    fn default() -> Self {
        Self {
            a: 100,
            aa: 100,
            aaa: 100,
        }
    }
}

/// Merged and scored accessibility report for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedReport {
    /// Violations sorted by severity rank ascending, stable on ties
    pub violations: Vec<NormalizedViolation>,
    pub severity_counts: SeverityCounts,
    pub source_counts: SourceCounts,
    pub wcag_coverage: WcagCoverage,
    /// Linear penalty score, clamped to 0-100
    pub compliance_score: u8,
    pub compliance_level: ComplianceLevel,
}

impl CombinedReport {
    /// Report for a page with no findings at all.
    pub fn clean() -> Self {
        Self {
            violations: Vec::new(),
            severity_counts: SeverityCounts::default(),
            source_counts: SourceCounts::default(),
            wcag_coverage: WcagCoverage::default(),
            compliance_score: 100,
            compliance_level: ComplianceLevel::Aaa,
        }
    }
}
