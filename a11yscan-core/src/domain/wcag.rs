//! WCAG 2.1 success criteria: canonical level tables, tag parsing, and
//! the semantic-category lookup table.

use serde::{Deserialize, Serialize};

/// A WCAG success criterion in dotted form, e.g. "1.4.3".
pub type WcagCriterion = String;

/// WCAG conformance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConformanceLevel {
    A,
    AA,
    AAA,
}

impl ConformanceLevel {
    /// The canonical list of WCAG 2.1 success criteria belonging to this
    /// level (the level's own criteria, not cumulative).
    pub fn criteria(self) -> &'static [&'static str] {
        match self {
            Self::A => LEVEL_A,
            Self::AA => LEVEL_AA,
            Self::AAA => LEVEL_AAA,
        }
    }
}

impl std::fmt::Display for ConformanceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::AA => write!(f, "AA"),
            Self::AAA => write!(f, "AAA"),
        }
    }
}

/// WCAG 2.1 Level A success criteria.
static LEVEL_A: &[&str] = &[
    "1.1.1", "1.2.1", "1.2.2", "1.2.3", "1.3.1", "1.3.2", "1.3.3", "1.4.1", "1.4.2", "2.1.1",
    "2.1.2", "2.1.4", "2.2.1", "2.2.2", "2.3.1", "2.4.1", "2.4.2", "2.4.3", "2.4.4", "2.5.1",
    "2.5.2", "2.5.3", "2.5.4", "3.1.1", "3.2.1", "3.2.2", "3.3.1", "3.3.2", "4.1.1", "4.1.2",
];

/// WCAG 2.1 Level AA success criteria.
static LEVEL_AA: &[&str] = &[
    "1.2.4", "1.2.5", "1.3.4", "1.3.5", "1.4.3", "1.4.4", "1.4.5", "1.4.10", "1.4.11", "1.4.12",
    "1.4.13", "2.4.5", "2.4.6", "2.4.7", "3.1.2", "3.2.3", "3.2.4", "3.3.3", "3.3.4", "4.1.3",
];

/// WCAG 2.1 Level AAA success criteria.
static LEVEL_AAA: &[&str] = &[
    "1.2.6", "1.2.7", "1.2.8", "1.2.9", "1.3.6", "1.4.6", "1.4.7", "1.4.8", "1.4.9", "2.1.3",
    "2.2.3", "2.2.4", "2.2.5", "2.2.6", "2.3.2", "2.3.3", "2.4.8", "2.4.9", "2.4.10", "2.5.5",
    "2.5.6", "3.1.3", "3.1.4", "3.1.5", "3.1.6", "3.2.5", "3.3.5", "3.3.6",
];

/// Convert a rule engine tag like `wcag143` or `wcag1410` to dotted form
/// (`1.4.3`, `1.4.10`). Returns `None` for tags that are not WCAG
/// criterion tags (`wcag2a`, `best-practice`, ...).
pub fn criterion_from_tag(tag: &str) -> Option<WcagCriterion> {
    let digits = tag.strip_prefix("wcag")?;
    if digits.len() < 3 || digits.len() > 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    // First digit is the principle, second the guideline, the rest the
    // criterion number. Guidelines never exceed one digit in WCAG 2.1.
    let principle = &digits[0..1];
    let guideline = &digits[1..2];
    let criterion = &digits[2..];

    Some(format!("{principle}.{guideline}.{criterion}"))
}

/// Fixed mapping from semantic analyzer categories to WCAG criteria.
/// Unknown categories map to an empty set; the combiner logs them so the
/// table can be extended.
pub fn criteria_for_category(category: &str) -> &'static [&'static str] {
    match category {
        "unclear-link-text" => &["2.4.4", "2.4.9"],
        "uninformative-alt-text" => &["1.1.1"],
        "ambiguous-heading" => &["2.4.6"],
        "unclear-button-label" => &["2.4.6", "4.1.2"],
        "missing-form-context" => &["3.3.2"],
        "unclear-error-message" => &["3.3.1", "3.3.3"],
        "inconsistent-navigation" => &["3.2.3"],
        "complex-language" => &["3.1.5"],
        "uninformative-page-title" => &["2.4.2"],
        "unexplained-abbreviation" => &["3.1.4"],
        "sensory-only-instructions" => &["1.3.3"],
        _ => &[],
    }
}
