//! Result combiner: merges rule and semantic violation streams into a
//! single scored compliance report.
//!
//! The combiner is pure. It performs no I/O, holds no mutable state, and
//! never fails: the same inputs always produce the same report.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::report::{
    CombinedReport, ComplianceLevel, SeverityCounts, SourceCounts, WcagCoverage,
};
use crate::domain::violation::{
    NormalizedViolation, RawViolation, SemanticViolation, Severity, ViolationSource,
};
use crate::domain::wcag::{self, ConformanceLevel};

/// Score penalty per violation, by severity.
const PENALTY_CRITICAL: u32 = 10;
const PENALTY_SERIOUS: u32 = 5;
const PENALTY_MODERATE: u32 = 2;
const PENALTY_MINOR: u32 = 1;

/// Coverage threshold a level must reach to earn its compliance label.
const LEVEL_THRESHOLD: u8 = 90;

/// Merges the two violation streams, scores the result, and computes
/// WCAG coverage per conformance level.
pub struct ResultCombiner;

impl ResultCombiner {
    pub fn new() -> Self {
        Self
    }

    /// Combine rule and semantic findings into one report.
    ///
    /// Rule findings come first in the pre-sort order, in engine order;
    /// semantic findings follow, in analyzer order. The final list is
    /// sorted by severity rank with a stable sort, so equal-severity
    /// findings keep that relative order.
    pub fn combine(
        &self,
        rule_violations: &[RawViolation],
        semantic_violations: &[SemanticViolation],
    ) -> CombinedReport {
        let mut violations: Vec<NormalizedViolation> =
            Vec::with_capacity(rule_violations.len() + semantic_violations.len());

        violations.extend(rule_violations.iter().map(normalize_rule));
        violations.extend(semantic_violations.iter().map(normalize_semantic));

        // Vec::sort_by_key is a stable sort; ties keep input order.
        violations.sort_by_key(|v| v.severity.rank());

        let severity_counts = count_severities(&violations);
        let source_counts = count_sources(&violations);
        let violated: HashSet<&str> = violations
            .iter()
            .flat_map(|v| v.wcag_criteria.iter().map(String::as_str))
            .collect();

        let wcag_coverage = WcagCoverage {
            a: level_coverage(ConformanceLevel::A, &violated),
            aa: level_coverage(ConformanceLevel::AA, &violated),
            aaa: level_coverage(ConformanceLevel::AAA, &violated),
        };

        CombinedReport {
            compliance_score: compliance_score(&severity_counts),
            compliance_level: compliance_level(&wcag_coverage),
            violations,
            severity_counts,
            source_counts,
            wcag_coverage,
        }
    }
}

impl Default for ResultCombiner {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_rule(violation: &RawViolation) -> NormalizedViolation {
    let wcag_criteria = violation
        .tags
        .iter()
        .filter_map(|tag| wcag::criterion_from_tag(tag))
        .collect();

    NormalizedViolation {
        id: violation.rule_id.clone(),
        source: ViolationSource::Rule,
        severity: violation.impact,
        description: violation.description.clone(),
        recommendation: violation.help_text.clone(),
        help_url: Some(violation.help_url.clone()),
        wcag_criteria,
        affected_node_count: violation.affected_node_count,
        examples: Vec::new(),
    }
}

fn normalize_semantic(violation: &SemanticViolation) -> NormalizedViolation {
    let severity = violation
        .severity
        .as_deref()
        .and_then(Severity::parse)
        .unwrap_or(Severity::Moderate);

    let criteria = wcag::criteria_for_category(&violation.category);
    if criteria.is_empty() {
        debug!(
            category = %violation.category,
            "Semantic category has no WCAG mapping"
        );
    }

    NormalizedViolation {
        id: violation.category.clone(),
        source: ViolationSource::Semantic,
        severity,
        description: violation.description.clone(),
        recommendation: violation.recommendation.clone(),
        help_url: None,
        wcag_criteria: criteria.iter().map(|c| c.to_string()).collect(),
        affected_node_count: 0,
        examples: violation.examples.clone(),
    }
}

fn count_severities(violations: &[NormalizedViolation]) -> SeverityCounts {
    let mut counts = SeverityCounts::default();
    for violation in violations {
        match violation.severity {
            Severity::Critical => counts.critical += 1,
            Severity::Serious => counts.serious += 1,
            Severity::Moderate => counts.moderate += 1,
            Severity::Minor => counts.minor += 1,
        }
    }
    counts
}

fn count_sources(violations: &[NormalizedViolation]) -> SourceCounts {
    let mut counts = SourceCounts::default();
    for violation in violations {
        match violation.source {
            ViolationSource::Rule => counts.rule += 1,
            ViolationSource::Semantic => counts.semantic += 1,
        }
    }
    counts
}

/// `clamp(100 - 10c - 5s - 2m - n, 0, 100)`
fn compliance_score(counts: &SeverityCounts) -> u8 {
    let penalty = PENALTY_CRITICAL * counts.critical as u32
        + PENALTY_SERIOUS * counts.serious as u32
        + PENALTY_MODERATE * counts.moderate as u32
        + PENALTY_MINOR * counts.minor as u32;
    100u32.saturating_sub(penalty) as u8
}

/// `round(100 * (1 - violated/total))` over the level's canonical table.
fn level_coverage(level: ConformanceLevel, violated: &HashSet<&str>) -> u8 {
    let criteria = level.criteria();
    let violated_count = criteria
        .iter()
        .filter(|criterion| violated.contains(**criterion))
        .count();
    let fraction = 1.0 - violated_count as f64 / criteria.len() as f64;
    (fraction * 100.0).round() as u8
}

/// Bands are mutually exclusive and evaluated highest first; coverage
/// exactly at the threshold meets the band.
fn compliance_level(coverage: &WcagCoverage) -> ComplianceLevel {
    if coverage.aaa >= LEVEL_THRESHOLD {
        ComplianceLevel::Aaa
    } else if coverage.aa >= LEVEL_THRESHOLD {
        ComplianceLevel::Aa
    } else if coverage.a >= LEVEL_THRESHOLD {
        ComplianceLevel::A
    } else {
        ComplianceLevel::NotCompliant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(rule_id: &str, impact: Severity, tags: &[&str]) -> RawViolation {
        RawViolation {
            rule_id: rule_id.to_string(),
            impact,
            description: format!("{rule_id} description"),
            help_text: format!("fix {rule_id}"),
            help_url: format!("https://rules.example/{rule_id}"),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            affected_node_count: 1,
            sample_nodes: Vec::new(),
        }
    }

    fn semantic(category: &str, severity: Option<&str>) -> SemanticViolation {
        SemanticViolation {
            category: category.to_string(),
            severity: severity.map(|s| s.to_string()),
            description: format!("{category} description"),
            recommendation: format!("fix {category}"),
            examples: vec!["example".to_string()],
        }
    }

    #[test]
    fn empty_inputs_yield_clean_report() {
        let report = ResultCombiner::new().combine(&[], &[]);
        assert_eq!(report.compliance_score, 100);
        assert_eq!(report.wcag_coverage.a, 100);
        assert_eq!(report.wcag_coverage.aa, 100);
        assert_eq!(report.wcag_coverage.aaa, 100);
        assert_eq!(report.compliance_level, ComplianceLevel::Aaa);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn single_critical_contrast_violation() {
        // wcag143 is an AA criterion: one of 20 violated → round(95) = 95.
        let report =
            ResultCombiner::new().combine(&[rule("color-contrast", Severity::Critical, &["wcag143", "cat.color"])], &[]);

        assert_eq!(report.compliance_score, 90);
        assert_eq!(report.wcag_coverage.a, 100);
        assert_eq!(report.wcag_coverage.aa, 95);
        assert_eq!(report.wcag_coverage.aaa, 100);
        assert_eq!(report.violations[0].wcag_criteria, vec!["1.4.3"]);
        // AAA coverage is untouched, so the highest band still matches.
        assert_eq!(report.compliance_level, ComplianceLevel::Aaa);
    }

    #[test]
    fn one_violation_per_rule_id_not_per_node() {
        let mut violation = rule("image-alt", Severity::Critical, &["wcag111"]);
        violation.affected_node_count = 42;
        let report = ResultCombiner::new().combine(&[violation], &[]);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].affected_node_count, 42);
        assert_eq!(report.compliance_score, 90);
    }

    #[test]
    fn semantic_severity_defaults_to_moderate() {
        let report = ResultCombiner::new().combine(
            &[],
            &[
                semantic("unclear-link-text", None),
                semantic("ambiguous-heading", Some("nonsense")),
            ],
        );
        assert!(report
            .violations
            .iter()
            .all(|v| v.severity == Severity::Moderate));
        assert_eq!(report.compliance_score, 96);
    }

    #[test]
    fn unknown_semantic_category_counts_without_criteria() {
        let report = ResultCombiner::new().combine(&[], &[semantic("novel-issue", Some("minor"))]);
        assert_eq!(report.violations.len(), 1);
        assert!(report.violations[0].wcag_criteria.is_empty());
        assert_eq!(report.source_counts.semantic, 1);
        assert_eq!(report.compliance_score, 99);
        assert_eq!(report.wcag_coverage.a, 100);
    }

    #[test]
    fn sort_is_stable_within_severity() {
        let report = ResultCombiner::new().combine(
            &[
                rule("first-serious", Severity::Serious, &[]),
                rule("only-critical", Severity::Critical, &[]),
                rule("second-serious", Severity::Serious, &[]),
            ],
            &[semantic("unclear-link-text", Some("serious"))],
        );

        let ids: Vec<&str> = report.violations.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "only-critical",
                "first-serious",
                "second-serious",
                "unclear-link-text"
            ]
        );
    }

    #[test]
    fn combine_is_deterministic() {
        let rules = vec![
            rule("color-contrast", Severity::Serious, &["wcag143"]),
            rule("image-alt", Severity::Critical, &["wcag111"]),
        ];
        let semantics = vec![semantic("complex-language", Some("minor"))];

        let combiner = ResultCombiner::new();
        let first = combiner.combine(&rules, &semantics);
        let second = combiner.combine(&rules, &semantics);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn every_level_criterion_violated_drives_coverage_to_zero() {
        let violations: Vec<RawViolation> = ConformanceLevel::A
            .criteria()
            .iter()
            .map(|criterion| {
                let tag = format!("wcag{}", criterion.replace('.', ""));
                rule(criterion, Severity::Minor, &[tag.as_str()])
            })
            .collect();

        let report = ResultCombiner::new().combine(&violations, &[]);
        assert_eq!(report.wcag_coverage.a, 0);
        assert_eq!(report.wcag_coverage.aa, 100);
    }

    #[test]
    fn coverage_exactly_at_threshold_meets_the_band() {
        // 2 of 20 AA criteria violated → coverage 90, which still earns AA.
        let violations = vec![
            rule("contrast", Severity::Minor, &["wcag143"]),
            rule("resize", Severity::Minor, &["wcag144"]),
            // Knock AAA below the threshold: 3 of 28 violated → round(89.3) = 89.
            rule("low-contrast-enhanced", Severity::Minor, &["wcag146"]),
            rule("images-of-text", Severity::Minor, &["wcag149"]),
            rule("reflow-target", Severity::Minor, &["wcag148"]),
        ];
        let report = ResultCombiner::new().combine(&violations, &[]);
        assert_eq!(report.wcag_coverage.aa, 90);
        assert_eq!(report.wcag_coverage.aaa, 89);
        assert_eq!(report.compliance_level, ComplianceLevel::Aa);
    }

    #[test]
    fn score_clamps_at_zero() {
        let violations: Vec<RawViolation> = (0..15)
            .map(|i| rule(&format!("rule-{i}"), Severity::Critical, &[]))
            .collect();
        let report = ResultCombiner::new().combine(&violations, &[]);
        assert_eq!(report.compliance_score, 0);
    }

    #[test]
    fn counts_split_by_source() {
        let report = ResultCombiner::new().combine(
            &[rule("image-alt", Severity::Critical, &["wcag111"])],
            &[semantic("unclear-link-text", Some("serious"))],
        );
        assert_eq!(report.source_counts.rule, 1);
        assert_eq!(report.source_counts.semantic, 1);
        assert_eq!(report.severity_counts.critical, 1);
        assert_eq!(report.severity_counts.serious, 1);
        assert_eq!(report.severity_counts.total(), 2);
    }
}
