//! Riskwatch core library - QHSE project risk classification and
//! critical-issue detection

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Classification and detection are strictly per-record
// - No global mutable state
// - No randomness, clocks, threads, or async
// - Rule cascade and category scan order must be explicit
// - Identical input yields byte-for-byte identical output

pub mod aggregates;
pub mod config;
pub mod issues;
pub mod metrics;
pub mod record;
pub mod report;
pub mod risk;

pub use aggregates::{compute_summary, CategoryCount, DashboardSummary, TierCounts};
pub use config::{load_config_file, ResolvedConfig, RiskwatchConfig};
pub use issues::{
    detect_issues, rank_issues, Issue, IssueCategory, IssueThresholds, Polarity, Severity,
};
pub use metrics::{parse_number, parse_percentage, FieldValue, ProjectMetrics};
pub use record::ProjectRecord;
pub use report::{render_json, render_text, summary_text, PortfolioAssessment, ProjectAssessment};
pub use risk::{classify, classify_record, RiskTier, TierThresholds};

/// Assess a batch of project records with the default triage policy.
pub fn assess(projects: &[ProjectRecord]) -> PortfolioAssessment {
    assess_with_config(projects, &ResolvedConfig::default())
}

/// Assess a batch of project records: classify every identified record,
/// detect and rank issues, and fold the dashboard summary.
///
/// Pure and synchronous; recomputed from scratch on every invocation, so
/// overlapping refreshes are safe and the caller decides which result to
/// keep.
pub fn assess_with_config(
    projects: &[ProjectRecord],
    config: &ResolvedConfig,
) -> PortfolioAssessment {
    let assessments = projects
        .iter()
        .filter_map(|record| {
            classify_record(record, &config.tiers).map(|tier| ProjectAssessment {
                project_no: record.project_no_text(),
                project_title: record.project_title_text(),
                tier,
            })
        })
        .collect();

    let issues = rank_issues(detect_issues(projects, &config.issues));
    let summary = compute_summary(projects, &issues, &config.tiers, config.severity_floor);

    PortfolioAssessment {
        projects: assessments,
        issues,
        summary,
    }
}
