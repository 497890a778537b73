//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Byte-for-byte identical output across runs

use crate::aggregates::DashboardSummary;
use crate::issues::Issue;
use crate::metrics::format_metric;
use crate::risk::RiskTier;
use serde::{Deserialize, Serialize};

/// Tier assignment for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProjectAssessment {
    pub project_no: String,
    pub project_title: String,
    pub tier: RiskTier,
}

/// Complete engine output for one batch of project records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PortfolioAssessment {
    /// One entry per identified record, in input order.
    pub projects: Vec<ProjectAssessment>,
    /// Detected issues, ranked most urgent first.
    pub issues: Vec<Issue>,
    pub summary: DashboardSummary,
}

/// Render ranked issues as a fixed-width text table.
pub fn render_text(issues: &[Issue]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<10} {:<14} {:<24} {}\n",
        "SEVERITY", "CATEGORY", "PROJECT", "TITLE"
    ));

    for issue in issues {
        let project = if issue.project.is_empty() {
            &issue.project_no
        } else {
            &issue.project
        };
        output.push_str(&format!(
            "{:<10} {:<14} {:<24} {}\n",
            issue.severity.as_str(),
            issue.category.as_str(),
            truncate_or_pad(project, 24),
            issue.title,
        ));
    }

    output
}

/// Render a complete assessment as JSON output.
pub fn render_json(assessment: &PortfolioAssessment) -> String {
    serde_json::to_string_pretty(assessment).unwrap_or_else(|_| "{}".to_string())
}

/// Render summary counters as key/value lines.
///
/// The label column is wide enough for the longest category label plus a
/// separator, so every counter lands in the same column.
pub fn summary_text(summary: &DashboardSummary) -> String {
    let mut output = String::new();
    output.push_str(&format!("{:<22}{}\n", "projects:", summary.total_projects));
    output.push_str(&format!("{:<22}{}\n", "  critical:", summary.tiers.critical));
    output.push_str(&format!("{:<22}{}\n", "  high:", summary.tiers.high));
    output.push_str(&format!("{:<22}{}\n", "  medium:", summary.tiers.medium));
    output.push_str(&format!("{:<22}{}\n", "  low:", summary.tiers.low));
    for entry in &summary.issue_counts {
        let label = format!("{} issues:", entry.category.as_str());
        output.push_str(&format!("{:<22}{}\n", label, entry.count));
    }
    output.push_str(&format!(
        "{:<22}{}\n",
        "open cars:",
        format_metric(summary.total_open_cars)
    ));
    output.push_str(&format!(
        "{:<22}{}\n",
        "open observations:",
        format_metric(summary.total_open_observations)
    ));
    output
}

/// Truncate or pad string to fixed width.
///
/// Truncation counts characters, not bytes; project titles are free text
/// and may carry multi-byte characters at any position.
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}
