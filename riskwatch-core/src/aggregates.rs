//! Dashboard summary aggregation
//!
//! Global invariants enforced:
//! - Aggregates are strictly derived (never stored, always computed)
//! - Deterministic category ordering
//! - No modification of records, tiers, or issues

use crate::issues::{Issue, IssueCategory, Severity};
use crate::metrics::parse_number;
use crate::record::ProjectRecord;
use crate::risk::{classify_record, RiskTier, TierThresholds};
use serde::{Deserialize, Serialize};

/// Project counts per risk tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TierCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// Issue count for one category at/above the severity floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CategoryCount {
    pub category: IssueCategory,
    pub count: usize,
}

/// Scalar summary counters consumed by the dashboard cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DashboardSummary {
    /// Identified projects only; unidentified rows never count.
    pub total_projects: usize,
    pub tiers: TierCounts,
    /// Severity applied when counting issues per category.
    pub severity_floor: Severity,
    /// Per-category issue counts at/above the floor, in detection order.
    pub issue_counts: Vec<CategoryCount>,
    /// Open CARs across all identified projects, breaching or not.
    pub total_open_cars: f64,
    /// Open observations across all identified projects, breaching or not.
    pub total_open_observations: f64,
}

/// Fold records and detected issues into dashboard counters.
///
/// Read-only over its inputs; tier counts are recomputed from the records
/// so the summary never depends on caller-side classification state.
pub fn compute_summary(
    projects: &[ProjectRecord],
    issues: &[Issue],
    tier_thresholds: &TierThresholds,
    severity_floor: Severity,
) -> DashboardSummary {
    let mut total_projects = 0;
    let mut tiers = TierCounts::default();
    let mut total_open_cars = 0.0;
    let mut total_open_observations = 0.0;

    for record in projects {
        let Some(tier) = classify_record(record, tier_thresholds) else {
            continue;
        };
        total_projects += 1;
        match tier {
            RiskTier::Critical => tiers.critical += 1,
            RiskTier::High => tiers.high += 1,
            RiskTier::Medium => tiers.medium += 1,
            RiskTier::Low => tiers.low += 1,
        }
        total_open_cars += parse_number(&record.cars_open);
        total_open_observations += parse_number(&record.obs_open);
    }

    let issue_counts = IssueCategory::ALL
        .iter()
        .map(|&category| CategoryCount {
            category,
            count: issues
                .iter()
                .filter(|issue| {
                    issue.category == category
                        && issue.severity.ordinal() >= severity_floor.ordinal()
                })
                .count(),
        })
        .collect();

    DashboardSummary {
        total_projects,
        tiers,
        severity_floor,
        issue_counts,
        total_open_cars,
        total_open_observations,
    }
}
