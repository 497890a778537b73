//! Critical-issue detection and severity ranking
//!
//! Global invariants enforced:
//! - At most one issue per category per project; first matching band wins
//! - Categories are scanned in a fixed, explicit order
//! - `sort_value` is monotonic with breach magnitude regardless of the
//!   category's polarity
//! - Ranking is a stable sort; ties keep input order

use crate::metrics::{format_metric, ProjectMetrics};
use crate::record::ProjectRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Issue category, one per dashboard alert stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Cars,
    Audit,
    Kpi,
    Billability,
    Observations,
}

/// Direction in which a category's raw metric gets worse.
///
/// Explicit per category so future threshold edits cannot silently flip
/// the intended direction: KPI is bad when low, billability is bad when
/// high (over-billing is a scope-creep signal, not idle capacity).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    HigherIsWorse,
    LowerIsWorse,
}

impl IssueCategory {
    /// All categories in detection order.
    pub const ALL: [IssueCategory; 5] = [
        IssueCategory::Cars,
        IssueCategory::Audit,
        IssueCategory::Kpi,
        IssueCategory::Billability,
        IssueCategory::Observations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::Cars => "cars",
            IssueCategory::Audit => "audit",
            IssueCategory::Kpi => "kpi",
            IssueCategory::Billability => "billability",
            IssueCategory::Observations => "observations",
        }
    }

    pub fn polarity(&self) -> Polarity {
        match self {
            IssueCategory::Kpi => Polarity::LowerIsWorse,
            IssueCategory::Cars
            | IssueCategory::Audit
            | IssueCategory::Billability
            | IssueCategory::Observations => Polarity::HigherIsWorse,
        }
    }
}

/// Issue severity, ordered Critical > High > Medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
}

impl Severity {
    /// Ordinal used for ranking: Critical 3, High 2, Medium 1.
    pub fn ordinal(&self) -> u8 {
        match self {
            Severity::Critical => 3,
            Severity::High => 2,
            Severity::Medium => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
        }
    }

    /// Parse a severity name (case-insensitive), for config values.
    pub fn parse(name: &str) -> Option<Severity> {
        match name.trim().to_ascii_lowercase().as_str() {
            "critical" => Some(Severity::Critical),
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            _ => None,
        }
    }
}

/// A single detected issue. Ephemeral: recomputed from scratch on every
/// detection pass, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Issue {
    pub category: IssueCategory,
    pub severity: Severity,
    pub title: String,
    pub project: String,
    pub project_no: String,
    pub details: String,
    /// Raw metric value behind the breach.
    pub count: f64,
    /// Magnitude key for ranking; higher is always worse.
    pub sort_value: f64,
}

/// Configurable band thresholds for the issue detector.
#[derive(Debug, Clone, Copy)]
pub struct IssueThresholds {
    /// Critical when open CARs exceed this count
    pub cars_critical: f64,
    /// High when open CARs reach this count
    pub cars_high: f64,
    /// Critical when the audit delay exceeds this many days
    pub audit_critical: f64,
    /// High when the audit delay reaches this many days
    pub audit_high: f64,
    /// Critical when KPI achievement falls below this percent
    pub kpi_critical: f64,
    /// High when KPI achievement falls below this percent
    pub kpi_high: f64,
    /// Critical when billability exceeds this percent
    pub billability_critical: f64,
    /// High when billability exceeds this percent
    pub billability_high: f64,
    /// Critical when observation closure is overdue beyond this many days
    pub obs_delay_critical: f64,
    /// Medium when observation closure is overdue at least this many days
    pub obs_delay_medium: f64,
    /// High when open observations exceed this count (delay bands permitting)
    pub obs_open_high: f64,
}

impl Default for IssueThresholds {
    fn default() -> Self {
        IssueThresholds {
            cars_critical: 5.0,
            cars_high: 3.0,
            audit_critical: 10.0,
            audit_high: 5.0,
            kpi_critical: 60.0,
            kpi_high: 70.0,
            billability_critical: 120.0,
            billability_high: 100.0,
            obs_delay_critical: 14.0,
            obs_delay_medium: 7.0,
            obs_open_high: 10.0,
        }
    }
}

/// Per-project state shared by the category detectors.
struct IssueContext {
    project: String,
    project_no: String,
    metrics: ProjectMetrics,
    planned_audits: usize,
}

impl IssueContext {
    fn new(record: &ProjectRecord) -> Self {
        IssueContext {
            project: record.project_title_text(),
            project_no: record.project_no_text(),
            metrics: ProjectMetrics::from_record(record),
            planned_audits: record.planned_audit_count(),
        }
    }

    fn issue(
        &self,
        category: IssueCategory,
        severity: Severity,
        title: String,
        details: String,
        count: f64,
    ) -> Issue {
        let sort_value = match category.polarity() {
            Polarity::HigherIsWorse => count,
            Polarity::LowerIsWorse => 100.0 - count,
        };
        Issue {
            category,
            severity,
            title,
            project: self.project.clone(),
            project_no: self.project_no.clone(),
            details,
            count,
            sort_value,
        }
    }
}

type CategoryDetector = fn(&IssueContext, &IssueThresholds) -> Option<Issue>;

/// Detection table: one detector per category, scanned in order.
const DETECTORS: [CategoryDetector; 5] = [
    detect_cars,
    detect_audit,
    detect_kpi,
    detect_billability,
    detect_observations,
];

/// Scan every identified project against the category threshold bands.
///
/// A project contributes at most one issue per category but may appear in
/// several categories at once. Output order follows input order; callers
/// that want "most urgent first" apply [`rank_issues`].
pub fn detect_issues(projects: &[ProjectRecord], thresholds: &IssueThresholds) -> Vec<Issue> {
    let mut issues = Vec::new();
    for record in projects {
        if !record.is_identified() {
            continue;
        }
        let ctx = IssueContext::new(record);
        for detector in DETECTORS {
            if let Some(issue) = detector(&ctx, thresholds) {
                issues.push(issue);
            }
        }
    }
    issues
}

/// Stable sort: severity ordinal descending, then breach magnitude
/// descending. Ties keep their input order.
pub fn rank_issues(mut issues: Vec<Issue>) -> Vec<Issue> {
    issues.sort_by(|a, b| {
        b.severity
            .ordinal()
            .cmp(&a.severity.ordinal())
            .then_with(|| {
                b.sort_value
                    .partial_cmp(&a.sort_value)
                    .unwrap_or(Ordering::Equal)
            })
    });
    issues
}

fn detect_cars(ctx: &IssueContext, t: &IssueThresholds) -> Option<Issue> {
    let open = ctx.metrics.cars_open;
    let severity = if open > t.cars_critical {
        Severity::Critical
    } else if open >= t.cars_high {
        Severity::High
    } else {
        return None;
    };
    Some(ctx.issue(
        IssueCategory::Cars,
        severity,
        format!("{} Open CARs", format_metric(open)),
        format!(
            "Project has {} open corrective action requests awaiting closure",
            format_metric(open)
        ),
        open,
    ))
}

fn detect_audit(ctx: &IssueContext, t: &IssueThresholds) -> Option<Issue> {
    let delay = ctx.metrics.audit_delay;
    let severity = if delay > t.audit_critical {
        Severity::Critical
    } else if delay >= t.audit_high {
        Severity::High
    } else {
        return None;
    };
    let details = if ctx.planned_audits > 0 {
        format!(
            "Audit schedule has slipped by {} days against {} planned audit(s)",
            format_metric(delay),
            ctx.planned_audits
        )
    } else {
        format!(
            "Audit schedule has slipped by {} days",
            format_metric(delay)
        )
    };
    Some(ctx.issue(
        IssueCategory::Audit,
        severity,
        format!("Audit Delayed {} Days", format_metric(delay)),
        details,
        delay,
    ))
}

fn detect_kpi(ctx: &IssueContext, t: &IssueThresholds) -> Option<Issue> {
    let kpi = ctx.metrics.kpi_achieved;
    // 0% means the backend has no KPI data for this project, not a total
    // miss; skip rather than alert.
    if kpi <= 0.0 {
        return None;
    }
    let severity = if kpi < t.kpi_critical {
        Severity::Critical
    } else if kpi < t.kpi_high {
        Severity::High
    } else {
        return None;
    };
    Some(ctx.issue(
        IssueCategory::Kpi,
        severity,
        format!("KPI Achievement at {}%", format_metric(kpi)),
        format!(
            "Project KPIs achieved ({}%) are below the target band",
            format_metric(kpi)
        ),
        kpi,
    ))
}

fn detect_billability(ctx: &IssueContext, t: &IssueThresholds) -> Option<Issue> {
    let billability = ctx.metrics.billability;
    // Same absence convention as KPI: 0% is missing data, not zero hours.
    if billability <= 0.0 {
        return None;
    }
    let severity = if billability > t.billability_critical {
        Severity::Critical
    } else if billability > t.billability_high {
        Severity::High
    } else {
        return None;
    };
    Some(ctx.issue(
        IssueCategory::Billability,
        severity,
        format!("Billability at {}%", format_metric(billability)),
        format!(
            "Quality billability ({}%) exceeds planned hours, possible scope creep",
            format_metric(billability)
        ),
        billability,
    ))
}

fn detect_observations(ctx: &IssueContext, t: &IssueThresholds) -> Option<Issue> {
    let delayed = ctx.metrics.obs_delayed;
    let open = ctx.metrics.obs_open;
    // Delay bands take precedence over the raw open count.
    if delayed > t.obs_delay_critical {
        return Some(ctx.issue(
            IssueCategory::Observations,
            Severity::Critical,
            format!("Observations Overdue {} Days", format_metric(delayed)),
            format!(
                "Observation closure is overdue by {} days",
                format_metric(delayed)
            ),
            delayed,
        ));
    }
    if delayed >= t.obs_delay_medium {
        return Some(ctx.issue(
            IssueCategory::Observations,
            Severity::Medium,
            format!("Observations Overdue {} Days", format_metric(delayed)),
            format!(
                "Observation closure is overdue by {} days",
                format_metric(delayed)
            ),
            delayed,
        ));
    }
    if open > t.obs_open_high {
        return Some(ctx.issue(
            IssueCategory::Observations,
            Severity::High,
            format!("{} Open Observations", format_metric(open)),
            format!(
                "Project has {} open observations awaiting closure",
                format_metric(open)
            ),
            open,
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::FieldValue;

    fn record(project_no: &str) -> ProjectRecord {
        ProjectRecord {
            project_no: FieldValue::Text(project_no.to_string()),
            ..ProjectRecord::default()
        }
    }

    fn num(n: f64) -> FieldValue {
        FieldValue::Number(n)
    }

    fn detect_default(projects: &[ProjectRecord]) -> Vec<Issue> {
        detect_issues(projects, &IssueThresholds::default())
    }

    #[test]
    fn test_cars_bands() {
        let critical = ProjectRecord {
            cars_open: num(6.0),
            ..record("P-1")
        };
        let high = ProjectRecord {
            cars_open: num(3.0),
            ..record("P-2")
        };
        let clean = ProjectRecord {
            cars_open: num(2.0),
            ..record("P-3")
        };

        let issues = detect_default(&[critical, high, clean]);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[0].title, "6 Open CARs");
        assert_eq!(issues[0].sort_value, 6.0);
        assert_eq!(issues[1].severity, Severity::High);
        assert_eq!(issues[1].project_no, "P-2");
    }

    #[test]
    fn test_audit_bands() {
        let critical = ProjectRecord {
            delay_in_audits_no_days: num(11.0),
            audit1_date: FieldValue::Text("2026-03-01".to_string()),
            audit2_date: FieldValue::Text("2026-09-01".to_string()),
            ..record("P-1")
        };
        let high = ProjectRecord {
            delay_in_audits_no_days: num(5.0),
            ..record("P-2")
        };
        let clean = ProjectRecord {
            delay_in_audits_no_days: num(4.0),
            ..record("P-3")
        };

        let issues = detect_default(&[critical, high, clean]);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].severity, Severity::Critical);
        assert!(issues[0].details.contains("2 planned audit(s)"));
        assert_eq!(issues[1].severity, Severity::High);
        assert!(!issues[1].details.contains("planned"));
    }

    #[test]
    fn test_kpi_bands_and_polarity() {
        let critical = ProjectRecord {
            project_kpis_achieved_percent: FieldValue::Text("55%".to_string()),
            ..record("P-1")
        };
        let high = ProjectRecord {
            project_kpis_achieved_percent: num(65.0),
            ..record("P-2")
        };

        let issues = detect_default(&[critical, high]);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].severity, Severity::Critical);
        // Lower KPI is worse, so sort_value inverts the raw metric
        assert_eq!(issues[0].sort_value, 45.0);
        assert_eq!(issues[1].severity, Severity::High);
        assert_eq!(issues[1].sort_value, 35.0);
    }

    #[test]
    fn test_zero_percent_means_no_data() {
        // A 0% KPI or billability cell is absent data, never a breach.
        let kpi_zero = ProjectRecord {
            project_kpis_achieved_percent: FieldValue::Text("0%".to_string()),
            ..record("P-1")
        };
        let billability_zero = ProjectRecord {
            quality_billability_percent: num(0.0),
            ..record("P-2")
        };
        assert!(detect_default(&[kpi_zero, billability_zero]).is_empty());
    }

    #[test]
    fn test_billability_bands() {
        let critical = ProjectRecord {
            quality_billability_percent: FieldValue::Text("125%".to_string()),
            ..record("P-1")
        };
        let high = ProjectRecord {
            quality_billability_percent: num(110.0),
            ..record("P-2")
        };
        let clean = ProjectRecord {
            quality_billability_percent: num(95.0),
            ..record("P-3")
        };

        let issues = detect_default(&[critical, high, clean]);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].severity, Severity::Critical);
        // Higher billability is worse: sort_value is the raw percent
        assert_eq!(issues[0].sort_value, 125.0);
        assert_eq!(issues[1].severity, Severity::High);
    }

    #[test]
    fn test_observation_delay_precedence() {
        // Overdue 20 days with 50 open observations: the delay band wins
        let delayed = ProjectRecord {
            obs_delayed_closing_no_days: num(20.0),
            obs_open: num(50.0),
            ..record("P-1")
        };
        let issues = detect_default(&[delayed]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[0].count, 20.0);

        // Medium delay band also outranks the open-count band
        let medium = ProjectRecord {
            obs_delayed_closing_no_days: num(8.0),
            obs_open: num(50.0),
            ..record("P-2")
        };
        let issues = detect_default(&[medium]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Medium);

        // No delay: open count alone triggers the High band
        let open_only = ProjectRecord {
            obs_open: num(11.0),
            ..record("P-3")
        };
        let issues = detect_default(&[open_only]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::High);
        assert_eq!(issues[0].title, "11 Open Observations");
    }

    #[test]
    fn test_one_issue_per_category_many_categories() {
        let troubled = ProjectRecord {
            cars_open: num(7.0),
            delay_in_audits_no_days: num(12.0),
            project_kpis_achieved_percent: num(50.0),
            quality_billability_percent: num(130.0),
            obs_delayed_closing_no_days: num(21.0),
            ..record("P-1")
        };
        let issues = detect_default(&[troubled]);
        assert_eq!(issues.len(), 5);
        let categories: Vec<IssueCategory> = issues.iter().map(|i| i.category).collect();
        assert_eq!(categories, IssueCategory::ALL);
    }

    #[test]
    fn test_unidentified_records_skipped() {
        let anonymous = ProjectRecord {
            cars_open: num(9.0),
            ..ProjectRecord::default()
        };
        assert!(detect_default(&[anonymous]).is_empty());
    }

    #[test]
    fn test_rank_orders_by_severity_then_magnitude() {
        let projects = vec![
            ProjectRecord {
                cars_open: num(4.0),
                ..record("high-small")
            },
            ProjectRecord {
                cars_open: num(6.0),
                ..record("critical-small")
            },
            ProjectRecord {
                cars_open: num(9.0),
                ..record("critical-big")
            },
            ProjectRecord {
                cars_open: num(5.0),
                ..record("high-big")
            },
        ];
        let ranked = rank_issues(detect_default(&projects));
        let order: Vec<&str> = ranked.iter().map(|i| i.project_no.as_str()).collect();
        assert_eq!(
            order,
            vec!["critical-big", "critical-small", "high-big", "high-small"]
        );
    }

    #[test]
    fn test_rank_is_stable_on_ties() {
        let projects = vec![
            ProjectRecord {
                cars_open: num(4.0),
                ..record("first")
            },
            ProjectRecord {
                cars_open: num(4.0),
                ..record("second")
            },
        ];
        let ranked = rank_issues(detect_default(&projects));
        assert_eq!(ranked[0].project_no, "first");
        assert_eq!(ranked[1].project_no, "second");
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("critical"), Some(Severity::Critical));
        assert_eq!(Severity::parse(" High "), Some(Severity::High));
        assert_eq!(Severity::parse("medium"), Some(Severity::Medium));
        assert_eq!(Severity::parse("blocking"), None);
    }
}
