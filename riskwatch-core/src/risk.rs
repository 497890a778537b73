//! Risk tier classification
//!
//! Global invariants enforced:
//! - The cascade is total: every record lands in exactly one tier
//! - Evaluation is top-to-bottom, first matching tier wins
//! - Deterministic classification, pure function of the derived metrics

use crate::metrics::ProjectMetrics;
use crate::record::ProjectRecord;
use serde::{Deserialize, Serialize};

/// Risk tier classification for a single project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Critical,
    High,
    Medium,
    Low,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Critical => "critical",
            RiskTier::High => "high",
            RiskTier::Medium => "medium",
            RiskTier::Low => "low",
        }
    }
}

/// Configurable bounds for the tier cascade.
///
/// The ordering of conditions is fixed; only the numeric bounds move.
/// Defaults encode the dashboard's triage policy: open non-conformances
/// and audit breaches dominate billability, which dominates KPI.
#[derive(Debug, Clone, Copy)]
pub struct TierThresholds {
    /// CRITICAL when open CARs reach this count
    pub critical_cars_open: f64,
    /// CRITICAL when open observations reach this count
    pub critical_obs_open: f64,
    /// CRITICAL when the audit delay reaches this many days
    pub critical_audit_delay: f64,
    /// CRITICAL when completion reaches this percent with any CAR still open
    pub critical_completion: f64,
    /// CRITICAL when billability falls below this percent...
    pub critical_billability: f64,
    /// ...and completion has passed this percent
    pub critical_billability_completion: f64,
    /// CRITICAL when CAR closure is delayed this many days
    pub critical_cars_delayed: f64,
    /// CRITICAL when observation closure is delayed this many days
    pub critical_obs_delayed: f64,

    /// HIGH when open CARs reach this count
    pub high_cars_open: f64,
    /// HIGH when open observations reach this count
    pub high_obs_open: f64,
    /// HIGH when billability falls below this percent
    pub high_billability: f64,
    /// HIGH when KPI achievement falls below this percent
    pub high_kpi: f64,
    /// HIGH when completion reaches this percent with anything still open
    pub high_completion: f64,

    /// MEDIUM when billability falls below this percent
    pub medium_billability: f64,
    /// MEDIUM when KPI achievement falls below this percent
    pub medium_kpi: f64,
    /// MEDIUM when completion is below this percent...
    pub medium_completion: f64,
    /// ...and billability is below this percent
    pub medium_completion_billability: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        TierThresholds {
            critical_cars_open: 3.0,
            critical_obs_open: 5.0,
            critical_audit_delay: 30.0,
            critical_completion: 80.0,
            critical_billability: 30.0,
            critical_billability_completion: 50.0,
            critical_cars_delayed: 45.0,
            critical_obs_delayed: 60.0,
            high_cars_open: 1.0,
            high_obs_open: 2.0,
            high_billability: 50.0,
            high_kpi: 70.0,
            high_completion: 90.0,
            medium_billability: 70.0,
            medium_kpi: 85.0,
            medium_completion: 30.0,
            medium_completion_billability: 60.0,
        }
    }
}

/// Classify a project from its normalized metrics.
///
/// The cascade short-circuits: once a tier matches, lower tiers are never
/// checked. Always terminates in [`RiskTier::Low`].
pub fn classify(metrics: &ProjectMetrics, thresholds: &TierThresholds) -> RiskTier {
    if is_critical(metrics, thresholds) {
        RiskTier::Critical
    } else if is_high(metrics, thresholds) {
        RiskTier::High
    } else if is_medium(metrics, thresholds) {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

/// Classify a raw record, or `None` for unidentified rows.
pub fn classify_record(record: &ProjectRecord, thresholds: &TierThresholds) -> Option<RiskTier> {
    if !record.is_identified() {
        return None;
    }
    Some(classify(&ProjectMetrics::from_record(record), thresholds))
}

fn is_critical(m: &ProjectMetrics, t: &TierThresholds) -> bool {
    m.cars_open >= t.critical_cars_open
        || m.obs_open >= t.critical_obs_open
        || m.audit_delay >= t.critical_audit_delay
        || (m.completion >= t.critical_completion && m.cars_open > 0.0)
        || (m.billability < t.critical_billability
            && m.completion > t.critical_billability_completion)
        || m.cars_delayed >= t.critical_cars_delayed
        || m.obs_delayed >= t.critical_obs_delayed
}

fn is_high(m: &ProjectMetrics, t: &TierThresholds) -> bool {
    m.cars_open >= t.high_cars_open
        || m.obs_open >= t.high_obs_open
        || m.audit_delay > 0.0
        || m.billability < t.high_billability
        || m.kpi_achieved < t.high_kpi
        || (m.completion >= t.high_completion && (m.cars_open > 0.0 || m.obs_open > 0.0))
        || m.cars_delayed > 0.0
        || m.obs_delayed > 0.0
}

fn is_medium(m: &ProjectMetrics, t: &TierThresholds) -> bool {
    m.billability < t.medium_billability
        || m.kpi_achieved < t.medium_kpi
        || (m.completion < t.medium_completion && m.billability < t.medium_completion_billability)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Baseline with every metric in the healthy range, so a test can
    /// flip exactly one condition at a time.
    fn healthy_metrics() -> ProjectMetrics {
        ProjectMetrics {
            completion: 50.0,
            billability: 90.0,
            kpi_achieved: 95.0,
            cars_open: 0.0,
            obs_open: 0.0,
            audit_delay: 0.0,
            cars_delayed: 0.0,
            obs_delayed: 0.0,
        }
    }

    fn classify_default(metrics: &ProjectMetrics) -> RiskTier {
        classify(metrics, &TierThresholds::default())
    }

    #[test]
    fn test_healthy_project_is_low() {
        assert_eq!(classify_default(&healthy_metrics()), RiskTier::Low);
    }

    #[test]
    fn test_critical_rules() {
        let cases: Vec<ProjectMetrics> = vec![
            ProjectMetrics {
                cars_open: 3.0,
                ..healthy_metrics()
            },
            ProjectMetrics {
                obs_open: 5.0,
                ..healthy_metrics()
            },
            ProjectMetrics {
                audit_delay: 30.0,
                ..healthy_metrics()
            },
            ProjectMetrics {
                completion: 80.0,
                cars_open: 1.0,
                ..healthy_metrics()
            },
            ProjectMetrics {
                billability: 29.0,
                completion: 51.0,
                ..healthy_metrics()
            },
            ProjectMetrics {
                cars_delayed: 45.0,
                ..healthy_metrics()
            },
            ProjectMetrics {
                obs_delayed: 60.0,
                ..healthy_metrics()
            },
        ];
        for metrics in cases {
            assert_eq!(classify_default(&metrics), RiskTier::Critical, "{metrics:?}");
        }
    }

    #[test]
    fn test_high_rules() {
        let cases: Vec<ProjectMetrics> = vec![
            ProjectMetrics {
                cars_open: 1.0,
                ..healthy_metrics()
            },
            ProjectMetrics {
                obs_open: 2.0,
                ..healthy_metrics()
            },
            ProjectMetrics {
                audit_delay: 1.0,
                ..healthy_metrics()
            },
            ProjectMetrics {
                billability: 49.0,
                ..healthy_metrics()
            },
            ProjectMetrics {
                kpi_achieved: 69.0,
                ..healthy_metrics()
            },
            ProjectMetrics {
                completion: 90.0,
                obs_open: 1.0,
                ..healthy_metrics()
            },
            ProjectMetrics {
                cars_delayed: 1.0,
                ..healthy_metrics()
            },
            ProjectMetrics {
                obs_delayed: 1.0,
                ..healthy_metrics()
            },
        ];
        for metrics in cases {
            assert_eq!(classify_default(&metrics), RiskTier::High, "{metrics:?}");
        }
    }

    #[test]
    fn test_medium_rules() {
        let cases: Vec<ProjectMetrics> = vec![
            ProjectMetrics {
                billability: 65.0,
                ..healthy_metrics()
            },
            ProjectMetrics {
                kpi_achieved: 84.0,
                ..healthy_metrics()
            },
            ProjectMetrics {
                completion: 20.0,
                billability: 59.0,
                kpi_achieved: 90.0,
                ..healthy_metrics()
            },
        ];
        for metrics in cases {
            assert_eq!(classify_default(&metrics), RiskTier::Medium, "{metrics:?}");
        }
    }

    #[test]
    fn test_cascade_short_circuit() {
        // Meets a CRITICAL condition and several HIGH conditions: the
        // first matching tier wins.
        let metrics = ProjectMetrics {
            cars_open: 4.0,
            obs_open: 2.0,
            billability: 40.0,
            kpi_achieved: 50.0,
            ..healthy_metrics()
        };
        assert_eq!(classify_default(&metrics), RiskTier::Critical);
    }

    #[test]
    fn test_monotonic_cars_open_boundary() {
        let two_open = ProjectMetrics {
            cars_open: 2.0,
            ..healthy_metrics()
        };
        let three_open = ProjectMetrics {
            cars_open: 3.0,
            ..healthy_metrics()
        };
        assert_eq!(classify_default(&two_open), RiskTier::High);
        assert_eq!(classify_default(&three_open), RiskTier::Critical);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = TierThresholds {
            critical_cars_open: 10.0,
            high_cars_open: 5.0,
            ..TierThresholds::default()
        };
        let metrics = ProjectMetrics {
            cars_open: 4.0,
            ..healthy_metrics()
        };
        assert_eq!(classify(&metrics, &thresholds), RiskTier::Low);
    }

    #[test]
    fn test_classify_record_skips_unidentified() {
        let record = ProjectRecord::default();
        assert_eq!(classify_record(&record, &TierThresholds::default()), None);
    }

    #[test]
    fn test_tier_as_str() {
        assert_eq!(RiskTier::Critical.as_str(), "critical");
        assert_eq!(RiskTier::High.as_str(), "high");
        assert_eq!(RiskTier::Medium.as_str(), "medium");
        assert_eq!(RiskTier::Low.as_str(), "low");
    }
}
