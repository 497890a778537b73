//! Configuration file support for riskwatch
//!
//! Loads threshold overrides from a JSON file. All fields are optional;
//! anything omitted falls back to the built-in triage policy.

use crate::issues::{IssueThresholds, Severity};
use crate::risk::TierThresholds;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Riskwatch configuration loaded from a JSON config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskwatchConfig {
    /// Overrides for the tier cascade bounds
    #[serde(default)]
    pub tiers: Option<TierThresholdConfig>,

    /// Overrides for the issue detector bands
    #[serde(default)]
    pub issues: Option<IssueThresholdConfig>,

    /// Minimum severity counted per category in the summary
    /// (default: "critical")
    #[serde(default)]
    pub severity_floor: Option<String>,
}

/// Tier cascade overrides. Field meanings match [`TierThresholds`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierThresholdConfig {
    pub critical_cars_open: Option<f64>,
    pub critical_obs_open: Option<f64>,
    pub critical_audit_delay: Option<f64>,
    pub critical_completion: Option<f64>,
    pub critical_billability: Option<f64>,
    pub critical_billability_completion: Option<f64>,
    pub critical_cars_delayed: Option<f64>,
    pub critical_obs_delayed: Option<f64>,
    pub high_cars_open: Option<f64>,
    pub high_obs_open: Option<f64>,
    pub high_billability: Option<f64>,
    pub high_kpi: Option<f64>,
    pub high_completion: Option<f64>,
    pub medium_billability: Option<f64>,
    pub medium_kpi: Option<f64>,
    pub medium_completion: Option<f64>,
    pub medium_completion_billability: Option<f64>,
}

/// Issue detector overrides. Field meanings match [`IssueThresholds`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IssueThresholdConfig {
    pub cars_critical: Option<f64>,
    pub cars_high: Option<f64>,
    pub audit_critical: Option<f64>,
    pub audit_high: Option<f64>,
    pub kpi_critical: Option<f64>,
    pub kpi_high: Option<f64>,
    pub billability_critical: Option<f64>,
    pub billability_high: Option<f64>,
    pub obs_delay_critical: Option<f64>,
    pub obs_delay_medium: Option<f64>,
    pub obs_open_high: Option<f64>,
}

/// Fully-defaulted configuration ready for the engine.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedConfig {
    pub tiers: TierThresholds,
    pub issues: IssueThresholds,
    pub severity_floor: Severity,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        ResolvedConfig {
            tiers: TierThresholds::default(),
            issues: IssueThresholds::default(),
            severity_floor: Severity::Critical,
        }
    }
}

impl RiskwatchConfig {
    /// Validate the configuration for logical errors.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref t) = self.tiers {
            let defaults = TierThresholds::default();
            let fields = [
                ("critical_cars_open", t.critical_cars_open),
                ("critical_obs_open", t.critical_obs_open),
                ("critical_audit_delay", t.critical_audit_delay),
                ("critical_completion", t.critical_completion),
                ("critical_billability", t.critical_billability),
                (
                    "critical_billability_completion",
                    t.critical_billability_completion,
                ),
                ("critical_cars_delayed", t.critical_cars_delayed),
                ("critical_obs_delayed", t.critical_obs_delayed),
                ("high_cars_open", t.high_cars_open),
                ("high_obs_open", t.high_obs_open),
                ("high_billability", t.high_billability),
                ("high_kpi", t.high_kpi),
                ("high_completion", t.high_completion),
                ("medium_billability", t.medium_billability),
                ("medium_kpi", t.medium_kpi),
                ("medium_completion", t.medium_completion),
                (
                    "medium_completion_billability",
                    t.medium_completion_billability,
                ),
            ];
            for (name, value) in fields {
                if let Some(v) = value {
                    if !v.is_finite() || v < 0.0 {
                        anyhow::bail!("tiers.{} must be a non-negative number (got {})", name, v);
                    }
                }
            }

            let high_cars = t.high_cars_open.unwrap_or(defaults.high_cars_open);
            let critical_cars = t.critical_cars_open.unwrap_or(defaults.critical_cars_open);
            if high_cars > critical_cars {
                anyhow::bail!(
                    "tiers.high_cars_open ({}) must not exceed tiers.critical_cars_open ({})",
                    high_cars,
                    critical_cars
                );
            }
            let high_obs = t.high_obs_open.unwrap_or(defaults.high_obs_open);
            let critical_obs = t.critical_obs_open.unwrap_or(defaults.critical_obs_open);
            if high_obs > critical_obs {
                anyhow::bail!(
                    "tiers.high_obs_open ({}) must not exceed tiers.critical_obs_open ({})",
                    high_obs,
                    critical_obs
                );
            }
        }

        if let Some(ref i) = self.issues {
            let defaults = IssueThresholds::default();
            let fields = [
                ("cars_critical", i.cars_critical),
                ("cars_high", i.cars_high),
                ("audit_critical", i.audit_critical),
                ("audit_high", i.audit_high),
                ("kpi_critical", i.kpi_critical),
                ("kpi_high", i.kpi_high),
                ("billability_critical", i.billability_critical),
                ("billability_high", i.billability_high),
                ("obs_delay_critical", i.obs_delay_critical),
                ("obs_delay_medium", i.obs_delay_medium),
                ("obs_open_high", i.obs_open_high),
            ];
            for (name, value) in fields {
                if let Some(v) = value {
                    if !v.is_finite() || v < 0.0 {
                        anyhow::bail!("issues.{} must be a non-negative number (got {})", name, v);
                    }
                }
            }

            let cars_high = i.cars_high.unwrap_or(defaults.cars_high);
            let cars_critical = i.cars_critical.unwrap_or(defaults.cars_critical);
            if cars_high > cars_critical {
                anyhow::bail!(
                    "issues.cars_high ({}) must not exceed issues.cars_critical ({})",
                    cars_high,
                    cars_critical
                );
            }
            let audit_high = i.audit_high.unwrap_or(defaults.audit_high);
            let audit_critical = i.audit_critical.unwrap_or(defaults.audit_critical);
            if audit_high > audit_critical {
                anyhow::bail!(
                    "issues.audit_high ({}) must not exceed issues.audit_critical ({})",
                    audit_high,
                    audit_critical
                );
            }
            // KPI is lower-is-worse: the critical bound sits below high
            let kpi_critical = i.kpi_critical.unwrap_or(defaults.kpi_critical);
            let kpi_high = i.kpi_high.unwrap_or(defaults.kpi_high);
            if kpi_critical > kpi_high {
                anyhow::bail!(
                    "issues.kpi_critical ({}) must not exceed issues.kpi_high ({})",
                    kpi_critical,
                    kpi_high
                );
            }
            let billability_high = i.billability_high.unwrap_or(defaults.billability_high);
            let billability_critical = i
                .billability_critical
                .unwrap_or(defaults.billability_critical);
            if billability_high > billability_critical {
                anyhow::bail!(
                    "issues.billability_high ({}) must not exceed issues.billability_critical ({})",
                    billability_high,
                    billability_critical
                );
            }
            let obs_delay_medium = i.obs_delay_medium.unwrap_or(defaults.obs_delay_medium);
            let obs_delay_critical = i.obs_delay_critical.unwrap_or(defaults.obs_delay_critical);
            if obs_delay_medium > obs_delay_critical {
                anyhow::bail!(
                    "issues.obs_delay_medium ({}) must not exceed issues.obs_delay_critical ({})",
                    obs_delay_medium,
                    obs_delay_critical
                );
            }
        }

        if let Some(ref floor) = self.severity_floor {
            if Severity::parse(floor).is_none() {
                anyhow::bail!(
                    "severity_floor must be one of critical, high, medium (got {:?})",
                    floor
                );
            }
        }

        Ok(())
    }

    /// Resolve config into a fully-defaulted form ready for use.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let tier_defaults = TierThresholds::default();
        let tiers = match &self.tiers {
            Some(t) => TierThresholds {
                critical_cars_open: t
                    .critical_cars_open
                    .unwrap_or(tier_defaults.critical_cars_open),
                critical_obs_open: t
                    .critical_obs_open
                    .unwrap_or(tier_defaults.critical_obs_open),
                critical_audit_delay: t
                    .critical_audit_delay
                    .unwrap_or(tier_defaults.critical_audit_delay),
                critical_completion: t
                    .critical_completion
                    .unwrap_or(tier_defaults.critical_completion),
                critical_billability: t
                    .critical_billability
                    .unwrap_or(tier_defaults.critical_billability),
                critical_billability_completion: t
                    .critical_billability_completion
                    .unwrap_or(tier_defaults.critical_billability_completion),
                critical_cars_delayed: t
                    .critical_cars_delayed
                    .unwrap_or(tier_defaults.critical_cars_delayed),
                critical_obs_delayed: t
                    .critical_obs_delayed
                    .unwrap_or(tier_defaults.critical_obs_delayed),
                high_cars_open: t.high_cars_open.unwrap_or(tier_defaults.high_cars_open),
                high_obs_open: t.high_obs_open.unwrap_or(tier_defaults.high_obs_open),
                high_billability: t.high_billability.unwrap_or(tier_defaults.high_billability),
                high_kpi: t.high_kpi.unwrap_or(tier_defaults.high_kpi),
                high_completion: t.high_completion.unwrap_or(tier_defaults.high_completion),
                medium_billability: t
                    .medium_billability
                    .unwrap_or(tier_defaults.medium_billability),
                medium_kpi: t.medium_kpi.unwrap_or(tier_defaults.medium_kpi),
                medium_completion: t
                    .medium_completion
                    .unwrap_or(tier_defaults.medium_completion),
                medium_completion_billability: t
                    .medium_completion_billability
                    .unwrap_or(tier_defaults.medium_completion_billability),
            },
            None => tier_defaults,
        };

        let issue_defaults = IssueThresholds::default();
        let issues = match &self.issues {
            Some(i) => IssueThresholds {
                cars_critical: i.cars_critical.unwrap_or(issue_defaults.cars_critical),
                cars_high: i.cars_high.unwrap_or(issue_defaults.cars_high),
                audit_critical: i.audit_critical.unwrap_or(issue_defaults.audit_critical),
                audit_high: i.audit_high.unwrap_or(issue_defaults.audit_high),
                kpi_critical: i.kpi_critical.unwrap_or(issue_defaults.kpi_critical),
                kpi_high: i.kpi_high.unwrap_or(issue_defaults.kpi_high),
                billability_critical: i
                    .billability_critical
                    .unwrap_or(issue_defaults.billability_critical),
                billability_high: i
                    .billability_high
                    .unwrap_or(issue_defaults.billability_high),
                obs_delay_critical: i
                    .obs_delay_critical
                    .unwrap_or(issue_defaults.obs_delay_critical),
                obs_delay_medium: i
                    .obs_delay_medium
                    .unwrap_or(issue_defaults.obs_delay_medium),
                obs_open_high: i.obs_open_high.unwrap_or(issue_defaults.obs_open_high),
            },
            None => issue_defaults,
        };

        let severity_floor = self
            .severity_floor
            .as_deref()
            .and_then(Severity::parse)
            .unwrap_or(Severity::Critical);

        Ok(ResolvedConfig {
            tiers,
            issues,
            severity_floor,
        })
    }
}

/// Load config from an explicit file path.
pub fn load_config_file(path: &Path) -> Result<RiskwatchConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: RiskwatchConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_triage_policy() {
        let resolved = RiskwatchConfig::default().resolve().unwrap();
        assert_eq!(resolved.tiers.critical_cars_open, 3.0);
        assert_eq!(resolved.tiers.high_kpi, 70.0);
        assert_eq!(resolved.tiers.medium_billability, 70.0);
        assert_eq!(resolved.issues.cars_critical, 5.0);
        assert_eq!(resolved.issues.kpi_critical, 60.0);
        assert_eq!(resolved.issues.billability_high, 100.0);
        assert_eq!(resolved.issues.obs_delay_critical, 14.0);
        assert_eq!(resolved.severity_floor, Severity::Critical);
    }

    #[test]
    fn test_partial_override() {
        let config: RiskwatchConfig = serde_json::from_str(
            r#"{
                "tiers": { "critical_cars_open": 4 },
                "issues": { "cars_high": 2 },
                "severity_floor": "high"
            }"#,
        )
        .unwrap();
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.tiers.critical_cars_open, 4.0);
        assert_eq!(resolved.tiers.critical_obs_open, 5.0);
        assert_eq!(resolved.issues.cars_high, 2.0);
        assert_eq!(resolved.issues.cars_critical, 5.0);
        assert_eq!(resolved.severity_floor, Severity::High);
    }

    #[test]
    fn test_rejects_negative_threshold() {
        let config = RiskwatchConfig {
            issues: Some(IssueThresholdConfig {
                cars_high: Some(-1.0),
                ..IssueThresholdConfig::default()
            }),
            ..RiskwatchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_bands() {
        let config = RiskwatchConfig {
            issues: Some(IssueThresholdConfig {
                cars_high: Some(8.0),
                ..IssueThresholdConfig::default()
            }),
            ..RiskwatchConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cars_high"));

        let config = RiskwatchConfig {
            issues: Some(IssueThresholdConfig {
                kpi_critical: Some(80.0),
                ..IssueThresholdConfig::default()
            }),
            ..RiskwatchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_severity_floor() {
        let config = RiskwatchConfig {
            severity_floor: Some("blocking".to_string()),
            ..RiskwatchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let result: std::result::Result<RiskwatchConfig, _> =
            serde_json::from_str(r#"{ "thresholds": {} }"#);
        assert!(result.is_err());
    }
}
