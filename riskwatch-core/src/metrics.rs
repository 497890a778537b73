//! Metric normalization for spreadsheet-backed project records
//!
//! Global invariants enforced:
//! - Normalization is total: every input maps to a finite, non-negative number
//! - Absence, `null`, `""`, and `"N/A"` are all treated as "no data"
//! - No raw field access for numeric comparisons anywhere in the crate

use crate::record::ProjectRecord;
use serde::{Deserialize, Serialize};

/// A single cell of a project record as delivered by the REST backend.
///
/// The backend is spreadsheet-shaped: the same column may carry a number,
/// a numeric string, a percent string like `"83%"`, an empty string, the
/// sentinel `"N/A"`, or nothing at all. The untagged representation lets
/// serde absorb all of these without a custom deserializer per field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// True when the cell carries no usable data.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Number(_) => false,
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a")
            }
        }
    }

    /// Text content of the cell, or `None` when blank.
    ///
    /// Numbers render the way the source spreadsheet shows them (no
    /// trailing `.0` for whole values), so numeric project numbers still
    /// work as identifiers.
    pub fn text(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Number(n) => Some(format_metric(*n)),
            FieldValue::Text(s) => {
                if self.is_blank() {
                    None
                } else {
                    Some(s.trim().to_string())
                }
            }
        }
    }
}

/// Normalize a plain numeric cell.
///
/// Blank cells and unparsable text coerce to `0.0`. Non-finite and
/// negative results also normalize to `0.0` so every downstream metric is
/// a finite, non-negative number.
pub fn parse_number(value: &FieldValue) -> f64 {
    let parsed = match value {
        FieldValue::Null => 0.0,
        FieldValue::Number(n) => *n,
        FieldValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
    };
    clamp_metric(parsed)
}

/// Normalize a percentage cell.
///
/// Identical to [`parse_number`] except a single trailing `%` is stripped
/// before parsing. Numeric input is already scaled: `83.0` means 83%,
/// never 0.83.
pub fn parse_percentage(value: &FieldValue) -> f64 {
    let parsed = match value {
        FieldValue::Null => 0.0,
        FieldValue::Number(n) => *n,
        FieldValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
                0.0
            } else {
                let stripped = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
                stripped.parse::<f64>().unwrap_or(0.0)
            }
        }
    };
    clamp_metric(parsed)
}

/// Enforce the finite, non-negative invariant on a parsed value.
fn clamp_metric(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Format a normalized metric for titles and detail strings.
///
/// Whole values print without a fractional part (`"4"`, not `"4.0"`).
pub fn format_metric(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Normalized metric view of a project record.
///
/// Every field is produced by [`parse_number`] / [`parse_percentage`];
/// the classifier and issue detector read only this struct.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProjectMetrics {
    pub completion: f64,
    pub billability: f64,
    pub kpi_achieved: f64,
    pub cars_open: f64,
    pub obs_open: f64,
    pub audit_delay: f64,
    pub cars_delayed: f64,
    pub obs_delayed: f64,
}

impl ProjectMetrics {
    /// Extract all derived metrics from a raw record.
    pub fn from_record(record: &ProjectRecord) -> Self {
        ProjectMetrics {
            completion: parse_percentage(&record.project_completion_percent),
            billability: parse_percentage(&record.quality_billability_percent),
            kpi_achieved: parse_percentage(&record.project_kpis_achieved_percent),
            cars_open: parse_number(&record.cars_open),
            obs_open: parse_number(&record.obs_open),
            audit_delay: parse_number(&record.delay_in_audits_no_days),
            cars_delayed: parse_number(&record.cars_delayed_closing_no_days),
            obs_delayed: parse_number(&record.obs_delayed_closing_no_days),
        }
    }
}
