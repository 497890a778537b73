//! Project record shape as delivered by the REST collaborator
//!
//! Every field is optional and inconsistently typed; the record carries
//! raw [`FieldValue`] cells and the rest of the crate reads them only
//! through the normalizer.

use crate::metrics::FieldValue;
use serde::{Deserialize, Serialize};

/// One project row from the dashboard backend.
///
/// Field names map 1:1 to the REST payload's camelCase keys. Absent keys
/// deserialize as [`FieldValue::Null`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRecord {
    #[serde(rename = "projectNo")]
    pub project_no: FieldValue,
    #[serde(rename = "projectTitle")]
    pub project_title: FieldValue,
    #[serde(rename = "client")]
    pub client: FieldValue,
    #[serde(rename = "projectManager")]
    pub project_manager: FieldValue,

    #[serde(rename = "projectCompletionPercent")]
    pub project_completion_percent: FieldValue,
    #[serde(rename = "projectKPIsAchievedPercent")]
    pub project_kpis_achieved_percent: FieldValue,
    #[serde(rename = "qualityBillabilityPercent")]
    pub quality_billability_percent: FieldValue,

    #[serde(rename = "carsOpen")]
    pub cars_open: FieldValue,
    #[serde(rename = "carsClosed")]
    pub cars_closed: FieldValue,
    #[serde(rename = "carsDelayedClosingNoDays")]
    pub cars_delayed_closing_no_days: FieldValue,

    #[serde(rename = "obsOpen")]
    pub obs_open: FieldValue,
    #[serde(rename = "obsClosed")]
    pub obs_closed: FieldValue,
    #[serde(rename = "obsDelayedClosingNoDays")]
    pub obs_delayed_closing_no_days: FieldValue,

    #[serde(rename = "delayInAuditsNoDays")]
    pub delay_in_audits_no_days: FieldValue,
    #[serde(rename = "audit1Date")]
    pub audit1_date: FieldValue,
    #[serde(rename = "audit2Date")]
    pub audit2_date: FieldValue,
    #[serde(rename = "audit3Date")]
    pub audit3_date: FieldValue,
    #[serde(rename = "audit4Date")]
    pub audit4_date: FieldValue,
    #[serde(rename = "audit5Date")]
    pub audit5_date: FieldValue,
    #[serde(rename = "audit6Date")]
    pub audit6_date: FieldValue,

    #[serde(rename = "projectQualityPlanStatusRev")]
    pub project_quality_plan_status_rev: FieldValue,
    #[serde(rename = "projectQualityPlanStatusIssueDate")]
    pub project_quality_plan_status_issue_date: FieldValue,
}

impl ProjectRecord {
    /// True when the record carries at least one identity field.
    ///
    /// Unidentified rows are incomplete backend data, not zero-metric
    /// projects; they are excluded from classification, detection, and
    /// aggregation.
    pub fn is_identified(&self) -> bool {
        !self.project_no.is_blank() || !self.project_title.is_blank()
    }

    /// Project number as display text, empty when absent.
    pub fn project_no_text(&self) -> String {
        self.project_no.text().unwrap_or_default()
    }

    /// Project title as display text, empty when absent.
    pub fn project_title_text(&self) -> String {
        self.project_title.text().unwrap_or_default()
    }

    /// Number of audit date cells carrying data.
    ///
    /// Only presence matters to the engine; the date values themselves are
    /// never interpreted.
    pub fn planned_audit_count(&self) -> usize {
        [
            &self.audit1_date,
            &self.audit2_date,
            &self.audit3_date,
            &self.audit4_date,
            &self.audit5_date,
            &self.audit6_date,
        ]
        .iter()
        .filter(|date| !date.is_blank())
        .count()
    }
}
