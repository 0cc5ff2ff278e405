//! Engagement context supplied with every request

use crate::{RiskAssessment, RiskLevel};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Facts about the engagement that shape defaults and advisory warnings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuditContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_end: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    pub group_audit: bool,
    pub first_year_audit: bool,
    pub listed_entity: bool,
    pub previous_risk_assessments: Vec<RiskAssessment>,
}

impl AuditContext {
    /// Inherent risk of the most relevant prior assessment, if any.
    pub fn prior_inherent_risk(&self) -> Option<RiskLevel> {
        self.previous_risk_assessments
            .first()
            .map(|assessment| assessment.inherent_risk)
    }

    /// Case-insensitive industry comparison.
    pub fn is_industry(&self, industry: &str) -> bool {
        self.industry
            .as_deref()
            .is_some_and(|value| value.trim().eq_ignore_ascii_case(industry))
    }
}
