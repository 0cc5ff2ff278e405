//! Risk assessment inputs and results

use crate::{CompetenceRating, FactorRating, OversightRating, RiskLevel, ToneRating};
use serde::{Deserialize, Serialize};

/// Qualitative risk factors for an account or assertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RiskFactors {
    pub complexity: Option<FactorRating>,
    pub judgment: Option<FactorRating>,
    pub volatility: Option<FactorRating>,
    pub fraud_susceptibility: Option<FactorRating>,
    pub related_party: bool,
    pub non_routine: bool,
    pub outside_normal_course: bool,
}

impl RiskFactors {
    pub fn is_high(rating: Option<FactorRating>) -> bool {
        matches!(rating, Some(FactorRating::High))
    }

    pub fn is_moderate(rating: Option<FactorRating>) -> bool {
        matches!(rating, Some(FactorRating::Moderate))
    }

    /// Complexity, judgment and volatility, the drivers of inherent risk.
    pub fn inherent_drivers(&self) -> [Option<FactorRating>; 3] {
        [self.complexity, self.judgment, self.volatility]
    }
}

/// Entity-level control environment rating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlEnvironment {
    pub tone: ToneRating,
    pub competence: CompetenceRating,
    pub oversight: OversightRating,
}

impl ControlEnvironment {
    /// Strong tone, high competence, effective oversight.
    pub fn strong() -> Self {
        Self {
            tone: ToneRating::Strong,
            competence: CompetenceRating::High,
            oversight: OversightRating::Effective,
        }
    }

    pub fn has_weakness(&self) -> bool {
        self.tone == ToneRating::Weak
            || self.competence == CompetenceRating::Low
            || self.oversight == OversightRating::Inadequate
    }

    pub fn is_strong(&self) -> bool {
        self.tone == ToneRating::Strong
            && self.competence == CompetenceRating::High
            && self.oversight == OversightRating::Effective
    }
}

/// Assessed risk for an account, assertion or engagement-level matter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub subject: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertions: Vec<String>,
    pub inherent_risk: RiskLevel,
    pub control_risk: RiskLevel,
    pub combined_risk: RiskLevel,
    #[serde(default)]
    pub is_significant_risk: bool,
    #[serde(default)]
    pub is_fraud_risk: bool,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub response_required: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_environment_is_neither_weak_nor_strong() {
        let env = ControlEnvironment::default();
        assert!(!env.has_weakness());
        assert!(!env.is_strong());
    }

    #[test]
    fn one_weak_dimension_is_a_weakness() {
        let env = ControlEnvironment {
            oversight: OversightRating::Inadequate,
            ..ControlEnvironment::strong()
        };
        assert!(env.has_weakness());
        assert!(!env.is_strong());
    }

    #[test]
    fn factors_parse_from_partial_json() {
        let factors: RiskFactors =
            serde_json::from_str(r#"{"complexity":"high","relatedParty":true}"#).unwrap();
        assert!(RiskFactors::is_high(factors.complexity));
        assert!(factors.related_party);
        assert!(factors.judgment.is_none());
    }
}
