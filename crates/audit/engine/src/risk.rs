//! Risk assessor (ISA 240 / ISA 315).
//!
//! Account-level scoring from qualitative factors and the control
//! environment, plus the engagement-level significant risks presumed from
//! context alone.

use crate::ruleset::RiskRules;
use audit_types::{
    AuditContext, ControlEnvironment, EngineError, EngineResult, RiskAssessment, RiskFactors,
    RiskLevel,
};
use tracing::{debug, warn};

/// Inherent risk from complexity, judgment and volatility.
pub fn inherent_risk(factors: &RiskFactors) -> RiskLevel {
    let drivers = factors.inherent_drivers();
    if drivers.iter().any(|rating| RiskFactors::is_high(*rating)) {
        RiskLevel::Significant
    } else if drivers.iter().any(|rating| RiskFactors::is_moderate(*rating)) {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

/// Control risk from the entity-level control environment.
pub fn control_risk(environment: &ControlEnvironment) -> RiskLevel {
    if environment.has_weakness() {
        RiskLevel::High
    } else if environment.is_strong() {
        RiskLevel::Low
    } else {
        RiskLevel::Moderate
    }
}

pub fn combined_risk(inherent: RiskLevel, control: RiskLevel) -> RiskLevel {
    inherent.worst(control)
}

impl RiskRules {
    /// Whether an account label falls under the presumed revenue-recognition risk.
    pub fn is_revenue_recognition(&self, subject: &str) -> bool {
        let subject = subject.to_lowercase();
        self.revenue_recognition_patterns
            .iter()
            .any(|pattern| subject.contains(&pattern.to_lowercase()))
    }
}

/// Score one account or assertion.
pub fn assess_account_risk(
    rules: &RiskRules,
    subject: &str,
    assertions: &[String],
    factors: &RiskFactors,
    environment: &ControlEnvironment,
) -> EngineResult<RiskAssessment> {
    let subject = subject.trim();
    if subject.is_empty() {
        warn!("risk assessment requested without an account");
        return Err(EngineError::missing("account name required for risk assessment"));
    }

    let inherent = inherent_risk(factors);
    let control = control_risk(environment);
    let combined = combined_risk(inherent, control);

    let is_fraud_risk = RiskFactors::is_high(factors.fraud_susceptibility)
        || rules.is_revenue_recognition(subject);
    let is_significant_risk = inherent == RiskLevel::Significant
        && (is_fraud_risk
            || factors.related_party
            || RiskFactors::is_high(factors.complexity)
            || RiskFactors::is_high(factors.judgment)
            || factors.non_routine
            || factors.outside_normal_course);

    let assessment = RiskAssessment {
        subject: subject.to_string(),
        assertions: assertions.to_vec(),
        inherent_risk: inherent,
        control_risk: control,
        combined_risk: combined,
        is_significant_risk,
        is_fraud_risk,
        rationale: rationale(factors, inherent, control, is_significant_risk, is_fraud_risk),
        response_required: responses(is_significant_risk, is_fraud_risk, combined),
    };

    debug!(
        subject = %assessment.subject,
        inherent = %inherent,
        control = %control,
        combined = %combined,
        significant = is_significant_risk,
        fraud = is_fraud_risk,
        "account risk assessed"
    );

    Ok(assessment)
}

fn rationale(
    factors: &RiskFactors,
    inherent: RiskLevel,
    control: RiskLevel,
    is_significant: bool,
    is_fraud: bool,
) -> String {
    let mut parts: Vec<String> = Vec::new();
    if is_fraud {
        parts.push("Fraud risk due to susceptibility to manipulation or misappropriation.".into());
    }
    if RiskFactors::is_high(factors.complexity) {
        parts.push("Complex transactions or accounting requiring specialized knowledge.".into());
    }
    if RiskFactors::is_high(factors.judgment) {
        parts.push("Significant management judgment and estimation involved.".into());
    }
    if factors.related_party {
        parts.push("Related party transactions outside normal course of business.".into());
    }
    if RiskFactors::is_high(factors.volatility) {
        parts.push("High volatility in account balance or subject to external factors.".into());
    }
    if is_significant {
        parts.push("Assessed as significant risk requiring substantive procedures.".into());
    }
    parts.push(format!("Inherent risk: {inherent}, Control risk: {control}."));
    parts.join(" ")
}

fn responses(is_significant: bool, is_fraud: bool, combined: RiskLevel) -> Vec<String> {
    let mut out: Vec<&str> = Vec::new();
    if is_significant {
        out.extend([
            "Substantive procedures required (cannot rely solely on controls)",
            "Senior team member involvement in procedure performance and review",
            "Enhanced documentation of audit work and conclusions",
        ]);
    }
    if is_fraud {
        out.extend([
            "Incorporate element of unpredictability in audit procedures",
            "Professional skepticism throughout audit process",
        ]);
    }
    match combined {
        RiskLevel::High | RiskLevel::Significant => out.extend([
            "Expanded sample sizes for testing",
            "Lower performance materiality threshold",
            "More persuasive audit evidence required",
        ]),
        RiskLevel::Moderate => out.extend([
            "Standard substantive procedures",
            "Consider reliance on controls if design effective",
        ]),
        RiskLevel::Low => out.extend([
            "Reduced substantive procedures may be appropriate",
            "Analytical procedures may provide sufficient evidence",
        ]),
    }
    out.into_iter().map(String::from).collect()
}

struct PresumedRisk {
    subject: &'static str,
    assertions: &'static [&'static str],
    control_risk: RiskLevel,
    is_fraud_risk: bool,
    rationale: &'static str,
    responses: &'static [&'static str],
}

impl PresumedRisk {
    fn to_assessment(&self) -> RiskAssessment {
        RiskAssessment {
            subject: self.subject.to_string(),
            assertions: self.assertions.iter().map(|a| a.to_string()).collect(),
            inherent_risk: RiskLevel::Significant,
            control_risk: self.control_risk,
            combined_risk: combined_risk(RiskLevel::Significant, self.control_risk),
            is_significant_risk: true,
            is_fraud_risk: self.is_fraud_risk,
            rationale: self.rationale.to_string(),
            response_required: self.responses.iter().map(|r| r.to_string()).collect(),
        }
    }
}

static REVENUE_RECOGNITION: PresumedRisk = PresumedRisk {
    subject: "Revenue Recognition",
    assertions: &["occurrence", "cutoff", "accuracy"],
    control_risk: RiskLevel::Moderate,
    is_fraud_risk: true,
    rationale: "Presumed fraud risk per ISA 240. Revenue recognition is susceptible to manipulation and involves significant judgment in timing and measurement.",
    responses: &[
        "Substantive procedures mandatory (cannot rely solely on controls)",
        "Test journal entries and unusual transactions",
        "Perform detailed analytical procedures",
        "Examine significant transactions near period end",
    ],
};

// Control risk is high: the risk exists precisely because controls can be bypassed.
static MANAGEMENT_OVERRIDE: PresumedRisk = PresumedRisk {
    subject: "Management Override of Controls",
    assertions: &["occurrence", "completeness", "accuracy"],
    control_risk: RiskLevel::High,
    is_fraud_risk: true,
    rationale: "Presumed fraud risk per ISA 240. Management has ability to override controls, creating risk across all financial statement areas.",
    responses: &[
        "Test journal entries throughout period and at period end",
        "Review accounting estimates for bias",
        "Evaluate business rationale for significant unusual transactions",
        "Test appropriateness of manual journal entries",
    ],
};

static FAIR_VALUE_INSTRUMENTS: PresumedRisk = PresumedRisk {
    subject: "Fair Value of Financial Instruments",
    assertions: &["valuation-allocation"],
    control_risk: RiskLevel::Moderate,
    is_fraud_risk: false,
    rationale: "Complex valuation models with significant unobservable inputs and management judgment in Level 3 fair value measurements.",
    responses: &[
        "Engage valuation specialist",
        "Test valuation models and assumptions",
        "Independently develop fair value estimates",
        "Review model validation and governance",
    ],
};

static INVENTORY_VALUATION: PresumedRisk = PresumedRisk {
    subject: "Inventory Valuation",
    assertions: &["existence", "valuation-allocation"],
    control_risk: RiskLevel::Moderate,
    is_fraud_risk: false,
    rationale: "Complex cost allocation for WIP and finished goods, judgment in overhead absorption rates, and risk of obsolescence.",
    responses: &[
        "Attend physical inventory counts",
        "Test overhead allocation methodologies",
        "Review slow-moving and obsolete inventory provisions",
        "Verify cost flow assumptions",
    ],
};

static GROUP_CONSOLIDATION: PresumedRisk = PresumedRisk {
    subject: "Group Consolidation and Goodwill",
    assertions: &["valuation-allocation", "classification", "presentation-disclosure"],
    control_risk: RiskLevel::Moderate,
    is_fraud_risk: false,
    rationale: "Complex consolidation procedures, goodwill impairment testing involves significant judgment, and intercompany eliminations.",
    responses: &[
        "Test consolidation procedures and eliminations",
        "Evaluate goodwill impairment testing methodology",
        "Review management forecasts and assumptions",
        "Test foreign currency translation",
    ],
};

/// Engagement-level significant risks presumed from context alone.
///
/// Revenue recognition and management override are always present; the
/// rest depend on industry and whether this is a group audit.
pub fn identify_significant_risks(context: &AuditContext) -> Vec<RiskAssessment> {
    let mut presumed = vec![&REVENUE_RECOGNITION, &MANAGEMENT_OVERRIDE];
    if context.is_industry("Financial Services") {
        presumed.push(&FAIR_VALUE_INSTRUMENTS);
    }
    if context.is_industry("Manufacturing") {
        presumed.push(&INVENTORY_VALUATION);
    }
    if context.group_audit {
        presumed.push(&GROUP_CONSOLIDATION);
    }

    let risks: Vec<RiskAssessment> = presumed.iter().map(|risk| risk.to_assessment()).collect();
    debug!(count = risks.len(), industry = ?context.industry, "significant risks identified");
    risks
}

/// The presumed risks that are fraud risks.
pub fn evaluate_fraud_risks(context: &AuditContext) -> Vec<RiskAssessment> {
    identify_significant_risks(context)
        .into_iter()
        .filter(|risk| risk.is_fraud_risk)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit_types::{FactorRating, ToneRating};

    fn assess(subject: &str, factors: RiskFactors, env: ControlEnvironment) -> RiskAssessment {
        assess_account_risk(&RiskRules::default(), subject, &[], &factors, &env).unwrap()
    }

    #[test]
    fn revenue_with_high_complexity_is_significant_fraud_risk() {
        let factors = RiskFactors {
            complexity: Some(FactorRating::High),
            ..RiskFactors::default()
        };
        let result = assess("Revenue - product sales", factors, ControlEnvironment::default());

        assert_eq!(result.inherent_risk, RiskLevel::Significant);
        assert_eq!(result.control_risk, RiskLevel::Moderate);
        assert_eq!(result.combined_risk, RiskLevel::Significant);
        assert!(result.is_fraud_risk);
        assert!(result.is_significant_risk);
        assert_eq!(
            result.rationale,
            "Fraud risk due to susceptibility to manipulation or misappropriation. \
             Complex transactions or accounting requiring specialized knowledge. \
             Assessed as significant risk requiring substantive procedures. \
             Inherent risk: significant, Control risk: moderate."
        );
        assert_eq!(
            result.response_required.first().map(String::as_str),
            Some("Substantive procedures required (cannot rely solely on controls)")
        );
        assert_eq!(result.response_required.len(), 8);
    }

    #[test]
    fn strong_environment_and_quiet_factors_are_low() {
        let result = assess("Prepayments", RiskFactors::default(), ControlEnvironment::strong());
        assert_eq!(result.combined_risk, RiskLevel::Low);
        assert!(!result.is_significant_risk);
        assert_eq!(
            result.response_required,
            vec![
                "Reduced substantive procedures may be appropriate".to_string(),
                "Analytical procedures may provide sufficient evidence".to_string(),
            ]
        );
    }

    #[test]
    fn weak_tone_drives_combined_risk_high() {
        let env = ControlEnvironment {
            tone: ToneRating::Weak,
            ..ControlEnvironment::default()
        };
        let factors = RiskFactors {
            volatility: Some(FactorRating::Moderate),
            ..RiskFactors::default()
        };
        let result = assess("Accruals", factors, env);
        assert_eq!(result.inherent_risk, RiskLevel::Moderate);
        assert_eq!(result.control_risk, RiskLevel::High);
        assert_eq!(result.combined_risk, RiskLevel::High);
        assert!(!result.is_significant_risk);
    }

    #[test]
    fn high_volatility_alone_is_not_significant() {
        let factors = RiskFactors {
            volatility: Some(FactorRating::High),
            ..RiskFactors::default()
        };
        let result = assess("Foreign exchange", factors, ControlEnvironment::default());
        assert_eq!(result.inherent_risk, RiskLevel::Significant);
        assert!(!result.is_significant_risk);
    }

    #[test]
    fn blank_subject_is_missing_input() {
        let err = assess_account_risk(
            &RiskRules::default(),
            "   ",
            &[],
            &RiskFactors::default(),
            &ControlEnvironment::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::MissingInput(_)));
    }

    #[test]
    fn significance_never_pairs_with_low_combined_risk() {
        for complexity in [None, Some(FactorRating::Low), Some(FactorRating::High)] {
            for env in [ControlEnvironment::strong(), ControlEnvironment::default()] {
                let factors = RiskFactors {
                    complexity,
                    related_party: true,
                    ..RiskFactors::default()
                };
                let result = assess("Loans to directors", factors, env);
                if result.is_significant_risk {
                    assert_ne!(result.combined_risk, RiskLevel::Low);
                }
            }
        }
    }

    #[test]
    fn presumed_risks_follow_context() {
        let base = identify_significant_risks(&AuditContext::default());
        assert_eq!(
            base.iter().map(|r| r.subject.as_str()).collect::<Vec<_>>(),
            vec!["Revenue Recognition", "Management Override of Controls"]
        );

        let ctx = AuditContext {
            industry: Some("manufacturing".into()),
            group_audit: true,
            ..AuditContext::default()
        };
        let risks = identify_significant_risks(&ctx);
        assert_eq!(risks.len(), 4);
        assert_eq!(risks[2].subject, "Inventory Valuation");
        assert_eq!(risks[3].subject, "Group Consolidation and Goodwill");
        assert!(risks.iter().all(|r| r.is_significant_risk));
        assert_eq!(risks[1].combined_risk, RiskLevel::High);
    }

    #[test]
    fn fraud_risks_are_the_presumed_isa_240_pair() {
        let ctx = AuditContext {
            industry: Some("Financial Services".into()),
            ..AuditContext::default()
        };
        let fraud = evaluate_fraud_risks(&ctx);
        assert_eq!(fraud.len(), 2);
        assert!(fraud.iter().all(|r| r.is_fraud_risk));
    }
}
