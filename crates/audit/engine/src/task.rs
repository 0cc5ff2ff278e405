//! Typed command table.
//!
//! A request's `task` string resolves to a [`TaskKind`]; its `parameters`
//! payload is then decoded into the matching [`Task`] variant. Anything that
//! fails to decode is an invalid-parameter error, never a panic.

use audit_types::{
    ComponentFigures, ControlEnvironment, ControlTest, EngineError, EngineResult, FinancialData,
    PopulationFigures, RiskFactors, RiskLevel, SampleResults, SamplingData,
};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    CalculateMateriality,
    AssessAccountRisk,
    IdentifySignificantRisks,
    EvaluateFraudRisks,
    CalculateSampleSize,
    ProjectMisstatement,
    EvaluateSampleResults,
    BenfordAnalysis,
    OutlierDetection,
    TestOperatingEffectiveness,
    ClassifyComponent,
    AllocateMateriality,
}

impl TaskKind {
    pub const ALL: [TaskKind; 12] = [
        TaskKind::CalculateMateriality,
        TaskKind::AssessAccountRisk,
        TaskKind::IdentifySignificantRisks,
        TaskKind::EvaluateFraudRisks,
        TaskKind::CalculateSampleSize,
        TaskKind::ProjectMisstatement,
        TaskKind::EvaluateSampleResults,
        TaskKind::BenfordAnalysis,
        TaskKind::OutlierDetection,
        TaskKind::TestOperatingEffectiveness,
        TaskKind::ClassifyComponent,
        TaskKind::AllocateMateriality,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::CalculateMateriality => "calculate_materiality",
            TaskKind::AssessAccountRisk => "assess_account_risk",
            TaskKind::IdentifySignificantRisks => "identify_significant_risks",
            TaskKind::EvaluateFraudRisks => "evaluate_fraud_risks",
            TaskKind::CalculateSampleSize => "calculate_sample_size",
            TaskKind::ProjectMisstatement => "project_misstatement",
            TaskKind::EvaluateSampleResults => "evaluate_sample_results",
            TaskKind::BenfordAnalysis => "benford_analysis",
            TaskKind::OutlierDetection => "outlier_detection",
            TaskKind::TestOperatingEffectiveness => "test_operating_effectiveness",
            TaskKind::ClassifyComponent => "classify_component",
            TaskKind::AllocateMateriality => "allocate_materiality",
        }
    }

    /// One-line description, used by `auditctl tasks`.
    pub fn summary(&self) -> &'static str {
        match self {
            TaskKind::CalculateMateriality => "Overall, performance and trivial materiality",
            TaskKind::AssessAccountRisk => "Inherent, control and combined risk for an account",
            TaskKind::IdentifySignificantRisks => "Engagement-level presumed significant risks",
            TaskKind::EvaluateFraudRisks => "Presumed fraud risks for the engagement",
            TaskKind::CalculateSampleSize => "Sample size, method and selection technique",
            TaskKind::ProjectMisstatement => "Project sample misstatements onto the population",
            TaskKind::EvaluateSampleResults => "Alias of project_misstatement",
            TaskKind::BenfordAnalysis => "Leading-digit test against Benford's Law",
            TaskKind::OutlierDetection => "Values beyond the sigma threshold",
            TaskKind::TestOperatingEffectiveness => "Control exception rate and deficiency",
            TaskKind::ClassifyComponent => "Group component size classification",
            TaskKind::AllocateMateriality => "Component materiality allocation",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| EngineError::UnknownTask(s.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaterialityParams {
    pub financial_data: Option<FinancialData>,
    pub risk_level: Option<RiskLevel>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccountRiskParams {
    pub account: String,
    pub assertions: Vec<String>,
    pub risk_factors: RiskFactors,
    pub control_environment: ControlEnvironment,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SampleSizeParams {
    pub sampling_data: Option<SamplingData>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectionParams {
    pub sampling_data: Option<SamplingData>,
    pub sample_results: Option<SampleResults>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationParams {
    #[serde(flatten)]
    pub figures: ComponentFigures,
    #[serde(default)]
    pub group_materiality: Option<Decimal>,
}

/// A task with its decoded parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    CalculateMateriality(MaterialityParams),
    AssessAccountRisk(AccountRiskParams),
    IdentifySignificantRisks,
    EvaluateFraudRisks,
    CalculateSampleSize(SampleSizeParams),
    ProjectMisstatement(ProjectionParams),
    BenfordAnalysis(PopulationFigures),
    OutlierDetection(PopulationFigures),
    TestOperatingEffectiveness(ControlTest),
    ClassifyComponent(ComponentFigures),
    AllocateMateriality(AllocationParams),
}

fn decode<T: DeserializeOwned>(kind: TaskKind, parameters: &Value) -> EngineResult<T> {
    let empty = Value::Object(serde_json::Map::new());
    let payload = if parameters.is_null() { &empty } else { parameters };
    T::deserialize(payload).map_err(|err| {
        EngineError::invalid(format!("malformed parameters for {kind}: {err}"))
    })
}

impl Task {
    pub fn parse(kind: TaskKind, parameters: &Value) -> EngineResult<Self> {
        Ok(match kind {
            TaskKind::CalculateMateriality => Task::CalculateMateriality(decode(kind, parameters)?),
            TaskKind::AssessAccountRisk => Task::AssessAccountRisk(decode(kind, parameters)?),
            TaskKind::IdentifySignificantRisks => Task::IdentifySignificantRisks,
            TaskKind::EvaluateFraudRisks => Task::EvaluateFraudRisks,
            TaskKind::CalculateSampleSize => Task::CalculateSampleSize(decode(kind, parameters)?),
            TaskKind::ProjectMisstatement | TaskKind::EvaluateSampleResults => {
                Task::ProjectMisstatement(decode(kind, parameters)?)
            }
            TaskKind::BenfordAnalysis => Task::BenfordAnalysis(decode(kind, parameters)?),
            TaskKind::OutlierDetection => Task::OutlierDetection(decode(kind, parameters)?),
            TaskKind::TestOperatingEffectiveness => {
                Task::TestOperatingEffectiveness(decode(kind, parameters)?)
            }
            TaskKind::ClassifyComponent => Task::ClassifyComponent(decode(kind, parameters)?),
            TaskKind::AllocateMateriality => Task::AllocateMateriality(decode(kind, parameters)?),
        })
    }

    /// Resolve a task name and decode its parameters in one step.
    pub fn from_request(task: &str, parameters: &Value) -> EngineResult<Self> {
        let kind: TaskKind = task.parse()?;
        Task::parse(kind, parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn every_kind_round_trips_its_name() {
        for kind in TaskKind::ALL {
            assert_eq!(kind.as_str().parse::<TaskKind>().unwrap(), kind);
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                json!(kind.as_str())
            );
        }
    }

    #[test]
    fn unknown_name_is_unknown_task() {
        let err = "draft_opinion".parse::<TaskKind>().unwrap_err();
        assert_eq!(err, EngineError::UnknownTask("draft_opinion".into()));
    }

    #[test]
    fn null_parameters_decode_as_empty() {
        let task = Task::from_request("calculate_materiality", &Value::Null).unwrap();
        assert_eq!(task, Task::CalculateMateriality(MaterialityParams::default()));
    }

    #[test]
    fn evaluate_sample_results_is_projection() {
        let task = Task::from_request("evaluate_sample_results", &json!({})).unwrap();
        assert!(matches!(task, Task::ProjectMisstatement(_)));
    }

    #[test]
    fn malformed_payload_is_invalid_parameter() {
        let err = Task::from_request(
            "calculate_sample_size",
            &json!({ "samplingData": { "populationSize": "many" } }),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter(_)));
        assert!(err.to_string().contains("calculate_sample_size"));
    }

    #[test]
    fn allocation_reads_flattened_figures() {
        let task = Task::from_request(
            "allocate_materiality",
            &json!({
                "component": "Sub A",
                "componentRevenue": 400,
                "groupRevenue": 1000,
                "groupMateriality": 100000
            }),
        )
        .unwrap();
        let Task::AllocateMateriality(params) = task else {
            panic!("expected allocation task");
        };
        assert_eq!(params.figures.component, "Sub A");
        assert_eq!(params.figures.component_revenue, Some(dec!(400)));
        assert_eq!(params.group_materiality, Some(dec!(100000)));
    }
}
