//! Sample design and misstatement projection

use crate::RiskLevel;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Population and risk parameters for sizing a sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingData {
    pub population_size: u64,
    pub population_value: Decimal,
    #[serde(default)]
    pub assessed_risk: RiskLevel,
    pub tolerable_misstatement: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_misstatement: Option<Decimal>,
}

impl SamplingData {
    pub fn new(
        population_size: u64,
        population_value: Decimal,
        assessed_risk: RiskLevel,
        tolerable_misstatement: Decimal,
    ) -> Self {
        Self {
            population_size,
            population_value,
            assessed_risk,
            tolerable_misstatement,
            expected_misstatement: None,
        }
    }

    pub fn with_expected_misstatement(mut self, expected: Decimal) -> Self {
        self.expected_misstatement = Some(expected);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SamplingMethod {
    Statistical,
    NonStatistical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionTechnique {
    Random,
    MonetaryUnit,
}

/// Sampling approach and size for one population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleDesign {
    pub method: SamplingMethod,
    pub selection_technique: SelectionTechnique,
    pub sample_size: u64,
    pub population_size: u64,
    pub risk_multiplier: Decimal,
    pub dampening_factor: Decimal,
    /// True when the population is small enough that every item is examined.
    pub full_population: bool,
    pub rationale: String,
}

/// Whether a found misstatement is isolated or typical of the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MisstatementKind {
    /// Demonstrably isolated; counted as-is and never projected.
    Anomaly,
    /// Assumed typical; scaled up to the population.
    Representative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Misstatement {
    pub amount: Decimal,
    pub kind: MisstatementKind,
}

impl Misstatement {
    pub fn anomaly(amount: Decimal) -> Self {
        Self {
            amount,
            kind: MisstatementKind::Anomaly,
        }
    }

    pub fn representative(amount: Decimal) -> Self {
        Self {
            amount,
            kind: MisstatementKind::Representative,
        }
    }

    pub fn is_anomaly(&self) -> bool {
        self.kind == MisstatementKind::Anomaly
    }
}

/// What a completed sample turned up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleResults {
    pub sample_size: u64,
    pub sample_value: Decimal,
    #[serde(default)]
    pub misstatements_found: Vec<Misstatement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectionConclusion {
    Acceptable,
    FurtherProceduresRequired,
    MaterialMisstatement,
}

/// Sample misstatements projected onto the population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedMisstatement {
    pub known_misstatements: Decimal,
    pub projected_misstatements: Decimal,
    pub total_likely_misstatement: Decimal,
    pub tolerable_misstatement: Decimal,
    pub projection_factor: Decimal,
    pub conclusion: ProjectionConclusion,
    pub recommendations: Vec<String>,
}
