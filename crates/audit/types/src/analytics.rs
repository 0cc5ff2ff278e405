//! Population analytics results

use serde::{Deserialize, Serialize};

/// Numeric population handed to the analytics tasks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationFigures {
    #[serde(default)]
    pub figures: Vec<f64>,
}

impl PopulationFigures {
    pub fn new(figures: impl Into<Vec<f64>>) -> Self {
        Self {
            figures: figures.into(),
        }
    }
}

/// Observed versus expected frequency for one leading digit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenfordDigitRow {
    pub digit: u8,
    pub observed: u64,
    /// Percentage points, 0..=100.
    pub observed_pct: f64,
    pub expected_pct: f64,
    /// `observed_pct - expected_pct`.
    pub deviation: f64,
    pub anomalous: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenfordAnalysis {
    /// Values with a leading significant digit.
    pub values_considered: u64,
    /// Zero values, which have no leading digit.
    pub values_skipped: u64,
    pub deviation_threshold: f64,
    pub rows: Vec<BenfordDigitRow>,
    pub anomalous_digits: Vec<u8>,
    pub dataset_hash: String,
    pub conclusion: String,
}

impl BenfordAnalysis {
    pub fn has_anomalies(&self) -> bool {
        !self.anomalous_digits.is_empty()
    }
}

/// A value lying beyond the sigma threshold of the rest of the population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlierItem {
    pub index: usize,
    pub value: f64,
    /// Mean of the population without this value.
    pub reference_mean: f64,
    /// Sample standard deviation (n − 1 divisor) of the population without
    /// this value.
    pub reference_std_dev: f64,
    /// Cutoff applied to this value: `sigma_multiplier × reference_std_dev`.
    pub threshold: f64,
    /// Distance from `reference_mean`; always above `threshold`.
    pub deviation: f64,
    /// `None` when the remaining values have no spread at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlierAnalysis {
    pub count: u64,
    pub mean: f64,
    /// Population standard deviation of every value.
    pub standard_deviation: f64,
    pub sigma_multiplier: f64,
    /// `sigma_multiplier × standard_deviation`. Descriptive only: each value
    /// is judged against its own [`OutlierItem::threshold`].
    pub population_threshold: f64,
    pub outliers: Vec<OutlierItem>,
    pub dataset_hash: String,
    pub conclusion: String,
}

impl OutlierAnalysis {
    pub fn flagged_values(&self) -> Vec<f64> {
        self.outliers.iter().map(|item| item.value).collect()
    }
}

/// Either analytics flavour, tagged by `kind` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AnalyticsResult {
    Benford(BenfordAnalysis),
    Outliers(OutlierAnalysis),
}

impl AnalyticsResult {
    pub fn conclusion(&self) -> &str {
        match self {
            AnalyticsResult::Benford(analysis) => &analysis.conclusion,
            AnalyticsResult::Outliers(analysis) => &analysis.conclusion,
        }
    }
}

impl From<BenfordAnalysis> for AnalyticsResult {
    fn from(analysis: BenfordAnalysis) -> Self {
        AnalyticsResult::Benford(analysis)
    }
}

impl From<OutlierAnalysis> for AnalyticsResult {
    fn from(analysis: OutlierAnalysis) -> Self {
        AnalyticsResult::Outliers(analysis)
    }
}
