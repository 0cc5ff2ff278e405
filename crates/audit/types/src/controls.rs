//! Tests of operating effectiveness for individual controls

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of testing one control over a sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlTest {
    #[serde(default)]
    pub control: String,
    #[serde(default)]
    pub sample_size: u64,
    #[serde(default)]
    pub exceptions: u64,
}

impl ControlTest {
    pub fn new(control: impl Into<String>, sample_size: u64, exceptions: u64) -> Self {
        Self {
            control: control.into(),
            sample_size,
            exceptions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeficiencySeverity {
    Deficiency,
    SignificantDeficiency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlDeficiency {
    pub control: String,
    pub severity: DeficiencySeverity,
    pub exception_rate: Decimal,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlEffectivenessResult {
    pub control: String,
    pub sample_size: u64,
    pub exceptions: u64,
    /// Percentage, rounded to two decimals.
    pub exception_rate: Decimal,
    pub operating_effective: bool,
    pub reliance_supported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deficiency: Option<ControlDeficiency>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_significant_above_plain() {
        assert!(DeficiencySeverity::SignificantDeficiency > DeficiencySeverity::Deficiency);
        assert_eq!(
            serde_json::to_string(&DeficiencySeverity::SignificantDeficiency).unwrap(),
            "\"significant-deficiency\""
        );
    }

    #[test]
    fn exceptions_default_to_zero() {
        let test: ControlTest =
            serde_json::from_str(r#"{"control":"Three-way match","sampleSize":25}"#).unwrap();
        assert_eq!(test, ControlTest::new("Three-way match", 25, 0));
    }
}
