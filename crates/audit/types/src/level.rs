//! Ordinal risk scale and the qualitative ratings that feed it

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Risk rating on the ordinal scale `low < moderate < significant < high`.
///
/// Variant order drives `Ord`, so `max` of two levels is the worse one.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    #[default]
    Moderate,
    Significant,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Moderate,
        RiskLevel::Significant,
        RiskLevel::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::Significant => "significant",
            RiskLevel::High => "high",
        }
    }

    /// The worse of two levels.
    pub fn worst(self, other: RiskLevel) -> RiskLevel {
        self.max(other)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "moderate" | "medium" => Ok(RiskLevel::Moderate),
            "significant" => Ok(RiskLevel::Significant),
            "high" => Ok(RiskLevel::High),
            other => Err(format!("unknown risk level '{other}'")),
        }
    }
}

/// Three-point rating for qualitative inherent-risk factors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorRating {
    #[default]
    Low,
    Moderate,
    High,
}

/// Tone at the top.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneRating {
    Strong,
    #[default]
    Moderate,
    Weak,
}

/// Competence of finance and control personnel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompetenceRating {
    High,
    #[default]
    Moderate,
    Low,
}

/// Oversight by those charged with governance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OversightRating {
    Effective,
    #[default]
    Adequate,
    Inadequate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_scale() {
        assert!(RiskLevel::Low < RiskLevel::Moderate);
        assert!(RiskLevel::Moderate < RiskLevel::Significant);
        assert!(RiskLevel::Significant < RiskLevel::High);
        assert_eq!(RiskLevel::Low.worst(RiskLevel::High), RiskLevel::High);
        assert_eq!(
            RiskLevel::Significant.worst(RiskLevel::Moderate),
            RiskLevel::Significant
        );
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&RiskLevel::Significant).unwrap();
        assert_eq!(json, "\"significant\"");
        let level: RiskLevel = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(level, RiskLevel::High);
    }

    #[test]
    fn parse_accepts_medium_alias() {
        assert_eq!("Medium".parse::<RiskLevel>().unwrap(), RiskLevel::Moderate);
        assert!("severe".parse::<RiskLevel>().is_err());
    }
}
