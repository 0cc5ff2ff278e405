//! Thresholds, factors and tables behind every engine rule.
//!
//! Each number lives here exactly once as a named constant; the [`Ruleset`]
//! sections default to these constants and can be overridden from
//! configuration by callers that need firm-specific methodology.

use audit_types::{EngineError, EngineResult, RiskLevel};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

pub const RULESET_VERSION: &str = "audit-ruleset-v1";

// --- Materiality (ISA 320) ---

/// Percent of profit before tax.
pub const PBT_PERCENTAGE: Decimal = dec!(5);
/// Percent of revenue.
pub const REVENUE_PERCENTAGE: Decimal = dec!(0.5);
/// Percent of total assets.
pub const TOTAL_ASSETS_PERCENTAGE: Decimal = dec!(1);
/// Percent of equity.
pub const EQUITY_PERCENTAGE: Decimal = dec!(2);
pub const PERFORMANCE_FACTOR_LOW: Decimal = dec!(0.75);
pub const PERFORMANCE_FACTOR_MODERATE: Decimal = dec!(0.65);
pub const PERFORMANCE_FACTOR_SIGNIFICANT: Decimal = dec!(0.55);
pub const PERFORMANCE_FACTOR_HIGH: Decimal = dec!(0.50);
pub const TRIVIAL_THRESHOLD_FACTOR: Decimal = dec!(0.05);

// --- Risk assessment (ISA 240 / ISA 315) ---

/// Account labels carrying the presumed revenue-recognition fraud risk.
pub const REVENUE_RECOGNITION_PATTERNS: &[&str] = &["revenue"];

// --- Sampling (ISA 530) ---

pub const RISK_MULTIPLIER_LOW: Decimal = dec!(1.0);
pub const RISK_MULTIPLIER_MODERATE: Decimal = dec!(1.5);
pub const RISK_MULTIPLIER_SIGNIFICANT: Decimal = dec!(2.0);
pub const RISK_MULTIPLIER_HIGH: Decimal = dec!(2.3);
/// Cap on the expected/tolerable misstatement ratio.
pub const MAX_DAMPENING_FACTOR: Decimal = dec!(0.5);
pub const MINIMUM_SAMPLE_SIZE: u64 = 20;
/// Samples larger than this are designed statistically.
pub const STATISTICAL_SAMPLE_ABOVE: u64 = 50;
/// Samples larger than this use monetary-unit selection.
pub const MONETARY_UNIT_SAMPLE_ABOVE: u64 = 100;

// --- Misstatement projection ---

/// Below this share of tolerable misstatement the population is acceptable.
pub const ACCEPTABLE_BELOW_RATIO: Decimal = dec!(0.5);

// --- Population analytics ---

/// Expected leading-digit frequency (percent) for digits 1 through 9.
pub const BENFORD_EXPECTED_PCT: [f64; 9] = [30.1, 17.6, 12.5, 9.7, 7.9, 6.7, 5.8, 5.1, 4.6];
/// Percentage points of deviation that flag a digit.
pub const BENFORD_DEVIATION_THRESHOLD: f64 = 5.0;
/// Below this many values a Benford test has little power.
pub const BENFORD_MIN_RELIABLE_POPULATION: u64 = 100;
pub const OUTLIER_SIGMA: f64 = 3.0;
pub const OUTLIER_MIN_POPULATION: usize = 3;

// --- Tests of controls ---

/// Exception rate (percent) below which a control operates effectively.
pub const CONTROL_EFFECTIVE_BELOW_PCT: Decimal = dec!(5);
/// Exception rate (percent) above which a deficiency is significant.
pub const SIGNIFICANT_DEFICIENCY_ABOVE_PCT: Decimal = dec!(10);

// --- Group audits (ISA 600) ---

/// Share of group revenue or assets above which a component is significant by size.
pub const SIGNIFICANT_COMPONENT_ABOVE_PCT: Decimal = dec!(15);
/// Share above which a non-significant component still gets specified procedures.
pub const SPECIFIED_PROCEDURES_ABOVE_PCT: Decimal = dec!(5);
pub const SIGNIFICANT_COMPONENT_ALLOCATION: Decimal = dec!(0.9);
pub const OTHER_COMPONENT_ALLOCATION: Decimal = dec!(0.75);
pub const COMPONENT_PERFORMANCE_FACTOR: Decimal = dec!(0.75);

/// One value per risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskLevelTable {
    pub low: Decimal,
    pub moderate: Decimal,
    pub significant: Decimal,
    pub high: Decimal,
}

impl RiskLevelTable {
    pub fn get(&self, level: RiskLevel) -> Decimal {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Moderate => self.moderate,
            RiskLevel::Significant => self.significant,
            RiskLevel::High => self.high,
        }
    }

    fn values(&self) -> [Decimal; 4] {
        [self.low, self.moderate, self.significant, self.high]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialityRules {
    pub profit_before_tax_pct: Decimal,
    pub revenue_pct: Decimal,
    pub total_assets_pct: Decimal,
    pub equity_pct: Decimal,
    pub performance_factors: RiskLevelTable,
    pub trivial_factor: Decimal,
}

impl Default for MaterialityRules {
    fn default() -> Self {
        Self {
            profit_before_tax_pct: PBT_PERCENTAGE,
            revenue_pct: REVENUE_PERCENTAGE,
            total_assets_pct: TOTAL_ASSETS_PERCENTAGE,
            equity_pct: EQUITY_PERCENTAGE,
            performance_factors: RiskLevelTable {
                low: PERFORMANCE_FACTOR_LOW,
                moderate: PERFORMANCE_FACTOR_MODERATE,
                significant: PERFORMANCE_FACTOR_SIGNIFICANT,
                high: PERFORMANCE_FACTOR_HIGH,
            },
            trivial_factor: TRIVIAL_THRESHOLD_FACTOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskRules {
    pub revenue_recognition_patterns: Vec<String>,
}

impl Default for RiskRules {
    fn default() -> Self {
        Self {
            revenue_recognition_patterns: REVENUE_RECOGNITION_PATTERNS
                .iter()
                .map(|pattern| pattern.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingRules {
    pub risk_multipliers: RiskLevelTable,
    pub max_dampening_factor: Decimal,
    pub minimum_sample_size: u64,
    pub statistical_above: u64,
    pub monetary_unit_above: u64,
}

impl Default for SamplingRules {
    fn default() -> Self {
        Self {
            risk_multipliers: RiskLevelTable {
                low: RISK_MULTIPLIER_LOW,
                moderate: RISK_MULTIPLIER_MODERATE,
                significant: RISK_MULTIPLIER_SIGNIFICANT,
                high: RISK_MULTIPLIER_HIGH,
            },
            max_dampening_factor: MAX_DAMPENING_FACTOR,
            minimum_sample_size: MINIMUM_SAMPLE_SIZE,
            statistical_above: STATISTICAL_SAMPLE_ABOVE,
            monetary_unit_above: MONETARY_UNIT_SAMPLE_ABOVE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionRules {
    pub acceptable_below_ratio: Decimal,
}

impl Default for ProjectionRules {
    fn default() -> Self {
        Self {
            acceptable_below_ratio: ACCEPTABLE_BELOW_RATIO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsRules {
    pub benford_expected_pct: [f64; 9],
    pub benford_deviation_threshold: f64,
    pub benford_min_reliable_population: u64,
    pub outlier_sigma: f64,
    pub outlier_min_population: usize,
}

impl Default for AnalyticsRules {
    fn default() -> Self {
        Self {
            benford_expected_pct: BENFORD_EXPECTED_PCT,
            benford_deviation_threshold: BENFORD_DEVIATION_THRESHOLD,
            benford_min_reliable_population: BENFORD_MIN_RELIABLE_POPULATION,
            outlier_sigma: OUTLIER_SIGMA,
            outlier_min_population: OUTLIER_MIN_POPULATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlRules {
    pub effective_below_pct: Decimal,
    pub significant_deficiency_above_pct: Decimal,
}

impl Default for ControlRules {
    fn default() -> Self {
        Self {
            effective_below_pct: CONTROL_EFFECTIVE_BELOW_PCT,
            significant_deficiency_above_pct: SIGNIFICANT_DEFICIENCY_ABOVE_PCT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupRules {
    pub significant_above_pct: Decimal,
    pub specified_procedures_above_pct: Decimal,
    pub significant_allocation: Decimal,
    pub other_allocation: Decimal,
    pub performance_factor: Decimal,
}

impl Default for GroupRules {
    fn default() -> Self {
        Self {
            significant_above_pct: SIGNIFICANT_COMPONENT_ABOVE_PCT,
            specified_procedures_above_pct: SPECIFIED_PROCEDURES_ABOVE_PCT,
            significant_allocation: SIGNIFICANT_COMPONENT_ALLOCATION,
            other_allocation: OTHER_COMPONENT_ALLOCATION,
            performance_factor: COMPONENT_PERFORMANCE_FACTOR,
        }
    }
}

/// Complete rule configuration for an [`crate::AuditEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ruleset {
    pub version: String,
    pub materiality: MaterialityRules,
    pub risk: RiskRules,
    pub sampling: SamplingRules,
    pub projection: ProjectionRules,
    pub analytics: AnalyticsRules,
    pub controls: ControlRules,
    pub group: GroupRules,
}

impl Default for Ruleset {
    fn default() -> Self {
        Self {
            version: RULESET_VERSION.to_string(),
            materiality: MaterialityRules::default(),
            risk: RiskRules::default(),
            sampling: SamplingRules::default(),
            projection: ProjectionRules::default(),
            analytics: AnalyticsRules::default(),
            controls: ControlRules::default(),
            group: GroupRules::default(),
        }
    }
}

impl Ruleset {
    /// Reject overrides that would break the engine's invariants.
    pub fn validate(&self) -> EngineResult<()> {
        let m = &self.materiality;
        for (name, pct) in [
            ("materiality.profit_before_tax_pct", m.profit_before_tax_pct),
            ("materiality.revenue_pct", m.revenue_pct),
            ("materiality.total_assets_pct", m.total_assets_pct),
            ("materiality.equity_pct", m.equity_pct),
        ] {
            if pct <= Decimal::ZERO || pct > dec!(100) {
                return Err(EngineError::invalid(format!(
                    "{name} must be within (0, 100], got {pct}"
                )));
            }
        }
        if m
            .performance_factors
            .values()
            .iter()
            .any(|factor| *factor <= Decimal::ZERO || *factor > Decimal::ONE)
        {
            return Err(EngineError::invalid(
                "materiality.performance_factors must be within (0, 1]",
            ));
        }
        if m.trivial_factor < Decimal::ZERO || m.trivial_factor > Decimal::ONE {
            return Err(EngineError::invalid(
                "materiality.trivial_factor must be within [0, 1]",
            ));
        }

        let s = &self.sampling;
        let multipliers = s.risk_multipliers.values();
        if multipliers.iter().any(|value| *value <= Decimal::ZERO)
            || multipliers.windows(2).any(|pair| pair[0] > pair[1])
        {
            return Err(EngineError::invalid(
                "sampling.risk_multipliers must be positive and non-decreasing with risk",
            ));
        }
        if s.max_dampening_factor < Decimal::ZERO || s.max_dampening_factor >= Decimal::ONE {
            return Err(EngineError::invalid(
                "sampling.max_dampening_factor must be within [0, 1)",
            ));
        }
        if s.minimum_sample_size == 0 {
            return Err(EngineError::invalid(
                "sampling.minimum_sample_size must be positive",
            ));
        }

        let p = &self.projection;
        if p.acceptable_below_ratio <= Decimal::ZERO || p.acceptable_below_ratio > Decimal::ONE {
            return Err(EngineError::invalid(
                "projection.acceptable_below_ratio must be within (0, 1]",
            ));
        }

        let a = &self.analytics;
        if !(a.benford_deviation_threshold > 0.0) || !(a.outlier_sigma > 0.0) {
            return Err(EngineError::invalid(
                "analytics thresholds must be positive",
            ));
        }
        if a.outlier_min_population < OUTLIER_MIN_POPULATION {
            return Err(EngineError::invalid(format!(
                "analytics.outlier_min_population must be at least {OUTLIER_MIN_POPULATION}"
            )));
        }

        let c = &self.controls;
        if c.effective_below_pct > c.significant_deficiency_above_pct {
            return Err(EngineError::invalid(
                "controls.effective_below_pct must not exceed significant_deficiency_above_pct",
            ));
        }

        let g = &self.group;
        if g.specified_procedures_above_pct > g.significant_above_pct {
            return Err(EngineError::invalid(
                "group.specified_procedures_above_pct must not exceed significant_above_pct",
            ));
        }
        for (name, factor) in [
            ("group.significant_allocation", g.significant_allocation),
            ("group.other_allocation", g.other_allocation),
            ("group.performance_factor", g.performance_factor),
        ] {
            if factor <= Decimal::ZERO || factor > Decimal::ONE {
                return Err(EngineError::invalid(format!(
                    "{name} must be within (0, 1], got {factor}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ruleset_is_valid() {
        let rules = Ruleset::default();
        assert!(rules.validate().is_ok());
        assert_eq!(rules.version, RULESET_VERSION);
    }

    #[test]
    fn benford_table_sums_to_roughly_one_hundred() {
        let total: f64 = BENFORD_EXPECTED_PCT.iter().sum();
        assert!((total - 100.0).abs() < 0.1, "total was {total}");
    }

    #[test]
    fn tables_resolve_by_level() {
        let rules = Ruleset::default();
        assert_eq!(
            rules.materiality.performance_factors.get(RiskLevel::Moderate),
            dec!(0.65)
        );
        assert_eq!(rules.sampling.risk_multipliers.get(RiskLevel::High), dec!(2.3));
    }

    #[test]
    fn decreasing_multipliers_are_rejected() {
        let mut rules = Ruleset::default();
        rules.sampling.risk_multipliers.high = dec!(0.9);
        let err = rules.validate().unwrap_err();
        assert!(err.to_string().contains("risk_multipliers"));
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let rules: Ruleset = serde_json::from_value(serde_json::json!({
            "group": { "significant_above_pct": 20 }
        }))
        .unwrap();
        assert_eq!(rules.group.significant_above_pct, dec!(20));
        assert_eq!(rules.group.other_allocation, OTHER_COMPONENT_ALLOCATION);
        assert_eq!(rules.materiality, MaterialityRules::default());
    }
}
