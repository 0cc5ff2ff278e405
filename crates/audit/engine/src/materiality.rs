//! Materiality calculator (ISA 320).
//!
//! Picks a benchmark in fixed priority order and derives overall, performance
//! and trivial thresholds from it. Each threshold is rounded on its own from
//! the unrounded overall figure.

use crate::ruleset::MaterialityRules;
use crate::{checked, round_whole};
use audit_types::{
    EngineError, EngineResult, FinancialData, MaterialityBasis, MaterialityCalculation, RiskLevel,
};
use rust_decimal::Decimal;
use tracing::{debug, warn};

impl MaterialityRules {
    /// Percentage applied to a benchmark.
    pub fn percentage(&self, basis: MaterialityBasis) -> Decimal {
        match basis {
            MaterialityBasis::ProfitBeforeTax => self.profit_before_tax_pct,
            MaterialityBasis::Revenue => self.revenue_pct,
            MaterialityBasis::TotalAssets => self.total_assets_pct,
            MaterialityBasis::Equity => self.equity_pct,
        }
    }
}

/// First positive figure in benchmark priority order.
pub fn select_benchmark(data: &FinancialData) -> Option<(MaterialityBasis, Decimal)> {
    MaterialityBasis::PRIORITY.iter().find_map(|basis| {
        data.figure(*basis)
            .filter(|value| *value > Decimal::ZERO)
            .map(|value| (*basis, value))
    })
}

/// Compute overall, performance and trivial materiality.
///
/// `data` is `None` when the caller supplied no financial figures at all,
/// which is reported differently from figures that contain no usable
/// benchmark.
pub fn calculate_materiality(
    rules: &MaterialityRules,
    data: Option<&FinancialData>,
    risk_level: RiskLevel,
) -> EngineResult<MaterialityCalculation> {
    let data = data.ok_or_else(|| {
        warn!("materiality requested without financial data");
        EngineError::missing("financial data required for materiality calculation")
    })?;

    let (basis, benchmark) = select_benchmark(data).ok_or_else(|| {
        warn!("no positive materiality benchmark available");
        EngineError::InsufficientData(
            "no positive profit before tax, revenue, total assets or equity".to_string(),
        )
    })?;

    let percentage = rules.percentage(basis);
    let factor = rules.performance_factors.get(risk_level);

    let overall = checked(
        benchmark.checked_mul(percentage).and_then(|v| v.checked_div(Decimal::ONE_HUNDRED)),
        "overall materiality",
    )?;
    let performance = checked(overall.checked_mul(factor), "performance materiality")?;
    let trivial = checked(
        overall.checked_mul(rules.trivial_factor),
        "trivial threshold",
    )?;

    let result = MaterialityCalculation {
        benchmark_value: benchmark,
        basis,
        percentage_applied: percentage,
        overall_materiality: round_whole(overall),
        performance_materiality: round_whole(performance),
        trivial_threshold: round_whole(trivial),
        performance_factor: factor,
        risk_level,
        rationale: format!(
            "Overall materiality calculated as {}% of {} ({}). Performance materiality set at {}% of overall materiality based on {} assessed risk.",
            percentage.normalize(),
            basis.label().to_lowercase(),
            benchmark.normalize(),
            (factor * Decimal::ONE_HUNDRED).normalize(),
            risk_level,
        ),
    };

    debug!(
        basis = %basis,
        benchmark = %benchmark,
        overall = %result.overall_materiality,
        performance = %result.performance_materiality,
        trivial = %result.trivial_threshold,
        "materiality calculated"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rules() -> MaterialityRules {
        MaterialityRules::default()
    }

    #[test]
    fn profit_before_tax_moderate_risk() {
        let data = FinancialData::default().with_profit_before_tax(dec!(1000000));
        let result = calculate_materiality(&rules(), Some(&data), RiskLevel::Moderate).unwrap();

        assert_eq!(result.basis, MaterialityBasis::ProfitBeforeTax);
        assert_eq!(result.overall_materiality, dec!(50000));
        assert_eq!(result.performance_materiality, dec!(32500));
        assert_eq!(result.trivial_threshold, dec!(2500));
        assert_eq!(
            result.rationale,
            "Overall materiality calculated as 5% of profit before tax (1000000). \
             Performance materiality set at 65% of overall materiality based on moderate assessed risk."
        );
    }

    #[test]
    fn loss_falls_back_to_revenue() {
        let data = FinancialData::default()
            .with_profit_before_tax(dec!(-250000))
            .with_revenue(dec!(8000000));
        let result = calculate_materiality(&rules(), Some(&data), RiskLevel::High).unwrap();

        assert_eq!(result.basis, MaterialityBasis::Revenue);
        assert_eq!(result.percentage_applied, dec!(0.5));
        assert_eq!(result.overall_materiality, dec!(40000));
        assert_eq!(result.performance_materiality, dec!(20000));
    }

    #[test]
    fn equity_is_last_resort() {
        let data = FinancialData::default().with_equity(dec!(300000));
        let result = calculate_materiality(&rules(), Some(&data), RiskLevel::Low).unwrap();
        assert_eq!(result.basis, MaterialityBasis::Equity);
        assert_eq!(result.overall_materiality, dec!(6000));
        assert_eq!(result.performance_materiality, dec!(4500));
        assert_eq!(result.trivial_threshold, dec!(300));
    }

    #[test]
    fn each_threshold_rounds_from_unrounded_overall() {
        // overall = 1234.5 -> 1235; performance = 1234.5 * 0.55 = 678.975 -> 679
        let data = FinancialData::default().with_profit_before_tax(dec!(24690));
        let result =
            calculate_materiality(&rules(), Some(&data), RiskLevel::Significant).unwrap();
        assert_eq!(result.overall_materiality, dec!(1235));
        assert_eq!(result.performance_materiality, dec!(679));
        assert_eq!(result.trivial_threshold, dec!(62));
    }

    #[test]
    fn missing_data_and_no_benchmark_are_distinct_errors() {
        let err = calculate_materiality(&rules(), None, RiskLevel::Moderate).unwrap_err();
        assert!(matches!(err, EngineError::MissingInput(_)));

        let zeros = FinancialData::default()
            .with_profit_before_tax(Decimal::ZERO)
            .with_total_assets(dec!(-1));
        let err = calculate_materiality(&rules(), Some(&zeros), RiskLevel::Moderate).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientData(_)));
    }

    #[test]
    fn gross_profit_is_never_a_benchmark() {
        let data = FinancialData {
            gross_profit: Some(dec!(500000)),
            ..FinancialData::default()
        };
        assert!(select_benchmark(&data).is_none());
    }
}
