//! Control effectiveness evaluator

use crate::ruleset::ControlRules;
use audit_types::{
    ControlDeficiency, ControlEffectivenessResult, ControlTest, DeficiencySeverity, EngineError,
    EngineResult,
};
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Convert a test of controls into an operating-effectiveness conclusion.
///
/// Boundaries compare against the exact rate; only the reported rate is
/// rounded to two decimals.
pub fn test_operating_effectiveness(
    rules: &ControlRules,
    test: &ControlTest,
) -> EngineResult<ControlEffectivenessResult> {
    let control = test.control.trim();
    if control.is_empty() {
        return Err(EngineError::missing("control name required for test of controls"));
    }
    if test.sample_size == 0 {
        return Err(EngineError::invalid("sample size must be positive"));
    }
    if test.exceptions > test.sample_size {
        return Err(EngineError::invalid(format!(
            "exceptions ({}) exceed sample size ({})",
            test.exceptions, test.sample_size
        )));
    }

    let rate = Decimal::from(test.exceptions) * Decimal::ONE_HUNDRED
        / Decimal::from(test.sample_size);
    let reported = rate.round_dp(2).normalize();
    let operating_effective = rate < rules.effective_below_pct;

    let deficiency = (!operating_effective).then(|| {
        let severity = if rate > rules.significant_deficiency_above_pct {
            DeficiencySeverity::SignificantDeficiency
        } else {
            DeficiencySeverity::Deficiency
        };
        let description = match severity {
            DeficiencySeverity::Deficiency => format!(
                "Exception rate of {reported}% is not below the {}% tolerable rate; control is not operating effectively",
                rules.effective_below_pct.normalize()
            ),
            DeficiencySeverity::SignificantDeficiency => format!(
                "Exception rate of {reported}% exceeds {}%; significant deficiency in the operation of the control",
                rules.significant_deficiency_above_pct.normalize()
            ),
        };
        warn!(control, rate = %reported, severity = ?severity, "control deficiency identified");
        ControlDeficiency {
            control: control.to_string(),
            severity,
            exception_rate: reported,
            description,
        }
    });

    debug!(
        control,
        sample_size = test.sample_size,
        exceptions = test.exceptions,
        effective = operating_effective,
        "control tested"
    );

    Ok(ControlEffectivenessResult {
        control: control.to_string(),
        sample_size: test.sample_size,
        exceptions: test.exceptions,
        exception_rate: reported,
        operating_effective,
        reliance_supported: operating_effective,
        deficiency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn evaluate(sample: u64, exceptions: u64) -> EngineResult<ControlEffectivenessResult> {
        test_operating_effectiveness(
            &ControlRules::default(),
            &ControlTest::new("Purchase approval", sample, exceptions),
        )
    }

    #[test]
    fn no_exceptions_supports_reliance() {
        let result = evaluate(25, 0).unwrap();
        assert!(result.operating_effective);
        assert!(result.reliance_supported);
        assert!(result.deficiency.is_none());
        assert_eq!(result.exception_rate, Decimal::ZERO);
    }

    #[test]
    fn exactly_five_percent_is_a_deficiency() {
        let result = evaluate(20, 1).unwrap();
        assert!(!result.operating_effective);
        let deficiency = result.deficiency.unwrap();
        assert_eq!(deficiency.severity, DeficiencySeverity::Deficiency);
        assert_eq!(deficiency.exception_rate, dec!(5));
    }

    #[test]
    fn exactly_ten_percent_is_not_significant() {
        let result = evaluate(40, 4).unwrap();
        assert_eq!(
            result.deficiency.map(|d| d.severity),
            Some(DeficiencySeverity::Deficiency)
        );
    }

    #[test]
    fn above_ten_percent_is_significant() {
        let result = evaluate(60, 7).unwrap();
        assert_eq!(result.exception_rate, dec!(11.67));
        assert_eq!(
            result.deficiency.map(|d| d.severity),
            Some(DeficiencySeverity::SignificantDeficiency)
        );
    }

    #[test]
    fn invalid_tests_are_rejected() {
        assert!(matches!(evaluate(0, 0), Err(EngineError::InvalidParameter(_))));
        assert!(matches!(evaluate(10, 11), Err(EngineError::InvalidParameter(_))));
        let unnamed = test_operating_effectiveness(&ControlRules::default(), &ControlTest::new(" ", 10, 0));
        assert!(matches!(unnamed, Err(EngineError::MissingInput(_))));
    }
}
