//! Misstatement projector.
//!
//! Anomalies are counted at face value; representative misstatements are
//! scaled by `population value / sample value`. The conclusion is taken on the
//! unrounded total so that rounding never moves a result across a band.

use crate::ruleset::ProjectionRules;
use crate::{checked, round_whole};
use audit_types::{
    EngineError, EngineResult, ProjectedMisstatement, ProjectionConclusion, SampleResults,
};
use rust_decimal::Decimal;
use tracing::{debug, warn};

const PROJECTION_FACTOR_DP: u32 = 4;

fn reject(reason: &'static str) -> EngineError {
    warn!(reason, "projection parameters rejected");
    EngineError::invalid(reason)
}

/// Fixed recommendations for each conclusion band.
pub fn recommendations(conclusion: ProjectionConclusion) -> Vec<String> {
    let lines: &[&str] = match conclusion {
        ProjectionConclusion::Acceptable => {
            &["Sample results support conclusion that population is not materially misstated"]
        }
        ProjectionConclusion::FurtherProceduresRequired => &[
            "Total likely misstatement approaching tolerable misstatement",
            "Consider expanding sample size or performing additional procedures",
            "Request management correction of identified misstatements",
        ],
        ProjectionConclusion::MaterialMisstatement => &[
            "Total likely misstatement exceeds tolerable misstatement",
            "Discuss with engagement partner regarding potential audit opinion impact",
            "Request management to investigate and correct errors",
            "Consider expanding testing to other areas",
        ],
    };
    lines.iter().map(|line| line.to_string()).collect()
}

/// Project sample misstatements onto the population and band the result.
pub fn project_misstatement(
    rules: &ProjectionRules,
    results: &SampleResults,
    population_value: Decimal,
    tolerable_misstatement: Decimal,
) -> EngineResult<ProjectedMisstatement> {
    if results.sample_size == 0 {
        return Err(reject("sample size must be positive"));
    }
    if results.sample_value <= Decimal::ZERO {
        return Err(reject("sample value must be positive"));
    }
    if population_value < results.sample_value {
        return Err(reject("population value must not be less than sample value"));
    }
    if tolerable_misstatement <= Decimal::ZERO {
        return Err(reject("tolerable misstatement must be positive"));
    }
    if results
        .misstatements_found
        .iter()
        .any(|found| found.amount < Decimal::ZERO)
    {
        return Err(reject("misstatement amounts must not be negative"));
    }

    let factor = checked(
        population_value.checked_div(results.sample_value),
        "projection factor",
    )?;

    let (anomalies, representative): (Vec<_>, Vec<_>) = results
        .misstatements_found
        .iter()
        .partition(|found| found.is_anomaly());
    let known = checked(
        anomalies
            .iter()
            .try_fold(Decimal::ZERO, |sum, found| sum.checked_add(found.amount)),
        "known misstatements",
    )?;
    let representative_sum = checked(
        representative
            .iter()
            .try_fold(Decimal::ZERO, |sum, found| sum.checked_add(found.amount)),
        "representative misstatements",
    )?;
    let projected = checked(representative_sum.checked_mul(factor), "projected misstatements")?;
    let total = checked(known.checked_add(projected), "total likely misstatement")?;

    let conclusion = if total < tolerable_misstatement * rules.acceptable_below_ratio {
        ProjectionConclusion::Acceptable
    } else if total < tolerable_misstatement {
        ProjectionConclusion::FurtherProceduresRequired
    } else {
        ProjectionConclusion::MaterialMisstatement
    };

    let known = round_whole(known);
    let projected = round_whole(projected);

    debug!(
        known = %known,
        projected = %projected,
        total = %total,
        tolerable = %tolerable_misstatement,
        conclusion = ?conclusion,
        "misstatement projected"
    );

    Ok(ProjectedMisstatement {
        known_misstatements: known,
        projected_misstatements: projected,
        total_likely_misstatement: known + projected,
        tolerable_misstatement,
        projection_factor: factor.round_dp(PROJECTION_FACTOR_DP).normalize(),
        conclusion,
        recommendations: recommendations(conclusion),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit_types::Misstatement;
    use rust_decimal_macros::dec;

    fn results(found: Vec<Misstatement>) -> SampleResults {
        SampleResults {
            sample_size: 60,
            sample_value: dec!(10000),
            misstatements_found: found,
        }
    }

    fn project(found: Vec<Misstatement>, tolerable: Decimal) -> EngineResult<ProjectedMisstatement> {
        project_misstatement(&ProjectionRules::default(), &results(found), dec!(100000), tolerable)
    }

    #[test]
    fn anomalies_are_not_projected() {
        let result = project(
            vec![
                Misstatement::anomaly(dec!(1000)),
                Misstatement::representative(dec!(200)),
            ],
            dec!(10000),
        )
        .unwrap();

        assert_eq!(result.projection_factor, dec!(10));
        assert_eq!(result.known_misstatements, dec!(1000));
        assert_eq!(result.projected_misstatements, dec!(2000));
        assert_eq!(result.total_likely_misstatement, dec!(3000));
        assert_eq!(result.conclusion, ProjectionConclusion::Acceptable);
        assert_eq!(result.recommendations.len(), 1);
    }

    #[test]
    fn bands_follow_share_of_tolerable() {
        let found = || vec![Misstatement::representative(dec!(500))];
        // total likely misstatement is 5,000 in every case
        assert_eq!(
            project(found(), dec!(10001)).unwrap().conclusion,
            ProjectionConclusion::Acceptable
        );
        assert_eq!(
            project(found(), dec!(10000)).unwrap().conclusion,
            ProjectionConclusion::FurtherProceduresRequired
        );
        assert_eq!(
            project(found(), dec!(5001)).unwrap().conclusion,
            ProjectionConclusion::FurtherProceduresRequired
        );
        let material = project(found(), dec!(5000)).unwrap();
        assert_eq!(material.conclusion, ProjectionConclusion::MaterialMisstatement);
        assert_eq!(material.recommendations.len(), 4);
    }

    #[test]
    fn clean_sample_is_acceptable() {
        let result = project(Vec::new(), dec!(1000)).unwrap();
        assert_eq!(result.total_likely_misstatement, Decimal::ZERO);
        assert_eq!(result.conclusion, ProjectionConclusion::Acceptable);
    }

    #[test]
    fn zero_value_sample_is_rejected() {
        let mut sample = results(Vec::new());
        sample.sample_value = Decimal::ZERO;
        let err = project_misstatement(&ProjectionRules::default(), &sample, dec!(100000), dec!(1000))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter(_)));
    }

    #[test]
    fn other_bad_inputs_are_rejected() {
        assert!(project(vec![Misstatement::anomaly(dec!(-5))], dec!(1000)).is_err());
        assert!(project(Vec::new(), Decimal::ZERO).is_err());

        let sample = results(Vec::new());
        assert!(
            project_misstatement(&ProjectionRules::default(), &sample, dec!(9999), dec!(1000))
                .is_err()
        );
        let empty = SampleResults {
            sample_size: 0,
            ..sample
        };
        assert!(
            project_misstatement(&ProjectionRules::default(), &empty, dec!(100000), dec!(1000))
                .is_err()
        );
    }

    #[test]
    fn total_is_sum_of_rounded_parts() {
        // factor 3 so 0.5 representative -> 1.5 projected -> 2 after rounding
        let sample = SampleResults {
            sample_size: 30,
            sample_value: dec!(30000),
            misstatements_found: vec![
                Misstatement::anomaly(dec!(10.4)),
                Misstatement::representative(dec!(0.5)),
            ],
        };
        let result =
            project_misstatement(&ProjectionRules::default(), &sample, dec!(90000), dec!(1000))
                .unwrap();
        assert_eq!(result.known_misstatements, dec!(10));
        assert_eq!(result.projected_misstatements, dec!(2));
        assert_eq!(result.total_likely_misstatement, dec!(12));
    }
}
