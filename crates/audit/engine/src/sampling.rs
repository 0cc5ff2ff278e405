//! Sample designer (ISA 530)

use crate::checked;
use crate::ruleset::SamplingRules;
use audit_types::{
    EngineError, EngineResult, SampleDesign, SamplingData, SamplingMethod, SelectionTechnique,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, warn};

fn validate(data: &SamplingData) -> EngineResult<Decimal> {
    let expected = data.expected_misstatement.unwrap_or(Decimal::ZERO);
    let problem = if data.tolerable_misstatement <= Decimal::ZERO {
        Some("tolerable misstatement must be positive")
    } else if expected < Decimal::ZERO {
        Some("expected misstatement must not be negative")
    } else if data.tolerable_misstatement <= expected {
        Some("tolerable misstatement must exceed expected misstatement")
    } else if data.population_size == 0 {
        Some("population size must be positive")
    } else if data.population_value < Decimal::ZERO {
        Some("population value must not be negative")
    } else {
        None
    };

    match problem {
        Some(reason) => {
            warn!(reason, "sampling parameters rejected");
            Err(EngineError::invalid(reason))
        }
        None => Ok(expected),
    }
}

/// Size a sample and choose its method and selection technique.
///
/// `ceil(value × multiplier / (tolerable × (1 − dampening)))`, clamped to the
/// minimum sample and the population size. Populations smaller than the
/// minimum are examined in full.
pub fn calculate_sample_size(rules: &SamplingRules, data: &SamplingData) -> EngineResult<SampleDesign> {
    let expected = validate(data)?;

    let multiplier = rules.risk_multipliers.get(data.assessed_risk);
    let dampening = if expected > Decimal::ZERO {
        (expected / data.tolerable_misstatement).min(rules.max_dampening_factor)
    } else {
        Decimal::ZERO
    };

    let numerator = checked(
        data.population_value.checked_mul(multiplier),
        "population value × risk multiplier",
    )?;
    let denominator = data.tolerable_misstatement * (Decimal::ONE - dampening);
    let raw = checked(numerator.checked_div(denominator), "sample size")?.ceil();
    let raw = raw.to_u64().unwrap_or(u64::MAX);

    let sample_size = raw
        .max(rules.minimum_sample_size)
        .min(data.population_size);
    let full_population = sample_size == data.population_size;

    let method = if sample_size > rules.statistical_above {
        SamplingMethod::Statistical
    } else {
        SamplingMethod::NonStatistical
    };
    let selection_technique = if sample_size > rules.monetary_unit_above {
        SelectionTechnique::MonetaryUnit
    } else {
        SelectionTechnique::Random
    };

    let mut rationale = format!(
        "Sample size of {sample_size} calculated based on: population value {}, tolerable misstatement {}, {} risk level",
        data.population_value.normalize(),
        data.tolerable_misstatement.normalize(),
        data.assessed_risk,
    );
    if expected > Decimal::ZERO {
        rationale.push_str(&format!(", expected misstatement {}", expected.normalize()));
    }
    rationale.push('.');
    if full_population {
        rationale.push_str(" Every item in the population is examined.");
    }

    debug!(
        raw,
        sample_size,
        population = data.population_size,
        risk = %data.assessed_risk,
        "sample designed"
    );

    Ok(SampleDesign {
        method,
        selection_technique,
        sample_size,
        population_size: data.population_size,
        risk_multiplier: multiplier,
        dampening_factor: dampening,
        full_population,
        rationale,
    })
}
