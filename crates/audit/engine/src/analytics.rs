//! Population analytics: Benford leading-digit test and sigma outlier scan.
//!
//! Both analyses are single or double passes over the figures and carry a
//! blake3 hash of the population so a result can be tied to its input.

use crate::ruleset::AnalyticsRules;
use audit_types::{
    BenfordAnalysis, BenfordDigitRow, EngineError, EngineResult, OutlierAnalysis, OutlierItem,
};
use tracing::{debug, warn};

/// Hex blake3 digest over the little-endian bytes of every figure.
pub fn dataset_hash(figures: &[f64]) -> String {
    let mut hasher = blake3::Hasher::new();
    for value in figures {
        hasher.update(&value.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Leading significant digit of a finite, non-zero value.
pub fn leading_digit(value: f64) -> Option<u8> {
    if !value.is_finite() || value == 0.0 {
        return None;
    }
    // Scientific notation always starts with the leading significant digit.
    format!("{:e}", value.abs())
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .and_then(|digit| u8::try_from(digit).ok())
        .filter(|digit| *digit > 0)
}

fn ensure_finite(figures: &[f64]) -> EngineResult<()> {
    if let Some(index) = figures.iter().position(|value| !value.is_finite()) {
        warn!(index, "non-finite figure in population");
        return Err(EngineError::invalid(format!(
            "figure at index {index} is not a finite number"
        )));
    }
    Ok(())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compare the leading-digit distribution with Benford's Law.
pub fn benford_analysis(rules: &AnalyticsRules, figures: &[f64]) -> EngineResult<BenfordAnalysis> {
    if figures.is_empty() {
        return Err(EngineError::invalid("population is empty"));
    }
    ensure_finite(figures)?;

    let mut counts = [0u64; 9];
    let mut skipped = 0u64;
    for value in figures {
        match leading_digit(*value) {
            Some(digit) => counts[usize::from(digit - 1)] += 1,
            None => skipped += 1,
        }
    }
    let considered: u64 = counts.iter().sum();
    if considered == 0 {
        return Err(EngineError::invalid("population has no non-zero figures"));
    }

    let threshold = rules.benford_deviation_threshold;
    let rows: Vec<BenfordDigitRow> = counts
        .iter()
        .zip(rules.benford_expected_pct.iter())
        .enumerate()
        .map(|(i, (observed, expected))| {
            let observed_pct = *observed as f64 / considered as f64 * 100.0;
            let deviation = observed_pct - expected;
            BenfordDigitRow {
                digit: (i + 1) as u8,
                observed: *observed,
                observed_pct: round2(observed_pct),
                expected_pct: *expected,
                deviation: round2(deviation),
                anomalous: deviation.abs() > threshold,
            }
        })
        .collect();

    let anomalous_digits: Vec<u8> = rows
        .iter()
        .filter(|row| row.anomalous)
        .map(|row| row.digit)
        .collect();

    let conclusion = if anomalous_digits.is_empty() {
        "Leading-digit distribution is consistent with Benford's Law".to_string()
    } else {
        let digits: Vec<String> = anomalous_digits.iter().map(u8::to_string).collect();
        format!(
            "Leading-digit distribution deviates from Benford's Law for digit(s) {}; investigate for error or manipulation",
            digits.join(", ")
        )
    };

    debug!(
        considered,
        skipped,
        anomalies = anomalous_digits.len(),
        "benford analysis complete"
    );

    Ok(BenfordAnalysis {
        values_considered: considered,
        values_skipped: skipped,
        deviation_threshold: threshold,
        rows,
        anomalous_digits,
        dataset_hash: dataset_hash(figures),
        conclusion,
    })
}

/// Flag values lying more than `sigma` standard deviations from the rest.
///
/// Each value is judged against the mean and sample standard deviation of the
/// other values, so one extreme figure cannot inflate the spread that would
/// otherwise expose it. Every flagged item carries the cutoff applied to it.
/// The reported `mean`, `standard_deviation` and `population_threshold`
/// describe the whole population and play no part in flagging.
pub fn outlier_detection(rules: &AnalyticsRules, figures: &[f64]) -> EngineResult<OutlierAnalysis> {
    if figures.is_empty() {
        return Err(EngineError::invalid("population is empty"));
    }
    ensure_finite(figures)?;
    let min = rules.outlier_min_population;
    if figures.len() < min {
        return Err(EngineError::InsufficientData(format!(
            "outlier detection needs at least {min} values, got {}",
            figures.len()
        )));
    }

    let n = figures.len() as f64;
    let sum: f64 = figures.iter().sum();
    let mean = sum / n;
    let sum_sq: f64 = figures.iter().map(|x| (x - mean).powi(2)).sum();
    let standard_deviation = (sum_sq / n).sqrt();
    if ![sum, mean, sum_sq, standard_deviation]
        .iter()
        .all(|moment| moment.is_finite())
    {
        warn!(count = figures.len(), "population moments overflow");
        return Err(EngineError::invalid("population moments are out of range"));
    }

    let sigma = rules.outlier_sigma;
    let rest = n - 1.0;
    // Bessel-corrected divisor for the n − 1 remaining values.
    let dof = n - 2.0;
    // Below this the remaining values are treated as having no spread.
    let spread_floor = sum_sq * 1e-12;

    let outliers: Vec<OutlierItem> = figures
        .iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let reference_mean = (sum - value) / rest;
            let reference_sum_sq = (sum_sq - (value - mean).powi(2) * n / rest).max(0.0);
            let deviation = (value - reference_mean).abs();

            let (flagged, reference_std_dev, z_score) = if reference_sum_sq <= spread_floor {
                (deviation > 0.0 && sum_sq > 0.0, 0.0, None)
            } else {
                let sd = (reference_sum_sq / dof).sqrt();
                (deviation > sigma * sd, sd, Some(deviation / sd))
            };

            flagged.then(|| OutlierItem {
                index,
                value: *value,
                reference_mean,
                reference_std_dev,
                threshold: sigma * reference_std_dev,
                deviation,
                z_score,
            })
        })
        .collect();

    let conclusion = if outliers.is_empty() {
        format!("No values lie beyond {sigma} standard deviations of the remaining population")
    } else {
        format!(
            "{} value(s) lie beyond {sigma} standard deviations of the remaining population; investigate before relying on the population",
            outliers.len()
        )
    };

    debug!(
        count = figures.len(),
        mean,
        standard_deviation,
        flagged = outliers.len(),
        "outlier detection complete"
    );

    Ok(OutlierAnalysis {
        count: figures.len() as u64,
        mean,
        standard_deviation,
        sigma_multiplier: sigma,
        population_threshold: sigma * standard_deviation,
        outliers,
        dataset_hash: dataset_hash(figures),
        conclusion,
    })
}
