//! Group component classifier and materiality allocator (ISA 600).
//!
//! Classification here is by size only. Risk-significance of an account is
//! the risk assessor's concern and is never inferred from a component's size.

use crate::ruleset::GroupRules;
use crate::{checked, round_whole};
use audit_types::{
    ComponentFigures, EngineError, EngineResult, GroupComponent, SizeClassification, WorkEffort,
};
use rust_decimal::Decimal;
use tracing::{debug, warn};

const REPORTED_PCT_DP: u32 = 2;

struct Shares {
    revenue: Option<Decimal>,
    assets: Option<Decimal>,
}

impl Shares {
    fn largest(&self) -> Decimal {
        self.revenue
            .into_iter()
            .chain(self.assets)
            .max()
            .unwrap_or(Decimal::ZERO)
    }
}

fn share(label: &str, component: Option<Decimal>, group: Option<Decimal>) -> EngineResult<Option<Decimal>> {
    let (Some(component), Some(group)) = (component, group) else {
        return Ok(None);
    };
    if group <= Decimal::ZERO {
        return Err(EngineError::invalid(format!("group {label} must be positive")));
    }
    if component < Decimal::ZERO {
        return Err(EngineError::invalid(format!(
            "component {label} must not be negative"
        )));
    }
    if component > group {
        return Err(EngineError::invalid(format!(
            "component {label} exceeds group {label}"
        )));
    }
    let pct = checked(
        component
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|value| value.checked_div(group)),
        label,
    )?;
    Ok(Some(pct))
}

fn shares(figures: &ComponentFigures) -> EngineResult<Shares> {
    let shares = Shares {
        revenue: share("revenue", figures.component_revenue, figures.group_revenue)?,
        assets: share("assets", figures.component_assets, figures.group_assets)?,
    };
    if shares.revenue.is_none() && shares.assets.is_none() {
        warn!(component = %figures.component, "no complete revenue or asset pair for component");
        return Err(EngineError::missing(
            "component and group revenue or component and group assets required",
        ));
    }
    Ok(shares)
}

impl GroupRules {
    fn classify(&self, pct: Decimal) -> (SizeClassification, WorkEffort) {
        if pct > self.significant_above_pct {
            (SizeClassification::SignificantSize, WorkEffort::FullAudit)
        } else if pct > self.specified_procedures_above_pct {
            (SizeClassification::NonSignificant, WorkEffort::SpecifiedProcedures)
        } else {
            (SizeClassification::NonSignificant, WorkEffort::AnalyticalOnly)
        }
    }
}

fn build(rules: &GroupRules, figures: &ComponentFigures, shares: &Shares) -> GroupComponent {
    let pct = shares.largest();
    let (classification, work_effort) = rules.classify(pct);
    let report = |value: Decimal| value.round_dp(REPORTED_PCT_DP).normalize();
    GroupComponent {
        component: figures.component.clone(),
        revenue_pct: shares.revenue.map(report),
        asset_pct: shares.assets.map(report),
        component_pct: report(pct),
        classification,
        work_effort,
        component_materiality: None,
        performance_materiality: None,
    }
}

/// Classify a component by its share of group revenue or assets.
pub fn classify_component(rules: &GroupRules, figures: &ComponentFigures) -> EngineResult<GroupComponent> {
    let shares = shares(figures)?;
    let component = build(rules, figures, &shares);
    debug!(
        component = %component.component,
        pct = %component.component_pct,
        classification = ?component.classification,
        "component classified"
    );
    Ok(component)
}

/// Classify a component and allocate it a share of group materiality.
///
/// Allocation scales with the unrounded component share; the significant-size
/// factor applies only to components classified as significant by size.
pub fn allocate_materiality(
    rules: &GroupRules,
    figures: &ComponentFigures,
    group_materiality: Decimal,
) -> EngineResult<GroupComponent> {
    if group_materiality <= Decimal::ZERO {
        warn!(%group_materiality, "group materiality rejected");
        return Err(EngineError::invalid("group materiality must be positive"));
    }
    let shares = shares(figures)?;
    let mut component = build(rules, figures, &shares);

    let allocation = if component.classification.is_significant_size() {
        rules.significant_allocation
    } else {
        rules.other_allocation
    };
    let materiality = checked(
        group_materiality
            .checked_mul(shares.largest())
            .and_then(|value| value.checked_div(Decimal::ONE_HUNDRED))
            .and_then(|value| value.checked_mul(allocation)),
        "component materiality",
    )?;
    let performance = checked(
        materiality.checked_mul(rules.performance_factor),
        "component performance materiality",
    )?;

    component.component_materiality = Some(round_whole(materiality));
    component.performance_materiality = Some(round_whole(performance));

    debug!(
        component = %component.component,
        materiality = %round_whole(materiality),
        "component materiality allocated"
    );
    Ok(component)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn classify(figures: ComponentFigures) -> EngineResult<GroupComponent> {
        classify_component(&GroupRules::default(), &figures)
    }

    #[test]
    fn fifteen_percent_exactly_is_not_significant() {
        let result = classify(ComponentFigures::new("Sub A").with_revenue(dec!(150), dec!(1000))).unwrap();
        assert_eq!(result.component_pct, dec!(15));
        assert_eq!(result.classification, SizeClassification::NonSignificant);
        assert_eq!(result.work_effort, WorkEffort::SpecifiedProcedures);
    }

    #[test]
    fn just_over_fifteen_percent_is_significant() {
        let result =
            classify(ComponentFigures::new("Sub B").with_revenue(dec!(1501), dec!(10000))).unwrap();
        assert_eq!(result.component_pct, dec!(15.01));
        assert_eq!(result.classification, SizeClassification::SignificantSize);
        assert_eq!(result.work_effort, WorkEffort::FullAudit);
    }

    #[test]
    fn larger_share_wins() {
        let result = classify(
            ComponentFigures::new("Sub C")
                .with_revenue(dec!(30), dec!(1000))
                .with_assets(dec!(200), dec!(1000)),
        )
        .unwrap();
        assert_eq!(result.revenue_pct, Some(dec!(3)));
        assert_eq!(result.asset_pct, Some(dec!(20)));
        assert!(result.classification.is_significant_size());
    }

    #[test]
    fn small_component_gets_analytics_only() {
        let result = classify(ComponentFigures::new("Sub D").with_assets(dec!(50), dec!(1000))).unwrap();
        assert_eq!(result.work_effort, WorkEffort::AnalyticalOnly);
        assert!(result.revenue_pct.is_none());
    }

    #[test]
    fn figures_are_validated() {
        let missing = classify(ComponentFigures::new("Sub E")).unwrap_err();
        assert!(matches!(missing, EngineError::MissingInput(_)));

        for figures in [
            ComponentFigures::new("x").with_revenue(dec!(10), Decimal::ZERO),
            ComponentFigures::new("x").with_revenue(dec!(-1), dec!(100)),
            ComponentFigures::new("x").with_assets(dec!(101), dec!(100)),
        ] {
            assert!(matches!(classify(figures), Err(EngineError::InvalidParameter(_))));
        }
    }

    #[test]
    fn allocation_for_significant_component() {
        let figures = ComponentFigures::new("Sub F").with_revenue(dec!(400), dec!(1000));
        let result = allocate_materiality(&GroupRules::default(), &figures, dec!(100000)).unwrap();
        // 100,000 × 40% × 0.9
        assert_eq!(result.component_materiality, Some(dec!(36000)));
        assert_eq!(result.performance_materiality, Some(dec!(27000)));
    }

    #[test]
    fn allocation_for_other_component() {
        let figures = ComponentFigures::new("Sub G").with_assets(dec!(100), dec!(1000));
        let result = allocate_materiality(&GroupRules::default(), &figures, dec!(100000)).unwrap();
        // 100,000 × 10% × 0.75 = 7,500; × 0.75 = 5,625
        assert_eq!(result.component_materiality, Some(dec!(7500)));
        assert_eq!(result.performance_materiality, Some(dec!(5625)));
    }

    #[test]
    fn allocation_needs_positive_group_materiality() {
        let figures = ComponentFigures::new("Sub H").with_assets(dec!(100), dec!(1000));
        let err = allocate_materiality(&GroupRules::default(), &figures, Decimal::ZERO).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter(_)));
    }
}
