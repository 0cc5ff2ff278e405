//! Group-audit components
//!
//! "Significant" here means size-significance: a component's share of group
//! revenue or assets. It is unrelated to the risk-significance flag on a
//! [`crate::RiskAssessment`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Component and group figures used to size a component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComponentFigures {
    pub component: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_revenue: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_assets: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_revenue: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_assets: Option<Decimal>,
}

impl ComponentFigures {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            ..Self::default()
        }
    }

    pub fn with_revenue(mut self, component: Decimal, group: Decimal) -> Self {
        self.component_revenue = Some(component);
        self.group_revenue = Some(group);
        self
    }

    pub fn with_assets(mut self, component: Decimal, group: Decimal) -> Self {
        self.component_assets = Some(component);
        self.group_assets = Some(group);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizeClassification {
    SignificantSize,
    NonSignificant,
}

impl SizeClassification {
    pub fn is_significant_size(&self) -> bool {
        matches!(self, SizeClassification::SignificantSize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkEffort {
    FullAudit,
    SpecifiedProcedures,
    AnalyticalOnly,
}

/// A classified component, optionally with allocated materiality.
///
/// `classification` and `work_effort` are always derived together by the
/// classifier; there is no constructor that sets them independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupComponent {
    pub component: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_pct: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_pct: Option<Decimal>,
    /// The larger of the two shares; drives classification and allocation.
    pub component_pct: Decimal,
    pub classification: SizeClassification,
    pub work_effort: WorkEffort,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_materiality: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_materiality: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn builders_pair_component_with_group() {
        let figures = ComponentFigures::new("Sub A")
            .with_revenue(dec!(150), dec!(1000))
            .with_assets(dec!(20), dec!(400));
        assert_eq!(figures.component_revenue, Some(dec!(150)));
        assert_eq!(figures.group_assets, Some(dec!(400)));
    }

    #[test]
    fn enums_use_kebab_case() {
        assert_eq!(
            serde_json::to_string(&SizeClassification::SignificantSize).unwrap(),
            "\"significant-size\""
        );
        assert_eq!(
            serde_json::to_string(&WorkEffort::SpecifiedProcedures).unwrap(),
            "\"specified-procedures\""
        );
        assert!(SizeClassification::SignificantSize.is_significant_size());
        assert!(!SizeClassification::NonSignificant.is_significant_size());
    }
}
