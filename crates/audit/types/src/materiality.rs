//! Materiality inputs and thresholds

use crate::RiskLevel;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Financial figures a caller can offer as materiality benchmarks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FinancialData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_before_tax: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_assets: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equity: Option<Decimal>,
    /// Accepted for completeness; never selected as a benchmark.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gross_profit: Option<Decimal>,
}

impl FinancialData {
    pub fn with_profit_before_tax(mut self, value: Decimal) -> Self {
        self.profit_before_tax = Some(value);
        self
    }

    pub fn with_revenue(mut self, value: Decimal) -> Self {
        self.revenue = Some(value);
        self
    }

    pub fn with_total_assets(mut self, value: Decimal) -> Self {
        self.total_assets = Some(value);
        self
    }

    pub fn with_equity(mut self, value: Decimal) -> Self {
        self.equity = Some(value);
        self
    }

    /// Figure for a given benchmark basis.
    pub fn figure(&self, basis: MaterialityBasis) -> Option<Decimal> {
        match basis {
            MaterialityBasis::ProfitBeforeTax => self.profit_before_tax,
            MaterialityBasis::Revenue => self.revenue,
            MaterialityBasis::TotalAssets => self.total_assets,
            MaterialityBasis::Equity => self.equity,
        }
    }
}

/// Benchmark a materiality figure is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaterialityBasis {
    ProfitBeforeTax,
    Revenue,
    TotalAssets,
    Equity,
}

impl MaterialityBasis {
    /// Selection priority, most preferred first.
    pub const PRIORITY: [MaterialityBasis; 4] = [
        MaterialityBasis::ProfitBeforeTax,
        MaterialityBasis::Revenue,
        MaterialityBasis::TotalAssets,
        MaterialityBasis::Equity,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MaterialityBasis::ProfitBeforeTax => "Profit before tax",
            MaterialityBasis::Revenue => "Revenue",
            MaterialityBasis::TotalAssets => "Total assets",
            MaterialityBasis::Equity => "Equity",
        }
    }
}

impl fmt::Display for MaterialityBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Overall, performance and trivial thresholds for one engagement period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialityCalculation {
    pub benchmark_value: Decimal,
    pub basis: MaterialityBasis,
    /// Percentage of the benchmark, e.g. `5` for 5%.
    pub percentage_applied: Decimal,
    pub overall_materiality: Decimal,
    pub performance_materiality: Decimal,
    pub trivial_threshold: Decimal,
    pub performance_factor: Decimal,
    pub risk_level: RiskLevel,
    pub rationale: String,
}
