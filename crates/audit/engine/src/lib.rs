//! Audit risk, materiality and sampling engine.
//!
//! Deterministic calculation rules supporting a financial-statement audit:
//!
//! - [`materiality`]: benchmark selection and overall, performance and trivial
//!   thresholds (ISA 320)
//! - [`risk`]: inherent, control and combined risk, plus presumed significant
//!   and fraud risks (ISA 240 / ISA 315)
//! - [`sampling`] and [`projection`]: sample sizing and misstatement
//!   projection (ISA 530)
//! - [`analytics`]: Benford leading-digit test and outlier scan
//! - [`controls`]: tests of operating effectiveness
//! - [`group`]: component classification and materiality allocation (ISA 600)
//!
//! Every threshold lives in [`ruleset`]. [`AuditEngine`] dispatches
//! `{ task, context, parameters }` requests to the components and wraps the
//! outcome in an [`audit_types::EngineResponse`].
//!
//! ```
//! use audit_engine::AuditEngine;
//! use audit_types::EngineRequest;
//! use serde_json::json;
//!
//! let engine = AuditEngine::default();
//! let response = engine.handle(&EngineRequest::new(
//!     "calculate_materiality",
//!     json!({ "financialData": { "profitBeforeTax": 1000000 } }),
//! ));
//! assert!(response.success);
//! ```

#![deny(unsafe_code)]

pub mod analytics;
pub mod controls;
pub mod engine;
pub mod group;
pub mod materiality;
pub mod projection;
pub mod risk;
pub mod ruleset;
pub mod sampling;
pub mod task;

pub use engine::{AuditEngine, FIRST_YEAR_WARNING};
pub use ruleset::Ruleset;
pub use task::{Task, TaskKind};

use audit_types::{EngineError, EngineResult};
use rust_decimal::{Decimal, RoundingStrategy};

/// Round to whole currency units, midpoint away from zero.
pub fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Turn a failed checked operation into an invalid-parameter error.
pub(crate) fn checked(value: Option<Decimal>, what: &str) -> EngineResult<Decimal> {
    value.ok_or_else(|| EngineError::invalid(format!("{what} is out of range")))
}
