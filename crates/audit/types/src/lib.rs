//! Audit Engine Domain Types
//!
//! Value objects shared by the audit risk, materiality and sampling engine
//! and by every caller that marshals requests into it.
//!
//! # Key Concepts
//!
//! - **Risk levels**: a single ordinal scale `low < moderate < significant < high`
//!   used for inherent, control and combined risk.
//! - **Calculation results**: materiality thresholds, risk assessments, sample
//!   designs, projected misstatements, analytics results, control test
//!   conclusions and group component allocations. Every result is created by
//!   one calculation call and never mutated afterwards.
//! - **Envelope**: the `{ task, context, parameters }` request and the
//!   `{ success, data, error, warnings, nextSteps }` response.
//!
//! # Architecture
//!
//! This is a pure types crate with no runtime behaviour beyond constructors
//! and small predicates. All types implement `Clone`, `Debug`, `Serialize`,
//! `Deserialize` and use camelCase field names on the wire. Monetary amounts
//! are `rust_decimal::Decimal`.
//!
//! # Wire format
//!
//! Decimal fields (amounts, percentages, factors, rates) serialize as JSON
//! strings holding the exact value, e.g. `"overallMateriality": "50000"` or
//! `"exceptionRate": "6.67"`. Callers that need numbers must parse them. On
//! input the same fields accept either a JSON number or a string.
//!
//! Analytics figures and statistics are plain `f64` and serialize as JSON
//! numbers. Analytics results are tagged by `kind` (`benford` or `outliers`).

#![deny(unsafe_code)]

mod analytics;
mod context;
mod controls;
mod envelope;
mod errors;
mod group;
mod level;
mod materiality;
mod risk;
mod sampling;

pub use analytics::*;
pub use context::*;
pub use controls::*;
pub use envelope::*;
pub use errors::*;
pub use group::*;
pub use level::*;
pub use materiality::*;
pub use risk::*;
pub use sampling::*;
