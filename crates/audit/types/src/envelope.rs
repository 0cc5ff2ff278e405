//! Request/response envelope for the single engine entrypoint

use crate::{AuditContext, EngineError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request entering `AuditEngine::handle`.
///
/// `parameters` stays untyped here; the dispatcher resolves it against the
/// task's typed parameter struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineRequest {
    pub task: String,
    #[serde(default)]
    pub context: AuditContext,
    #[serde(default)]
    pub parameters: Value,
}

impl EngineRequest {
    pub fn new(task: impl Into<String>, parameters: Value) -> Self {
        Self {
            task: task.into(),
            context: AuditContext::default(),
            parameters,
        }
    }

    pub fn with_context(mut self, context: AuditContext) -> Self {
        self.context = context;
        self
    }
}

/// Unified response. A failed response carries `error` and never `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineResponse<T = Value> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_steps: Vec<String>,
}

impl<T> EngineResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            warnings: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    pub fn failure(error: &EngineError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            warnings: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_next_steps(mut self, steps: impl IntoIterator<Item = String>) -> Self {
        self.next_steps.extend(steps);
        self
    }

    /// Warnings are advisory and only ever accompany a success.
    pub fn push_warning(&mut self, warning: impl Into<String>) {
        if self.success {
            self.warnings.push(warning.into());
        }
    }
}
