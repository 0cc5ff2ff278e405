//! Request input: a single JSON document or JSON lines.

use anyhow::{Context, Result};
use audit_types::{EngineError, EngineRequest, EngineResponse};
use serde_json::Value;
use std::io::Read;

/// One parsed input line, or the failure to parse it.
pub type Parsed = std::result::Result<EngineRequest, EngineResponse>;

/// Read the whole input from a path, or stdin when the path is `-`.
pub fn read_source(path: &str) -> Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read requests from stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
    }
}

fn malformed(detail: impl std::fmt::Display) -> EngineResponse {
    EngineResponse::failure(&EngineError::invalid(format!("malformed request: {detail}")))
}

/// A single document holding one request or an array of requests.
pub fn parse_document(text: &str) -> Result<Vec<EngineRequest>> {
    let value: Value = serde_json::from_str(text).context("input is not valid JSON")?;
    let requests = match value {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<EngineRequest>, _>>()
            .context("input array holds a malformed request")?,
        other => vec![serde_json::from_value(other).context("input is not a request")?],
    };
    Ok(requests)
}

/// JSON lines; a bad line yields a failure response in its place so the
/// output stays aligned with the input.
pub fn parse_lines(text: &str) -> Vec<Parsed> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_str::<EngineRequest>(line).map_err(malformed))
        .collect()
}
