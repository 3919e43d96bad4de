//! Shared Parameter Parsing
//!
//! Tool parameters arrive as loosely-typed JSON from the dispatch
//! shell. Vectors may be real arrays or JSON-encoded strings; output
//! field lists may be arrays or comma-separated strings.

use serde_json::Value;

use vectorgate_core::{ClientError, Record, Result};

/// Parse a dense vector from either a JSON array or a string holding
/// one.
pub fn parse_vector(value: &Value) -> Result<Vec<f32>> {
    let parsed;
    let array = match value {
        Value::Array(_) => value,
        Value::String(text) => {
            parsed = serde_json::from_str::<Value>(text).map_err(|_| invalid_vector())?;
            &parsed
        }
        _ => return Err(invalid_vector()),
    };
    array
        .as_array()
        .ok_or_else(invalid_vector)?
        .iter()
        .map(|v| v.as_f64().map(|x| x as f32).ok_or_else(invalid_vector))
        .collect()
}

fn invalid_vector() -> ClientError {
    ClientError::invalid("invalid vector data format, expected a JSON array of numbers")
}

/// Parse output fields from an array of strings or a comma-separated
/// string. Absent or empty means "no extra fields".
pub fn parse_output_fields(value: Option<&Value>) -> Result<Vec<String>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(text)) => Ok(text
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str().map(str::to_string).ok_or_else(|| {
                    ClientError::invalid("output_fields entries must be strings")
                })
            })
            .collect(),
        Some(_) => Err(ClientError::invalid(
            "output_fields must be a string or an array of strings",
        )),
    }
}

/// Parse insert data: one record object or an array of them.
pub fn parse_records(value: &Value) -> Result<Vec<Record>> {
    let parsed;
    let data = match value {
        Value::String(text) => {
            parsed = serde_json::from_str::<Value>(text)
                .map_err(|_| ClientError::invalid("data must be valid JSON"))?;
            &parsed
        }
        other => other,
    };
    match data {
        Value::Object(record) => Ok(vec![record.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_object().cloned().ok_or_else(|| {
                    ClientError::invalid("each record must be a JSON object")
                })
            })
            .collect(),
        _ => Err(ClientError::invalid(
            "data must be a JSON object or an array of objects",
        )),
    }
}

// ============================================================================
// TESTS
// ============================================================================
