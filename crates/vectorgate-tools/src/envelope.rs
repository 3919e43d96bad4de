//! Response Envelope
//!
//! The fixed consumer contract of the shell: every tool returns either
//! `{success: true, operation, ...payload}` or `{success: false,
//! error, error_type, operation, suggestion}`. The error half is built
//! from the classified facade error so the message is operation-scoped
//! and the suggestion actionable.

use serde_json::{json, Value};

use vectorgate_core::{operation_message, ClientError};

/// Wrap a successful payload. Payload keys are merged at the top level
/// next to `success` and `operation`.
pub fn success(operation: &str, payload: Value) -> Value {
    let mut envelope = json!({
        "success": true,
        "operation": operation,
    });
    if let (Some(envelope_map), Some(payload_map)) = (envelope.as_object_mut(), payload.as_object())
    {
        for (key, value) in payload_map {
            envelope_map.insert(key.clone(), value.clone());
        }
    }
    envelope
}

/// Wrap a classified failure.
pub fn failure(operation: &str, error: &ClientError) -> Value {
    let kind = error.kind();
    json!({
        "success": false,
        "error": operation_message(operation, error),
        "error_type": error.error_type(),
        "operation": operation,
        "suggestion": kind.suggestion(),
    })
}

/// Local parameter-parsing failure, before any facade call.
pub fn invalid_params(operation: &str, detail: impl std::fmt::Display) -> Value {
    failure(
        operation,
        &ClientError::invalid(detail.to_string()),
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_merges_payload() {
        let envelope = success("insert", json!({"inserted_count": 3}));
        assert_eq!(envelope["success"], true);
        assert_eq!(envelope["operation"], "insert");
        assert_eq!(envelope["inserted_count"], 3);
    }

    #[test]
    fn test_failure_shape() {
        let err = ClientError::Engine("collection 'x' does not exist".to_string());
        let envelope = failure("search", &err);
        assert_eq!(envelope["success"], false);
        assert_eq!(envelope["error_type"], "ResourceNotFoundError");
        assert_eq!(
            envelope["error"],
            "search failed: collection 'x' does not exist"
        );
        assert!(envelope["suggestion"].as_str().unwrap().contains("exists"));
    }

    #[test]
    fn test_unknown_engine_error_keeps_raw_text() {
        let err = ClientError::Engine("flux capacitor misaligned".to_string());
        let envelope = failure("insert", &err);
        assert_eq!(envelope["error_type"], "EngineError");
        assert!(envelope["error"]
            .as_str()
            .unwrap()
            .contains("flux capacitor misaligned"));
    }
}
