//! Delete Tool
//!
//! The filter is mandatory; the facade refuses an empty one before any
//! network traffic so a malformed call can never clear a collection.

use serde_json::{json, Value};
use tracing::info;

use vectorgate_core::ClientFacade;

use crate::envelope;

pub const OPERATION: &str = "delete";

/// Input schema for the delete tool
pub fn schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "collection_name": {
                "type": "string",
                "description": "Target collection"
            },
            "filter": {
                "type": "string",
                "description": "Filter expression selecting the rows to delete; required"
            }
        },
        "required": ["collection_name", "filter"]
    })
}

pub fn execute(facade: &mut ClientFacade, args: Value) -> Value {
    let collection_name = match args.get("collection_name").and_then(Value::as_str) {
        Some(name) => name.to_string(),
        None => return envelope::invalid_params(OPERATION, "collection_name is required"),
    };
    let filter = args.get("filter").and_then(Value::as_str);

    info!(collection = %collection_name, "deleting records");
    match facade.delete(&collection_name, filter) {
        Ok(outcome) => envelope::success(
            OPERATION,
            json!({
                "collection_name": collection_name,
                "deleted_count": outcome.deleted_count,
            }),
        ),
        Err(e) => envelope::failure(OPERATION, &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::tests::{memory_facade, seed_dense};

    #[test]
    fn test_delete_with_filter() {
        let mut facade = memory_facade();
        seed_dense(&mut facade);
        let result = execute(
            &mut facade,
            json!({"collection_name": "docs", "filter": "id == 1"}),
        );
        assert_eq!(result["success"], true);
        assert_eq!(result["deleted_count"], 1);
    }

    #[test]
    fn test_delete_without_filter_rejected() {
        let mut facade = memory_facade();
        seed_dense(&mut facade);
        for args in [
            json!({"collection_name": "docs"}),
            json!({"collection_name": "docs", "filter": ""}),
        ] {
            let result = execute(&mut facade, args);
            assert_eq!(result["success"], false);
            assert_eq!(result["error_type"], "InvalidArgument");
        }
        // Nothing was deleted by the rejected calls
        let rows = facade.query("docs", "", None, &[]).unwrap();
        assert_eq!(rows.len(), 2);
    }
}
