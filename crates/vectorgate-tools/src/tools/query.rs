//! Query Tool
//!
//! Filter-based scalar retrieval, no vector scoring involved.

use serde_json::{json, Value};

use vectorgate_core::ClientFacade;

use crate::envelope;
use crate::params::parse_output_fields;

pub const OPERATION: &str = "query";

/// Input schema for the query tool
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
                "description": "Filter expression, e.g. id == 1"
            },
            "limit": {
                "type": "integer",
                "description": "Maximum number of rows to return"
            },
            "output_fields": {
                "description": "Fields to include, as array or comma-separated string"
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
    let filter = match args.get("filter").and_then(Value::as_str) {
        Some(filter) => filter.to_string(),
        None => return envelope::invalid_params(OPERATION, "filter is required"),
    };
    let limit = args
        .get("limit")
        .and_then(Value::as_u64)
        .map(|l| l as usize);
    let output_fields = match parse_output_fields(args.get("output_fields")) {
        Ok(fields) => fields,
        Err(e) => return envelope::failure(OPERATION, &e),
    };

    match facade.query(&collection_name, &filter, limit, &output_fields) {
        Ok(rows) => {
            let count = rows.len();
            envelope::success(
                OPERATION,
                json!({
                    "collection_name": collection_name,
                    "results": rows,
                    "result_count": count,
                }),
            )
        }
        Err(e) => envelope::failure(OPERATION, &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::tests::{memory_facade, seed_dense};

    #[test]
    fn test_query_by_filter() {
        let mut facade = memory_facade();
        seed_dense(&mut facade);
        let result = execute(
            &mut facade,
            json!({"collection_name": "docs", "filter": "id == 1", "output_fields": "tag"}),
        );
        assert_eq!(result["success"], true);
        assert_eq!(result["result_count"], 1);
        assert_eq!(result["results"][0]["tag"], "a");
    }

    #[test]
    fn test_query_missing_filter_rejected() {
        let mut facade = memory_facade();
        let result = execute(&mut facade, json!({"collection_name": "docs"}));
        assert_eq!(result["success"], false);
        assert_eq!(result["error_type"], "InvalidArgument");
    }
}
