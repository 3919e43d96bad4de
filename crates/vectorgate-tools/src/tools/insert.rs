//! Insert Tool

use serde_json::{json, Value};
use tracing::info;

use vectorgate_core::ClientFacade;

use crate::envelope;
use crate::params::parse_records;

pub const OPERATION: &str = "insert";

/// Input schema for the insert tool
pub fn schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "collection_name": {
                "type": "string",
                "description": "Target collection"
            },
            "data": {
                "description": "One record object or an array of record objects; may also be a JSON-encoded string"
            }
        },
        "required": ["collection_name", "data"]
    })
}

pub fn execute(facade: &mut ClientFacade, args: Value) -> Value {
    let collection_name = match args.get("collection_name").and_then(Value::as_str) {
        Some(name) => name.to_string(),
        None => return envelope::invalid_params(OPERATION, "collection_name is required"),
    };
    let data = match args.get("data") {
        Some(data) => data,
        None => return envelope::invalid_params(OPERATION, "data is required"),
    };
    let records = match parse_records(data) {
        Ok(records) => records,
        Err(e) => return envelope::failure(OPERATION, &e),
    };

    info!(collection = %collection_name, rows = records.len(), "inserting records");
    match facade.insert(&collection_name, records) {
        Ok(outcome) => envelope::success(
            OPERATION,
            json!({
                "collection_name": collection_name,
                "inserted_count": outcome.inserted_count,
                "ids": outcome.ids,
            }),
        ),
        Err(e) => envelope::failure(OPERATION, &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::tests::memory_facade;
    use vectorgate_core::CollectionConfig;

    #[test]
    fn test_insert_records() {
        let mut facade = memory_facade();
        facade
            .create_collection(&CollectionConfig::dense("docs", 2))
            .unwrap();
        let result = execute(
            &mut facade,
            json!({
                "collection_name": "docs",
                "data": [
                    {"vector": [1.0, 0.0], "tag": "a"},
                    {"vector": [0.0, 1.0], "tag": "b"}
                ]
            }),
        );
        assert_eq!(result["success"], true);
        assert_eq!(result["inserted_count"], 2);
        assert_eq!(result["ids"], json!([1, 2]));
    }

    #[test]
    fn test_dimension_mismatch_surfaces_engine_error() {
        let mut facade = memory_facade();
        facade
            .create_collection(&CollectionConfig::dense("docs", 2))
            .unwrap();
        let result = execute(
            &mut facade,
            json!({"collection_name": "docs", "data": {"vector": [1.0]}}),
        );
        assert_eq!(result["success"], false);
        assert!(result["error"].as_str().unwrap().contains("dimension"));
    }
}
