//! Collection Create Tool
//!
//! Creates a collection with an implicit primary key, a dense vector
//! field, and optionally a BM25-indexed text field.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use vectorgate_core::{ClientFacade, CollectionConfig, TextFieldConfig};

use crate::envelope;

pub const OPERATION: &str = "collection_create";

/// Default text field when BM25 is enabled without an explicit one.
const DEFAULT_TEXT_FIELD: &str = "text";
const DEFAULT_TEXT_MAX_LENGTH: u32 = 65535;

/// Input schema for the collection_create tool
pub fn schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "collection_name": {
                "type": "string",
                "description": "Name of the collection to create"
            },
            "dimension": {
                "type": "integer",
                "description": "Dense vector dimensionality (1-32768)",
                "minimum": 1,
                "maximum": 32768
            },
            "enable_bm25": {
                "type": "boolean",
                "description": "Add a BM25-indexed text field (default: false)",
                "default": false
            },
            "text_field_name": {
                "type": "string",
                "description": "Text field name when BM25 is enabled (default: text)"
            },
            "text_max_length": {
                "type": "integer",
                "description": "Text field capacity (default: 65535)"
            }
        },
        "required": ["collection_name", "dimension"]
    })
}

#[derive(Debug, Deserialize)]
struct Args {
    collection_name: String,
    dimension: u32,
    #[serde(default)]
    enable_bm25: bool,
    text_field_name: Option<String>,
    text_max_length: Option<u32>,
}

pub fn execute(facade: &mut ClientFacade, args: Value) -> Value {
    let args: Args = match serde_json::from_value(args) {
        Ok(args) => args,
        Err(e) => return envelope::invalid_params(OPERATION, e),
    };

    let mut config = CollectionConfig::dense(&args.collection_name, args.dimension);
    if args.enable_bm25 {
        config.enable_bm25 = true;
        config.text_field = Some(TextFieldConfig {
            name: args
                .text_field_name
                .unwrap_or_else(|| DEFAULT_TEXT_FIELD.to_string()),
            max_length: args.text_max_length.unwrap_or(DEFAULT_TEXT_MAX_LENGTH),
        });
    }

    info!(collection = %args.collection_name, dimension = args.dimension, "creating collection");
    match facade.create_collection(&config) {
        Ok(()) => envelope::success(
            OPERATION,
            json!({
                "collection_name": args.collection_name,
                "dimension": args.dimension,
                "metric_type": "COSINE",
                "enable_bm25": args.enable_bm25,
            }),
        ),
        Err(e) => envelope::failure(OPERATION, &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::tests::memory_facade;

    #[test]
    fn test_create_and_duplicate() {
        let mut facade = memory_facade();
        let result = execute(
            &mut facade,
            json!({"collection_name": "docs", "dimension": 8}),
        );
        assert_eq!(result["success"], true);
        assert_eq!(result["dimension"], 8);

        let duplicate = execute(
            &mut facade,
            json!({"collection_name": "docs", "dimension": 8}),
        );
        assert_eq!(duplicate["success"], false);
        assert!(duplicate["error"]
            .as_str()
            .unwrap()
            .contains("already exists"));
    }

    #[test]
    fn test_bm25_defaults_applied() {
        let mut facade = memory_facade();
        let result = execute(
            &mut facade,
            json!({"collection_name": "docs", "dimension": 8, "enable_bm25": true}),
        );
        assert_eq!(result["success"], true);
        let description = facade.describe_collection("docs").unwrap();
        let fields: Vec<&str> = description["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["name"].as_str().unwrap())
            .collect();
        assert_eq!(fields, ["id", "text", "vector", "sparse_vector"]);
    }

    #[test]
    fn test_invalid_dimension_reported() {
        let mut facade = memory_facade();
        let result = execute(
            &mut facade,
            json!({"collection_name": "docs", "dimension": 40000}),
        );
        assert_eq!(result["success"], false);
        assert_eq!(result["error_type"], "InvalidArgument");
    }
}
