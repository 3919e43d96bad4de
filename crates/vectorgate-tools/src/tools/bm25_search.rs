//! BM25 Search Tool
//!
//! Keyword ranking over the sparse field; tokenization and scoring
//! happen on the engine.

use serde_json::{json, Value};
use tracing::info;

use vectorgate_core::{ClientFacade, SearchRequest};

use crate::envelope;
use crate::params::parse_output_fields;

pub const OPERATION: &str = "bm25_search";

/// Input schema for the bm25_search tool
pub fn schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "collection_name": {
                "type": "string",
                "description": "Target collection (must have BM25 enabled)"
            },
            "query_text": {
                "type": "string",
                "description": "Keyword query"
            },
            "limit": {
                "type": "integer",
                "description": "Maximum number of hits (default: 10)",
                "default": 10
            },
            "output_fields": {
                "description": "Fields to flatten into each hit, as array or comma-separated string"
            },
            "filter": {
                "type": "string",
                "description": "Optional filter expression"
            }
        },
        "required": ["collection_name", "query_text"]
    })
}

pub fn execute(facade: &mut ClientFacade, args: Value) -> Value {
    let collection_name = match args.get("collection_name").and_then(Value::as_str) {
        Some(name) => name.to_string(),
        None => return envelope::invalid_params(OPERATION, "collection_name is required"),
    };
    let query_text = match args.get("query_text").and_then(Value::as_str) {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => return envelope::invalid_params(OPERATION, "query_text is required"),
    };

    let mut request = SearchRequest::sparse(&collection_name, query_text);
    if let Some(limit) = args.get("limit").and_then(Value::as_u64) {
        request = request.with_limit(limit as usize);
    }
    match parse_output_fields(args.get("output_fields")) {
        Ok(fields) => request = request.with_output_fields(fields),
        Err(e) => return envelope::failure(OPERATION, &e),
    }
    if let Some(filter) = args.get("filter").and_then(Value::as_str) {
        request = request.with_filter(filter);
    }

    info!(collection = %collection_name, "dispatching BM25 search");
    match facade.search(&request) {
        Ok(hits) => {
            let count = hits.len();
            envelope::success(
                OPERATION,
                json!({
                    "collection_name": collection_name,
                    "results": hits,
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
    use crate::tools::tests::{memory_facade, seed_bm25};

    #[test]
    fn test_bm25_search_ranks_keywords() {
        let mut facade = memory_facade();
        seed_bm25(&mut facade);
        let result = execute(
            &mut facade,
            json!({
                "collection_name": "articles",
                "query_text": "keyword ranking",
                "output_fields": "body"
            }),
        );
        assert_eq!(result["success"], true);
        assert!(result["result_count"].as_u64().unwrap() >= 1);
        assert!(result["results"][0]["entity"]["body"]
            .as_str()
            .unwrap()
            .contains("keyword"));
    }

    #[test]
    fn test_empty_query_text_rejected() {
        let mut facade = memory_facade();
        let result = execute(
            &mut facade,
            json!({"collection_name": "articles", "query_text": "  "}),
        );
        assert_eq!(result["success"], false);
    }

    #[test]
    fn test_missing_collection_reported() {
        let mut facade = memory_facade();
        let result = execute(
            &mut facade,
            json!({"collection_name": "ghost", "query_text": "x"}),
        );
        assert_eq!(result["success"], false);
        assert_eq!(result["error_type"], "ResourceNotFoundError");
    }
}
