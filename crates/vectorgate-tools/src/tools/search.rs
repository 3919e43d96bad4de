//! Search Tool
//!
//! The general-purpose search adapter. Accepts a query vector, query
//! text, or both:
//!
//! - vector only: dense similarity search
//! - text only: the text is embedded via the injected [`Embedder`] and
//!   searched densely (use the bm25_search tool for keyword ranking)
//! - both: hybrid search with weighted fusion

use serde_json::{json, Value};
use tracing::info;

use vectorgate_core::{ClientFacade, Embedder, SearchRequest};

use crate::envelope;
use crate::params::{parse_output_fields, parse_vector};

pub const OPERATION: &str = "search";

/// Input schema for the search tool
pub fn schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "collection_name": {
                "type": "string",
                "description": "Target collection"
            },
            "query_vector": {
                "description": "Dense query vector, as array or JSON-encoded string"
            },
            "query_text": {
                "type": "string",
                "description": "Text query; embedded for dense search, fused when a vector is also given"
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
            },
            "min_similarity": {
                "type": "number",
                "description": "Drop hits below this similarity (0.0-1.0)"
            },
            "vector_weight": {
                "type": "number",
                "description": "Hybrid weight for the dense branch (default: 0.7)"
            },
            "text_weight": {
                "type": "number",
                "description": "Hybrid weight for the text branch (default: 0.3)"
            }
        },
        "required": ["collection_name"]
    })
}

pub fn execute(facade: &mut ClientFacade, embedder: Option<&dyn Embedder>, args: Value) -> Value {
    let collection_name = match args.get("collection_name").and_then(Value::as_str) {
        Some(name) => name.to_string(),
        None => return envelope::invalid_params(OPERATION, "collection_name is required"),
    };

    let query_vector = match args.get("query_vector") {
        Some(value) if !value.is_null() => match parse_vector(value) {
            Ok(vector) => Some(vector),
            Err(e) => return envelope::failure(OPERATION, &e),
        },
        _ => None,
    };
    let query_text = args
        .get("query_text")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    // At least one query modality is required
    let mut request = match (&query_vector, &query_text) {
        (Some(vector), Some(text)) => {
            let mut request = SearchRequest::hybrid(&collection_name, vector.clone(), text.clone());
            if let vectorgate_core::SearchQuery::Hybrid {
                vector_weight,
                text_weight,
                ..
            } = &mut request.query
            {
                if let Some(w) = args.get("vector_weight").and_then(Value::as_f64) {
                    *vector_weight = w as f32;
                }
                if let Some(w) = args.get("text_weight").and_then(Value::as_f64) {
                    *text_weight = w as f32;
                }
            }
            request
        }
        (Some(vector), None) => SearchRequest::dense(&collection_name, vector.clone()),
        (None, Some(text)) => {
            // Text-only dense search needs the injected embedder
            let Some(embedder) = embedder else {
                return envelope::invalid_params(
                    OPERATION,
                    "query_text requires an embedding model; provide query_vector instead",
                );
            };
            match embedder.embed(text) {
                Ok(vector) => SearchRequest::dense(&collection_name, vector),
                Err(e) => return envelope::failure(OPERATION, &e),
            }
        }
        (None, None) => {
            return envelope::invalid_params(
                OPERATION,
                "either query_vector or query_text is required",
            )
        }
    };

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
    if let Some(threshold) = args.get("min_similarity").and_then(Value::as_f64) {
        request = request.with_min_similarity(threshold as f32);
    }

    info!(collection = %collection_name, limit = request.limit, "dispatching search");
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
