//! Tool Adapters
//!
//! One thin module per logical operation. Every adapter follows the
//! same shape: an input JSON schema, parameter extraction, exactly one
//! facade call, and the uniform response envelope. The adapters
//! compose the one facade type; there is no inheritance hierarchy.

pub mod bm25_search;
pub mod collection_create;
pub mod collection_describe;
pub mod collection_drop;
pub mod collection_list;
pub mod delete;
pub mod insert;
pub mod query;
pub mod search;

use serde_json::Value;

use vectorgate_core::{ClientFacade, Embedder};

use crate::envelope;

/// Names of every registered tool.
pub const TOOL_NAMES: [&str; 9] = [
    bm25_search::OPERATION,
    collection_create::OPERATION,
    collection_describe::OPERATION,
    collection_drop::OPERATION,
    collection_list::OPERATION,
    delete::OPERATION,
    insert::OPERATION,
    query::OPERATION,
    search::OPERATION,
];

/// Input schema for a tool by name.
pub fn tool_schema(name: &str) -> Option<Value> {
    match name {
        bm25_search::OPERATION => Some(bm25_search::schema()),
        collection_create::OPERATION => Some(collection_create::schema()),
        collection_describe::OPERATION => Some(collection_describe::schema()),
        collection_drop::OPERATION => Some(collection_drop::schema()),
        collection_list::OPERATION => Some(collection_list::schema()),
        delete::OPERATION => Some(delete::schema()),
        insert::OPERATION => Some(insert::schema()),
        query::OPERATION => Some(query::schema()),
        search::OPERATION => Some(search::schema()),
        _ => None,
    }
}

/// Dispatch one named tool invocation against a facade.
pub fn dispatch(
    name: &str,
    facade: &mut ClientFacade,
    embedder: Option<&dyn Embedder>,
    args: Value,
) -> Value {
    match name {
        bm25_search::OPERATION => bm25_search::execute(facade, args),
        collection_create::OPERATION => collection_create::execute(facade, args),
        collection_describe::OPERATION => collection_describe::execute(facade, args),
        collection_drop::OPERATION => collection_drop::execute(facade, args),
        collection_list::OPERATION => collection_list::execute(facade, args),
        delete::OPERATION => delete::execute(facade, args),
        insert::OPERATION => insert::execute(facade, args),
        query::OPERATION => query::execute(facade, args),
        search::OPERATION => search::execute(facade, embedder, args),
        other => envelope::invalid_params(other, format!("unknown tool '{}'", other)),
    }
}

// ============================================================================
// SHARED TEST FIXTURES
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::json;
    use vectorgate_core::{
        ClientFacade, CollectionConfig, Credentials, MemoryConnection, Record, TextFieldConfig,
    };

    pub fn memory_facade() -> ClientFacade {
        ClientFacade::from_connection(
            Credentials::new("https://127.0.0.1:19530", "root", "secret", None),
            Box::new(MemoryConnection::new()),
        )
    }

    fn record(pairs: serde_json::Value) -> Record {
        pairs.as_object().unwrap().clone()
    }

    /// Dense-only collection "docs" with two orthogonal rows.
    pub fn seed_dense(facade: &mut ClientFacade) {
        facade
            .create_collection(&CollectionConfig::dense("docs", 2))
            .unwrap();
        facade
            .insert(
                "docs",
                vec![
                    record(json!({"vector": [1.0, 0.0], "tag": "a"})),
                    record(json!({"vector": [0.0, 1.0], "tag": "b"})),
                ],
            )
            .unwrap();
    }

    /// BM25 collection "articles" with two text rows.
    pub fn seed_bm25(facade: &mut ClientFacade) {
        facade
            .create_collection(&CollectionConfig::with_bm25(
                "articles",
                2,
                TextFieldConfig {
                    name: "body".to_string(),
                    max_length: 4096,
                },
            ))
            .unwrap();
        facade
            .insert(
                "articles",
                vec![
                    record(json!({"vector": [1.0, 0.0], "body": "vector databases at scale"})),
                    record(json!({"vector": [0.0, 1.0], "body": "keyword ranking with bm25"})),
                ],
            )
            .unwrap();
    }

    #[test]
    fn test_dispatch_unknown_tool() {
        let mut facade = memory_facade();
        let result = super::dispatch("nonexistent", &mut facade, None, json!({}));
        assert_eq!(result["success"], false);
    }

    #[test]
    fn test_every_tool_has_a_schema() {
        for name in super::TOOL_NAMES {
            assert!(super::tool_schema(name).is_some(), "missing schema for {}", name);
        }
        assert!(super::tool_schema("nonexistent").is_none());
    }
}
