//! End-to-end facade scenarios against the in-memory engine.

use std::net::TcpListener;
use std::sync::Arc;

use serde_json::json;
use vectorgate_core::{
    ClientFacade, CollectionConfig, Connection, Credentials, Dialer, ErrorKind, GuardConfig,
    MemoryConnection, Record, Result, SearchRequest, TextFieldConfig,
};

fn record(pairs: serde_json::Value) -> Record {
    pairs.as_object().unwrap().clone()
}

fn memory_facade() -> ClientFacade {
    ClientFacade::from_connection(
        Credentials::new("https://127.0.0.1:19530", "root", "secret", None),
        Box::new(MemoryConnection::new()),
    )
}

#[test]
fn create_insert_search_roundtrip() {
    let mut facade = memory_facade();

    // Create a dense-only collection
    facade
        .create_collection(&CollectionConfig::dense("notes", 128))
        .unwrap();
    assert!(facade.has_collection("notes").unwrap());

    // Insert one record with a 128-length vector
    let vector: Vec<f32> = (0..128).map(|i| (i as f32).sin()).collect();
    let vector_json = serde_json::to_value(&vector).unwrap();
    let outcome = facade
        .insert(
            "notes",
            vec![record(json!({"vector": vector_json, "title": "first"}))],
        )
        .unwrap();
    assert_eq!(outcome.inserted_count, 1);
    let inserted_id = outcome.ids[0];

    // Dense search with the same vector returns exactly that record
    let hits = facade
        .search(
            &SearchRequest::dense("notes", vector)
                .with_limit(1)
                .with_output_fields(vec!["title".to_string()]),
        )
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, inserted_id);
    assert!(hits[0].score > 0.99);
    assert_eq!(hits[0].entity.get("title").unwrap(), "first");
}

#[test]
fn bm25_and_hybrid_over_text_collection() {
    let mut facade = memory_facade();
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

    let sparse_hits = facade
        .search(&SearchRequest::sparse("articles", "bm25 ranking"))
        .unwrap();
    assert_eq!(sparse_hits[0].id, 2);

    let hybrid_hits = facade
        .search(&SearchRequest::hybrid(
            "articles",
            vec![1.0, 0.0],
            "bm25 ranking",
        ))
        .unwrap();
    let ids: Vec<i64> = hybrid_hits.iter().map(|h| h.id).collect();
    assert!(ids.contains(&1) && ids.contains(&2));
}

#[test]
fn search_missing_collection_classifies_as_not_found() {
    let mut facade = memory_facade();
    let err = facade
        .search(&SearchRequest::dense("ghost", vec![1.0]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
}

#[test]
fn drop_collection_removes_it() {
    let mut facade = memory_facade();
    facade
        .create_collection(&CollectionConfig::dense("temp", 4))
        .unwrap();
    facade.drop_collection("temp").unwrap();
    assert!(!facade.has_collection("temp").unwrap());
}

#[test]
fn lazy_facade_dials_through_the_guard_once() {
    struct MemoryDialer;
    impl Dialer for MemoryDialer {
        fn dial(&self, _credentials: &Credentials) -> Result<Box<dyn Connection>> {
            Ok(Box::new(MemoryConnection::new()))
        }
    }

    // A listening socket so the TCP preflight passes
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let credentials = Credentials::new(format!("127.0.0.1:{}", port), "root", "secret", None);
    let mut facade = ClientFacade::new(credentials, Arc::new(MemoryDialer))
        .with_guard_config(GuardConfig::default());

    // First operation acquires the connection lazily; state persists
    // across calls because the facade owns the handle exclusively
    facade
        .create_collection(&CollectionConfig::dense("docs", 2))
        .unwrap();
    assert!(facade.has_collection("docs").unwrap());
    assert_eq!(facade.list_collections().unwrap(), ["docs"]);
}
