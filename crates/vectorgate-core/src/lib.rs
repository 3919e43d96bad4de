//! # Vectorgate Core
//!
//! A connection-and-search facade over a remote vector database,
//! designed for short-lived, resource-constrained callers that cannot
//! afford a hung handshake or a leaked socket:
//!
//! - **ConnectionGuard**: bounded, fail-fast establishment — URI
//!   normalization, DNS and TCP preflight, watchdog-guarded dial
//! - **ClientFacade**: one cohesive API for collection lifecycle,
//!   mutation and reads over an exclusively-owned connection
//! - **SchemaBuilder**: declarative collection description to concrete
//!   field, BM25 function, and index definitions
//! - **SearchDispatcher**: dense, BM25-sparse and hybrid retrieval
//!   behind one request/response contract
//! - **ErrorClassifier**: raw network/engine failures reduced to a
//!   small taxonomy of actionable kinds
//!
//! The engine binding is abstracted behind the [`Connection`] trait;
//! [`MemoryConnection`] is a deterministic in-memory implementation so
//! everything above it can be tested without a live service.
//!
//! ## Quick Start
//!
//! ```rust
//! use vectorgate_core::{
//!     ClientFacade, CollectionConfig, Credentials, MemoryConnection, SearchRequest,
//! };
//!
//! # fn main() -> vectorgate_core::Result<()> {
//! let credentials = Credentials::new("https://127.0.0.1:19530", "root", "secret", None);
//! let mut facade =
//!     ClientFacade::from_connection(credentials, Box::new(MemoryConnection::new()));
//!
//! facade.create_collection(&CollectionConfig::dense("docs", 4))?;
//! let mut row = serde_json::Map::new();
//! row.insert("vector".into(), serde_json::json!([1.0, 0.0, 0.0, 0.0]));
//! facade.insert("docs", vec![row])?;
//!
//! let hits = facade.search(&SearchRequest::dense("docs", vec![1.0, 0.0, 0.0, 0.0]))?;
//! assert_eq!(hits.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod client;
pub mod connection;
pub mod embed;
pub mod error;
pub mod schema;
pub mod search;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use client::{
    canonicalize, ClientFacade, Connection, DeleteOutcome, InsertOutcome, MemoryConnection,
    RawHit, RawSearch, RawValue, Record, SearchData,
};
pub use connection::{
    normalize_uri, parse_endpoint, ConnectionGuard, Credentials, Dialer, Endpoint, GuardConfig,
};
pub use embed::Embedder;
pub use error::{classify, operation_message, ClientError, ErrorKind, Result};
pub use schema::{
    validate_collection_name, CollectionConfig, CollectionPlan, FieldDef, FunctionDef, IndexSpec,
    IndexType, MetricType, SchemaBuilder, TextFieldConfig, VectorFieldConfig,
};
pub use search::{
    dispatch, fuse_weighted, score_to_similarity, SearchHit, SearchQuery, SearchRequest,
};
