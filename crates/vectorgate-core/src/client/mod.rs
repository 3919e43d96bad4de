//! Engine Connection Seam
//!
//! The [`Connection`] trait is the seam between the facade and any
//! concrete engine binding. A remote gRPC binding is one
//! implementation; [`MemoryConnection`] is a deterministic in-memory
//! one that lets the entire facade be exercised without a live service.

pub mod canonical;
pub mod facade;
pub mod memory;

pub use canonical::{canonicalize, RawValue, MAX_CANONICAL_DEPTH, MAX_CANONICAL_NODES};
pub use facade::ClientFacade;
pub use memory::MemoryConnection;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::CollectionPlan;

/// A single row: field name to JSON value.
pub type Record = serde_json::Map<String, serde_json::Value>;

// ============================================================================
// OPERATION RESULTS
// ============================================================================

/// Outcome of an insert call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertOutcome {
    pub inserted_count: usize,
    pub ids: Vec<i64>,
}

/// Outcome of a delete call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub deleted_count: usize,
}

/// One raw hit as returned by the engine, before dispatcher
/// normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawHit {
    pub id: i64,
    pub score: f32,
    pub entity: Record,
}

// ============================================================================
// RAW SEARCH REQUEST
// ============================================================================

/// Payload for one ANN search primitive. Dense queries carry vectors;
/// sparse queries carry raw text that the engine tokenizes server-side.
#[derive(Debug, Clone)]
pub enum SearchData {
    Vectors(Vec<Vec<f32>>),
    Text(String),
}

/// A single search primitive call against one vector-bearing field.
#[derive(Debug, Clone)]
pub struct RawSearch {
    pub anns_field: String,
    pub data: SearchData,
    pub limit: usize,
    pub output_fields: Vec<String>,
    pub filter: Option<String>,
}

// ============================================================================
// CONNECTION TRAIT
// ============================================================================

/// The operation set a concrete engine binding must provide.
///
/// One connection is exclusively owned by one facade for its lifetime;
/// the facade provides no internal locking, so implementations may
/// assume single-caller access (hence `&mut self`).
pub trait Connection: Send {
    fn list_collections(&mut self) -> Result<Vec<String>>;

    fn has_collection(&mut self, name: &str) -> Result<bool>;

    /// Create the collection together with its indexes; index creation
    /// is not a separate lifecycle step.
    fn create_collection(&mut self, plan: &CollectionPlan) -> Result<()>;

    fn drop_collection(&mut self, name: &str) -> Result<()>;

    /// Engine-native description tree; the facade canonicalizes it.
    fn describe_collection(&mut self, name: &str) -> Result<RawValue>;

    fn insert(&mut self, collection: &str, rows: Vec<Record>) -> Result<InsertOutcome>;

    fn query(
        &mut self,
        collection: &str,
        filter: &str,
        limit: Option<usize>,
        output_fields: &[String],
    ) -> Result<Vec<Record>>;

    fn delete(&mut self, collection: &str, filter: &str) -> Result<DeleteOutcome>;

    /// One result group per query vector (a text query is one group).
    fn search(&mut self, collection: &str, request: &RawSearch) -> Result<Vec<Vec<RawHit>>>;
}
