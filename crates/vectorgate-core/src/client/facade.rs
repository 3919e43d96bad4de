//! Client Facade
//!
//! One facade exclusively owns one underlying connection for its
//! lifetime. The connection is acquired lazily through the
//! [`ConnectionGuard`] on the first operation and released when the
//! facade is dropped. The facade provides no internal locking:
//! concurrent callers need external synchronization or one facade each.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::client::{canonicalize, Connection, DeleteOutcome, InsertOutcome, Record};
use crate::connection::{ConnectionGuard, Credentials, Dialer, GuardConfig};
use crate::error::{ClientError, Result};
use crate::schema::{require_valid_collection_name, CollectionConfig, SchemaBuilder};
use crate::search::{self, SearchHit, SearchRequest};

/// Unified client API over the remote engine: collection lifecycle,
/// mutation, and read operations.
pub struct ClientFacade {
    credentials: Credentials,
    dialer: Arc<dyn Dialer>,
    guard: ConnectionGuard,
    connection: Option<Box<dyn Connection>>,
}

impl ClientFacade {
    /// Build a facade; no network activity happens until the first
    /// operation.
    pub fn new(credentials: Credentials, dialer: Arc<dyn Dialer>) -> Self {
        Self {
            credentials,
            dialer,
            guard: ConnectionGuard::new(),
            connection: None,
        }
    }

    /// Override the preflight/watchdog deadlines.
    pub fn with_guard_config(mut self, config: GuardConfig) -> Self {
        self.guard = ConnectionGuard::with_config(config);
        self
    }

    /// Wrap an already-established connection, skipping the guard
    /// entirely. Used with the in-memory engine in tests.
    pub fn from_connection(credentials: Credentials, connection: Box<dyn Connection>) -> Self {
        let dialer: Arc<dyn Dialer> = Arc::new(|_: &Credentials| -> Result<Box<dyn Connection>> {
            Err(ClientError::Engine(
                "connection failed: facade was built from an existing connection".to_string(),
            ))
        });
        Self {
            credentials,
            dialer,
            guard: ConnectionGuard::new(),
            connection: Some(connection),
        }
    }

    fn connection(&mut self) -> Result<&mut Box<dyn Connection>> {
        if self.connection.is_none() {
            let connection = self
                .guard
                .establish(&self.credentials, Arc::clone(&self.dialer))?;
            self.connection = Some(connection);
        }
        // Populated just above on the None path
        self.connection
            .as_mut()
            .ok_or_else(|| ClientError::Engine("connection failed: no connection".to_string()))
    }

    // ------------------------------------------------------------------
    // Collection lifecycle
    // ------------------------------------------------------------------

    pub fn list_collections(&mut self) -> Result<Vec<String>> {
        self.connection()?.list_collections()
    }

    pub fn has_collection(&mut self, name: &str) -> Result<bool> {
        require_valid_collection_name(name)?;
        self.connection()?.has_collection(name)
    }

    /// Build the schema plan and create collection plus indexes in one
    /// step. Fails if the collection already exists; the facade never
    /// implicitly upserts.
    pub fn create_collection(&mut self, config: &CollectionConfig) -> Result<()> {
        let plan = SchemaBuilder::build(config)?;
        let connection = self.connection()?;
        if connection.has_collection(&plan.name)? {
            return Err(ClientError::invalid(format!(
                "collection '{}' already exists",
                plan.name
            )));
        }
        debug!(collection = %plan.name, fields = plan.fields.len(), "creating collection");
        connection.create_collection(&plan)
    }

    pub fn drop_collection(&mut self, name: &str) -> Result<()> {
        require_valid_collection_name(name)?;
        debug!(collection = %name, "dropping collection");
        self.connection()?.drop_collection(name)
    }

    /// Fully serializable collection description: the engine-native
    /// tree is canonicalized to plain scalars, maps and sequences.
    pub fn describe_collection(&mut self, name: &str) -> Result<Value> {
        require_valid_collection_name(name)?;
        let raw = self.connection()?.describe_collection(name)?;
        Ok(canonicalize(&raw))
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    pub fn insert(&mut self, collection: &str, rows: Vec<Record>) -> Result<InsertOutcome> {
        require_valid_collection_name(collection)?;
        if rows.is_empty() {
            return Err(ClientError::invalid("insert requires at least one record"));
        }
        debug!(collection = %collection, rows = rows.len(), "inserting records");
        self.connection()?.insert(collection, rows)
    }

    /// Delete by filter. An empty or missing filter is rejected before
    /// reaching the network: it would silently delete the whole
    /// collection.
    pub fn delete(&mut self, collection: &str, filter: Option<&str>) -> Result<DeleteOutcome> {
        require_valid_collection_name(collection)?;
        let filter = filter.map(str::trim).filter(|f| !f.is_empty()).ok_or_else(|| {
            ClientError::invalid(
                "delete requires a non-empty filter expression; refusing to delete the whole collection",
            )
        })?;
        debug!(collection = %collection, filter = %filter, "deleting records");
        self.connection()?.delete(collection, filter)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn query(
        &mut self,
        collection: &str,
        filter: &str,
        limit: Option<usize>,
        output_fields: &[String],
    ) -> Result<Vec<Record>> {
        require_valid_collection_name(collection)?;
        self.connection()?
            .query(collection, filter, limit, output_fields)
    }

    /// Unified search entry point: dense, BM25-sparse, or hybrid,
    /// dispatched on the request shape.
    pub fn search(&mut self, request: &SearchRequest) -> Result<Vec<SearchHit>> {
        require_valid_collection_name(&request.collection)?;
        search::dispatch(self.connection()?.as_mut(), request)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MemoryConnection;
    use crate::schema::CollectionConfig;
    use serde_json::json;

    fn facade() -> ClientFacade {
        ClientFacade::from_connection(
            Credentials::new("https://127.0.0.1:19530", "root", "secret", None),
            Box::new(MemoryConnection::new()),
        )
    }

    fn record(pairs: serde_json::Value) -> Record {
        pairs.as_object().unwrap().clone()
    }

    #[test]
    fn test_create_then_duplicate_rejected() {
        let mut facade = facade();
        facade
            .create_collection(&CollectionConfig::dense("docs", 4))
            .unwrap();
        assert!(facade.has_collection("docs").unwrap());

        let err = facade
            .create_collection(&CollectionConfig::dense("docs", 4))
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_delete_filter_is_mandatory() {
        let mut facade = facade();
        facade
            .create_collection(&CollectionConfig::dense("docs", 4))
            .unwrap();

        assert!(facade.delete("docs", None).is_err());
        assert!(facade.delete("docs", Some("")).is_err());
        assert!(facade.delete("docs", Some("   ")).is_err());
        // A real filter proceeds (nothing matches, but the call succeeds)
        assert_eq!(facade.delete("docs", Some("id == 1")).unwrap().deleted_count, 0);
    }

    #[test]
    fn test_invalid_collection_name_rejected_locally() {
        let mut facade = facade();
        assert!(facade.has_collection("bad-name").is_err());
        assert!(facade.drop_collection("123col").is_err());
    }

    #[test]
    fn test_insert_requires_records() {
        let mut facade = facade();
        facade
            .create_collection(&CollectionConfig::dense("docs", 4))
            .unwrap();
        assert!(facade.insert("docs", vec![]).is_err());
    }

    #[test]
    fn test_describe_is_plain_json() {
        let mut facade = facade();
        facade
            .create_collection(&CollectionConfig::dense("docs", 4))
            .unwrap();
        let description = facade.describe_collection("docs").unwrap();
        assert_eq!(description["collection_name"], "docs");
        // Round-trips through serde_json without custom types
        let text = serde_json::to_string(&description).unwrap();
        let _: Value = serde_json::from_str(&text).unwrap();
    }

    #[test]
    fn test_list_collections() {
        let mut facade = facade();
        facade
            .create_collection(&CollectionConfig::dense("beta", 4))
            .unwrap();
        facade
            .create_collection(&CollectionConfig::dense("alpha", 4))
            .unwrap();
        assert_eq!(facade.list_collections().unwrap(), ["alpha", "beta"]);
    }

    #[test]
    fn test_query_by_id() {
        let mut facade = facade();
        facade
            .create_collection(&CollectionConfig::dense("docs", 2))
            .unwrap();
        let outcome = facade
            .insert("docs", vec![record(json!({"vector": [1.0, 0.0], "tag": "a"}))])
            .unwrap();
        let rows = facade
            .query("docs", &format!("id == {}", outcome.ids[0]), None, &[])
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("tag").unwrap(), "a");
    }
}
