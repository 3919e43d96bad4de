//! Provider Credential Validation
//!
//! Validates connector credentials the same way the tools will use
//! them: mandatory fields, URI normalization, preflight, bounded dial,
//! and a cheap list-collections smoke call over the fresh connection.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::info;

use vectorgate_core::{ConnectionGuard, Credentials, Dialer, Result};

use crate::envelope;

pub const OPERATION: &str = "validate_credentials";

/// Establish a guarded connection and run one harmless read.
///
/// Returns the number of visible collections on success; any failure
/// comes back already typed by the guard or classified from the
/// engine.
pub fn validate(credentials: &Credentials, dialer: Arc<dyn Dialer>) -> Result<usize> {
    let guard = ConnectionGuard::new();
    let mut connection = guard.establish(credentials, dialer)?;
    let collections = connection.list_collections()?;
    info!(
        uri = %credentials.normalized_uri(),
        collections = collections.len(),
        "credential validation succeeded"
    );
    Ok(collections.len())
}

/// Envelope-wrapped variant for the dispatch shell.
pub fn validate_to_envelope(credentials: &Credentials, dialer: Arc<dyn Dialer>) -> Value {
    match validate(credentials, dialer) {
        Ok(count) => envelope::success(
            OPERATION,
            json!({
                "uri": credentials.normalized_uri(),
                "database": credentials.database,
                "collection_count": count,
            }),
        ),
        Err(e) => envelope::failure(OPERATION, &e),
    }
}

// ============================================================================
// TESTS
// ============================================================================
