//! Credentials and URI Normalization
//!
//! The remote engine accepts `https`, `http`, `tcp` and `unix` URIs.
//! Operators frequently paste bare `host:port` or `host` values instead,
//! so normalization coerces those to `https://` (the common form for
//! hosted deployments) before anything touches the network.

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// URI schemes the engine client understands.
pub const ACCEPTED_SCHEMES: [&str; 4] = ["https://", "http://", "tcp://", "unix://"];

/// Default database when the caller does not name one.
pub const DEFAULT_DATABASE: &str = "default";

// ============================================================================
// CREDENTIALS
// ============================================================================

/// Connection credentials for the remote engine.
///
/// `uri`, `user` and `password` are mandatory; `database` falls back to
/// [`DEFAULT_DATABASE`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub uri: String,
    pub user: String,
    pub password: String,
    #[serde(default = "default_database")]
    pub database: String,
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

impl Credentials {
    pub fn new(
        uri: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: Option<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            user: user.into(),
            password: password.into(),
            database: database.unwrap_or_else(default_database),
        }
    }

    /// Check the mandatory fields. Cheapest check first: runs before any
    /// network activity so a missing password never costs a DNS lookup.
    pub fn validate(&self) -> Result<()> {
        if self.uri.trim().is_empty() {
            return Err(ClientError::InvalidCredentials("uri"));
        }
        if self.user.trim().is_empty() {
            return Err(ClientError::InvalidCredentials("user"));
        }
        if self.password.trim().is_empty() {
            return Err(ClientError::InvalidCredentials("password"));
        }
        Ok(())
    }

    /// The URI coerced to an accepted scheme.
    pub fn normalized_uri(&self) -> String {
        normalize_uri(&self.uri)
    }
}

// ============================================================================
// URI NORMALIZATION
// ============================================================================

/// Coerce a raw URI into one of the accepted schemes.
///
/// Idempotent: an already-schemed URI is returned unchanged, so
/// `normalize_uri(normalize_uri(u)) == normalize_uri(u)` for any input.
///
/// - `host:port` becomes `https://host:port`
/// - bare `host` becomes `https://host:443`
pub fn normalize_uri(raw: &str) -> String {
    let trimmed = raw.trim();
    if ACCEPTED_SCHEMES
        .iter()
        .any(|scheme| trimmed.starts_with(scheme))
    {
        return trimmed.to_string();
    }
    if trimmed.contains(':') {
        format!("https://{}", trimmed)
    } else {
        format!("https://{}:443", trimmed)
    }
}

// ============================================================================
// ENDPOINT PARSING
// ============================================================================

/// Parsed network endpoint of a normalized URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// Whether this endpoint is reachable via DNS + TCP (unix sockets
    /// skip the network preflight entirely).
    pub fn is_network(&self) -> bool {
        self.scheme != "unix"
    }
}

/// Split a normalized URI into scheme, host and port.
///
/// The port defaults to 443 for `https` and 80 otherwise, matching the
/// engine client's own behavior. Fails only on a structurally empty URI.
pub fn parse_endpoint(uri: &str) -> Result<Endpoint> {
    let normalized = normalize_uri(uri);
    let (scheme, rest) = normalized
        .split_once("://")
        .ok_or(ClientError::InvalidCredentials("uri"))?;

    // Drop any path component; unix URIs keep the whole path as "host".
    let authority = if scheme == "unix" {
        rest
    } else {
        rest.split('/').next().unwrap_or("")
    };
    if authority.is_empty() {
        return Err(ClientError::InvalidCredentials("uri"));
    }

    let default_port = if scheme == "https" { 443 } else { 80 };
    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port_str)) => match port_str.parse::<u16>() {
            Ok(port) => (host, port),
            // Not a numeric port (e.g. part of a unix path)
            Err(_) => (authority, default_port),
        },
        None => (authority, default_port),
    };
    if host.is_empty() {
        return Err(ClientError::InvalidCredentials("uri"));
    }

    Ok(Endpoint {
        scheme: scheme.to_string(),
        host: host.to_string(),
        port,
    })
}

// ============================================================================
// TESTS
// ============================================================================
