//! Error Taxonomy and Classifier
//!
//! Every failure surfaced by the facade is reduced to a small set of
//! actionable kinds. Raw engine and network errors arrive as free-form
//! text, so classification is substring-based and deterministic: the
//! first matching rule in priority order wins.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, ClientError>;

// ============================================================================
// ERROR KINDS
// ============================================================================

/// The taxonomy of actionable failure categories.
///
/// Derived per call from the raw failure, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// A mandatory credential field is missing or empty
    InvalidCredentials,
    /// Hostname did not resolve within the DNS deadline
    DnsFailure,
    /// TCP reachability probe failed
    TcpFailure,
    /// Client handshake exceeded its hard wall-clock deadline
    HandshakeTimeout,
    /// Engine rejected the credentials or the connection key
    AuthenticationFailure,
    /// Generic connectivity problem (unreachable service, transport timeout)
    ConnectionFailure,
    /// Engine denied the operation
    PermissionDenied,
    /// Collection or other named resource does not exist
    ResourceNotFound,
    /// Anything the classifier could not place
    Unknown,
}

impl ErrorKind {
    /// Stable name used in response envelopes (`error_type`).
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::InvalidCredentials => "InvalidCredentials",
            ErrorKind::DnsFailure => "DnsFailure",
            ErrorKind::TcpFailure => "TcpFailure",
            ErrorKind::HandshakeTimeout => "HandshakeTimeout",
            ErrorKind::AuthenticationFailure => "AuthenticationError",
            ErrorKind::ConnectionFailure => "ConnectionError",
            ErrorKind::PermissionDenied => "PermissionError",
            ErrorKind::ResourceNotFound => "ResourceNotFoundError",
            ErrorKind::Unknown => "UnknownError",
        }
    }

    /// Actionable next step for the operator, keyed on the kind.
    pub fn suggestion(&self) -> &'static str {
        match self {
            ErrorKind::InvalidCredentials => {
                "Provide uri, user and password in the connector credentials"
            }
            ErrorKind::DnsFailure => "Check the hostname in the URI and your DNS configuration",
            ErrorKind::TcpFailure => {
                "Check that the service is listening on the target port and reachable from this host"
            }
            ErrorKind::HandshakeTimeout => {
                "The endpoint accepted a TCP connection but the handshake stalled; verify the scheme and port match the service"
            }
            ErrorKind::AuthenticationFailure => {
                "Check that the username and password are valid and the connection key has not expired"
            }
            ErrorKind::ConnectionFailure => "Verify network connectivity and service availability",
            ErrorKind::PermissionDenied => {
                "Check the granted permissions for this user or contact an administrator"
            }
            ErrorKind::ResourceNotFound => "Verify the resource name and ensure it exists",
            ErrorKind::Unknown => "Check the input parameters and try again",
        }
    }
}

// ============================================================================
// CLIENT ERROR
// ============================================================================

/// Unified error type for all facade operations.
#[non_exhaustive]
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// A mandatory credential field is missing or empty
    #[error("missing credential field: {0}")]
    InvalidCredentials(&'static str),

    /// Local validation failure (collection name, dimension, filter safety).
    /// Rejected before any network activity.
    #[error("{0}")]
    InvalidArgument(String),

    /// Hostname resolution failed or timed out
    #[error("cannot resolve hostname {hostname}: {detail}")]
    DnsFailure { hostname: String, detail: String },

    /// TCP probe could not reach the endpoint
    #[error("cannot connect to {address}: os error {code}")]
    TcpFailure { address: String, code: i32 },

    /// The dial call did not complete before the watchdog deadline
    #[error("client handshake timed out after {0:?}")]
    HandshakeTimeout(Duration),

    /// Raw failure text from the remote engine or its transport.
    /// Classified on the way out, never swallowed.
    #[error("{0}")]
    Engine(String),

    /// Named resource is known to be absent (checked client-side)
    #[error("{kind} '{name}' does not exist")]
    NotFound { kind: &'static str, name: String },
}

impl ClientError {
    /// Convenience constructor for local validation failures.
    pub fn invalid(msg: impl Into<String>) -> Self {
        ClientError::InvalidArgument(msg.into())
    }

    /// Reduce this error to its taxonomy kind.
    ///
    /// Structured variants map directly; engine text goes through
    /// [`classify`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::InvalidCredentials(_) => ErrorKind::InvalidCredentials,
            ClientError::InvalidArgument(_) => ErrorKind::Unknown,
            ClientError::DnsFailure { .. } => ErrorKind::DnsFailure,
            ClientError::TcpFailure { .. } => ErrorKind::TcpFailure,
            ClientError::HandshakeTimeout(_) => ErrorKind::HandshakeTimeout,
            ClientError::Engine(msg) => classify(msg),
            ClientError::NotFound { .. } => ErrorKind::ResourceNotFound,
        }
    }

    /// Envelope-facing type name.
    ///
    /// Falls back to the variant's own name when the classifier has
    /// nothing better to offer, so an unknown engine message still
    /// reports where it came from.
    pub fn error_type(&self) -> &'static str {
        match self {
            ClientError::InvalidArgument(_) => "InvalidArgument",
            ClientError::Engine(msg) => match classify(msg) {
                ErrorKind::Unknown => "EngineError",
                kind => kind.name(),
            },
            other => other.kind().name(),
        }
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

/// Classify raw failure text into an [`ErrorKind`].
///
/// Case-insensitive substring matching in priority order; the first
/// match wins. Identical input always produces identical output.
pub fn classify(raw: &str) -> ErrorKind {
    let lowered = raw.to_lowercase();
    if lowered.contains("permission denied") {
        ErrorKind::PermissionDenied
    } else if lowered.contains("handshake failed")
        || lowered.contains("invalid key")
        || lowered.contains("auth")
    {
        ErrorKind::AuthenticationFailure
    } else if lowered.contains("connection") || lowered.contains("timeout") {
        ErrorKind::ConnectionFailure
    } else if lowered.contains("not found") || lowered.contains("does not exist") {
        ErrorKind::ResourceNotFound
    } else {
        ErrorKind::Unknown
    }
}

/// Render an operation-scoped failure message: `"<operation> failed: <detail>"`.
pub fn operation_message(operation: &str, error: &ClientError) -> String {
    format!("{} failed: {}", operation, error)
}

// ============================================================================
// TESTS
// ============================================================================
