//! Connection Establishment
//!
//! Credentials, URI normalization, and the bounded fail-fast preflight
//! protocol (DNS, TCP probe, watchdog-guarded dial).

pub mod credentials;
pub mod guard;

pub use credentials::{
    normalize_uri, parse_endpoint, Credentials, Endpoint, ACCEPTED_SCHEMES, DEFAULT_DATABASE,
};
pub use guard::{
    ConnectionGuard, Dialer, GuardConfig, DNS_TIMEOUT, HANDSHAKE_DEADLINE, TCP_PROBE_TIMEOUT,
};
