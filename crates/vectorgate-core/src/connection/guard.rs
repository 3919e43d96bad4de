//! Connection Guard
//!
//! Bounded, fail-fast connection establishment. Engine-client
//! construction failures are often an opaque "connection error" that is
//! indistinguishable from a DNS or routing problem, so the guard runs
//! cheap, separately-diagnosable preflight checks first:
//!
//! 1. credential validation (no network)
//! 2. URI normalization (no network)
//! 3. DNS resolution, bounded to 3 seconds
//! 4. TCP connect-and-drop probe, bounded to 3 seconds
//! 5. the actual dial, bounded by a hard 8 second watchdog deadline
//!
//! The watchdog exists because the underlying handshake has been
//! observed to hang indefinitely under some network conditions; the
//! dial runs on a helper thread and the caller unblocks at the deadline
//! whether or not the callee cooperates. An abandoned dial keeps its
//! result to itself and exits silently.

use std::net::{IpAddr, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError};
use tracing::{debug, info, warn};

use crate::client::Connection;
use crate::connection::credentials::{parse_endpoint, Credentials, Endpoint};
use crate::error::{ClientError, Result};

/// DNS resolution deadline.
pub const DNS_TIMEOUT: Duration = Duration::from_secs(3);

/// TCP reachability probe deadline.
pub const TCP_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Hard wall-clock deadline for the dial call. Independent of whatever
/// timeout handling the underlying client library has.
pub const HANDSHAKE_DEADLINE: Duration = Duration::from_secs(8);

// ============================================================================
// DIALER SEAM
// ============================================================================

/// Produces a live [`Connection`] from validated credentials.
///
/// A remote-engine binding is one implementation; test code injects a
/// dialer returning the in-memory engine. The dial runs on a watchdog
/// thread, hence `Send + Sync + 'static`.
pub trait Dialer: Send + Sync + 'static {
    fn dial(&self, credentials: &Credentials) -> Result<Box<dyn Connection>>;
}

impl<F> Dialer for F
where
    F: Fn(&Credentials) -> Result<Box<dyn Connection>> + Send + Sync + 'static,
{
    fn dial(&self, credentials: &Credentials) -> Result<Box<dyn Connection>> {
        self(credentials)
    }
}

// ============================================================================
// GUARD CONFIGURATION
// ============================================================================

/// Stage deadlines for connection establishment.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub dns_timeout: Duration,
    pub tcp_timeout: Duration,
    pub handshake_deadline: Duration,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            dns_timeout: DNS_TIMEOUT,
            tcp_timeout: TCP_PROBE_TIMEOUT,
            handshake_deadline: HANDSHAKE_DEADLINE,
        }
    }
}

// ============================================================================
// CONNECTION GUARD
// ============================================================================

/// Runs the preflight protocol and the watchdog-bounded dial.
pub struct ConnectionGuard {
    config: GuardConfig,
}

impl Default for ConnectionGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionGuard {
    pub fn new() -> Self {
        Self {
            config: GuardConfig::default(),
        }
    }

    pub fn with_config(config: GuardConfig) -> Self {
        Self { config }
    }

    /// Establish a connection, failing fast with a typed error at the
    /// first stage that cannot succeed.
    pub fn establish(
        &self,
        credentials: &Credentials,
        dialer: Arc<dyn Dialer>,
    ) -> Result<Box<dyn Connection>> {
        credentials.validate()?;

        let uri = credentials.normalized_uri();
        let endpoint = parse_endpoint(&uri)?;
        debug!(
            scheme = %endpoint.scheme,
            host = %endpoint.host,
            port = endpoint.port,
            "starting connection preflight"
        );

        if endpoint.is_network() {
            let ip = self.resolve(&endpoint)?;
            self.probe(&endpoint, ip)?;
        }

        let mut dial_credentials = credentials.clone();
        dial_credentials.uri = uri;
        self.dial_with_watchdog(&dial_credentials, dialer)
    }

    /// Resolve the hostname on a helper thread so the caller unblocks
    /// at the deadline even if the resolver stalls.
    fn resolve(&self, endpoint: &Endpoint) -> Result<IpAddr> {
        let (tx, rx) = bounded(1);
        let host = endpoint.host.clone();
        let port = endpoint.port;
        let spawned = thread::Builder::new()
            .name("vectorgate-dns".to_string())
            .spawn(move || {
                let resolved = (host.as_str(), port)
                    .to_socket_addrs()
                    .map(|mut addrs| addrs.next());
                let _ = tx.send(resolved);
            });
        if spawned.is_err() {
            return Err(ClientError::Engine(
                "connection failed: could not spawn resolver thread".to_string(),
            ));
        }

        let failure = |detail: String| ClientError::DnsFailure {
            hostname: endpoint.host.clone(),
            detail,
        };
        match rx.recv_timeout(self.config.dns_timeout) {
            Ok(Ok(Some(addr))) => {
                debug!(host = %endpoint.host, ip = %addr.ip(), "DNS resolution succeeded");
                Ok(addr.ip())
            }
            Ok(Ok(None)) => Err(failure("no addresses returned".to_string())),
            Ok(Err(e)) => Err(failure(e.to_string())),
            Err(_) => {
                warn!(host = %endpoint.host, "DNS resolution timed out");
                Err(failure(format!(
                    "resolution timed out after {:?}",
                    self.config.dns_timeout
                )))
            }
        }
    }

    /// Open and immediately drop a TCP connection to the resolved
    /// address. The stream is closed on every exit path by scope.
    fn probe(&self, endpoint: &Endpoint, ip: IpAddr) -> Result<()> {
        let address = SocketAddr::new(ip, endpoint.port);
        match TcpStream::connect_timeout(&address, self.config.tcp_timeout) {
            Ok(stream) => {
                debug!(%address, "TCP probe succeeded");
                drop(stream);
                Ok(())
            }
            Err(e) => {
                warn!(%address, error = %e, "TCP probe failed");
                Err(ClientError::TcpFailure {
                    address: address.to_string(),
                    code: e.raw_os_error().unwrap_or(-1),
                })
            }
        }
    }

    /// Run the dial under a watchdog. The deadline fires even if the
    /// dial never returns; the watchdog is disarmed on both the success
    /// and failure paths simply by the rendezvous completing.
    fn dial_with_watchdog(
        &self,
        credentials: &Credentials,
        dialer: Arc<dyn Dialer>,
    ) -> Result<Box<dyn Connection>> {
        let (tx, rx) = bounded(1);
        let dial_credentials = credentials.clone();
        let spawned = thread::Builder::new()
            .name("vectorgate-dial".to_string())
            .spawn(move || {
                let result = dialer.dial(&dial_credentials);
                // Receiver may already have given up; drop the result then.
                let _ = tx.send(result);
            });
        if spawned.is_err() {
            return Err(ClientError::Engine(
                "connection failed: could not spawn dial thread".to_string(),
            ));
        }

        match rx.recv_timeout(self.config.handshake_deadline) {
            Ok(Ok(connection)) => {
                info!(uri = %credentials.uri, "engine connection established");
                Ok(connection)
            }
            Ok(Err(e)) => Err(e),
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    uri = %credentials.uri,
                    deadline = ?self.config.handshake_deadline,
                    "handshake watchdog fired, abandoning dial"
                );
                Err(ClientError::HandshakeTimeout(self.config.handshake_deadline))
            }
            Err(RecvTimeoutError::Disconnected) => Err(ClientError::Engine(
                "connection failed: dial worker terminated unexpectedly".to_string(),
            )),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MemoryConnection;
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingDialer {
        calls: Arc<AtomicUsize>,
    }

    impl Dialer for CountingDialer {
        fn dial(&self, _credentials: &Credentials) -> Result<Box<dyn Connection>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(MemoryConnection::new()))
        }
    }

    fn local_credentials(port: u16) -> Credentials {
        Credentials::new(format!("http://127.0.0.1:{}", port), "root", "secret", None)
    }

    #[test]
    fn test_missing_credentials_fail_before_dial() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dialer = Arc::new(CountingDialer {
            calls: Arc::clone(&calls),
        });
        let guard = ConnectionGuard::new();

        for creds in [
            Credentials::new("", "root", "secret", None),
            Credentials::new("https://h:1", "", "secret", None),
            Credentials::new("https://h:1", "root", "", None),
        ] {
            let err = guard.establish(&creds, Arc::clone(&dialer) as Arc<dyn Dialer>);
            assert!(matches!(err, Err(ClientError::InvalidCredentials(_))));
        }
        // No preflight and no dial happened for any of them
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_establish_against_listening_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let calls = Arc::new(AtomicUsize::new(0));
        let dialer = Arc::new(CountingDialer {
            calls: Arc::clone(&calls),
        });
        let guard = ConnectionGuard::new();
        let connection = guard.establish(&local_credentials(port), dialer);
        assert!(connection.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_tcp_probe_failure_on_closed_port() {
        // Bind to get a free port, then release it before probing.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let dialer: Arc<dyn Dialer> = Arc::new(|_: &Credentials| -> Result<Box<dyn Connection>> {
            panic!("dial must not run after a failed probe")
        });
        let guard = ConnectionGuard::new();
        let err = guard.establish(&local_credentials(port), dialer);
        assert!(matches!(err, Err(ClientError::TcpFailure { .. })));
    }

    #[test]
    fn test_dns_failure_for_unresolvable_host() {
        let creds = Credentials::new(
            "https://unresolvable-host.invalid:443",
            "root",
            "secret",
            None,
        );
        let dialer: Arc<dyn Dialer> = Arc::new(|_: &Credentials| -> Result<Box<dyn Connection>> {
            panic!("dial must not run after a failed resolution")
        });
        let guard = ConnectionGuard::new();
        match guard.establish(&creds, dialer) {
            Err(ClientError::DnsFailure { hostname, .. }) => {
                assert_eq!(hostname, "unresolvable-host.invalid");
            }
            other => panic!("expected DnsFailure, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_watchdog_fires_on_stalled_dial() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let dialer: Arc<dyn Dialer> = Arc::new(|_: &Credentials| -> Result<Box<dyn Connection>> {
            // Simulate a hung handshake well past the test deadline
            thread::sleep(Duration::from_secs(2));
            Ok(Box::new(MemoryConnection::new()))
        });
        let guard = ConnectionGuard::with_config(GuardConfig {
            handshake_deadline: Duration::from_millis(100),
            ..GuardConfig::default()
        });
        let started = std::time::Instant::now();
        let err = guard.establish(&local_credentials(port), dialer);
        assert!(matches!(err, Err(ClientError::HandshakeTimeout(_))));
        // Caller unblocked at the deadline, not after the dial finished
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_watchdog_disarmed_after_fast_dial_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let dialer: Arc<dyn Dialer> = Arc::new(|_: &Credentials| -> Result<Box<dyn Connection>> {
            Err(ClientError::Engine("handshake failed: bad token".to_string()))
        });
        let guard = ConnectionGuard::new();
        let started = std::time::Instant::now();
        let err = guard.establish(&local_credentials(port), dialer);
        assert!(matches!(err, Err(ClientError::Engine(_))));
        // Failure surfaced immediately rather than waiting out the deadline
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
