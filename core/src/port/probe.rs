//! TCP port probes
//!
//! Two checks back the allocator: a reachability probe (live TCP connect,
//! used for the externally pinned override port) and a free-port probe
//! (bind test bounded to a range). Exactly one probe is in flight per
//! allocation call; ranges are tried sequentially, never speculatively.

use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tracing::debug;

use super::PortRange;

const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Probe interface over the OS network stack.
///
/// Production code uses [`TcpProbe`]; tests substitute recording fakes to
/// pin probe order and range boundaries.
#[allow(async_fn_in_trait)]
pub trait PortProbe {
    /// Check whether something is already listening on `port`.
    async fn reachable(&self, port: u16) -> bool;

    /// Find a bindable port within `range` (inclusive).
    ///
    /// A returned candidate was free at check time; the race against a
    /// sibling process binding it first is tolerated, so callers must treat
    /// the result as a strong hint rather than a reservation.
    async fn find_free(&self, range: &PortRange) -> Option<u16>;
}

/// Default probe backed by real TCP connects and bind tests on loopback.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProbe;

impl PortProbe for TcpProbe {
    async fn reachable(&self, port: u16) -> bool {
        let connect = TcpStream::connect(("127.0.0.1", port));
        match tokio::time::timeout(PROBE_TIMEOUT, connect).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!("TCP probe failed for port {}: {}", port, e);
                false
            }
            Err(_) => {
                debug!("TCP probe timed out for port {}", port);
                false
            }
        }
    }

    async fn find_free(&self, range: &PortRange) -> Option<u16> {
        for port in range.start..=range.end {
            if TcpListener::bind(("127.0.0.1", port)).await.is_ok() {
                return Some(port);
            }
        }
        debug!("no free port in range {}-{}", range.start, range.end);
        None
    }
}
