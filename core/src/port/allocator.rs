//! Dev-server port negotiation
//!
//! Allocates one free TCP port per build process. Sibling processes (one
//! per locale) hand in the ports they already claimed; the allocator probes
//! the gaps between claims instead of retrying on conflicts, so it never
//! lands on an address a sibling is likely to contend for.

use serde_json::Value;

use super::probe::{PortProbe, TcpProbe};

/// Lowest port the allocator will ever probe.
pub const PORT_SCAN_FLOOR: u16 = 3000;

/// Highest port the allocator will ever probe.
pub const PORT_SCAN_CEIL: u16 = 65535;

/// Environment variable a parent process sets to pin a child build's port.
pub const DEV_SERVER_PORT_ENV: &str = "ANVIL_DEV_SERVER_PORT";

/// Inclusive range of candidate ports.
///
/// A range with `start > end` is empty and is skipped, never probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    pub fn contains(&self, port: u16) -> bool {
        port >= self.start && port <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// Ports already claimed by sibling build processes.
///
/// Accepts the three shapes the orchestrator produces: a single value, an
/// ordered list, or a mapping whose values may include ports. Values are
/// coerced defensively: numbers pass through, numeric strings parse, and
/// everything else is dropped silently. Input order is preserved because
/// the range-splitting walk below depends on it.
#[derive(Debug, Clone, Default)]
pub enum ClaimedPorts {
    #[default]
    None,
    Single(Value),
    List(Vec<Value>),
    Map(serde_json::Map<String, Value>),
}

impl ClaimedPorts {
    /// Classify a raw JSON document into the matching claim shape.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => ClaimedPorts::List(items),
            Value::Object(map) => ClaimedPorts::Map(map),
            Value::Null => ClaimedPorts::None,
            other => ClaimedPorts::Single(other),
        }
    }

    /// Normalize into the ordered list of claimed port numbers.
    fn into_ports(self) -> Vec<u16> {
        match self {
            ClaimedPorts::None => Vec::new(),
            ClaimedPorts::Single(value) => coerce_port(&value).into_iter().collect(),
            ClaimedPorts::List(items) => items.iter().filter_map(coerce_port).collect(),
            ClaimedPorts::Map(map) => map.values().filter_map(coerce_port).collect(),
        }
    }
}

impl From<u16> for ClaimedPorts {
    fn from(port: u16) -> Self {
        ClaimedPorts::Single(Value::from(port))
    }
}

impl From<Vec<u16>> for ClaimedPorts {
    fn from(ports: Vec<u16>) -> Self {
        ClaimedPorts::List(ports.into_iter().map(Value::from).collect())
    }
}

fn coerce_port(value: &Value) -> Option<u16> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u16>().ok(),
        _ => None,
    }
}

/// Boundary policy for candidate-range construction.
///
/// The historical scheme only probes gaps below and between claimed ports;
/// nothing above the last claim is ever tried. `include_trailing_range`
/// appends the final `[last_claim, 65535]` range so callers can opt into
/// the full scan without changing the default behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocatorPolicy {
    pub include_trailing_range: bool,
}

/// Dev-server port allocator.
///
/// `override_port` short-circuits negotiation entirely when set and
/// currently reachable — a parent process uses it to pin a port for a
/// child build. The override is an explicit field; only [`from_env`]
/// touches the process environment.
///
/// [`from_env`]: PortAllocator::from_env
pub struct PortAllocator<P: PortProbe = TcpProbe> {
    override_port: Option<u16>,
    policy: AllocatorPolicy,
    probe: P,
}

impl PortAllocator<TcpProbe> {
    pub fn new() -> Self {
        Self::with_probe(TcpProbe)
    }

    /// Thin adapter reading the override port from the process environment.
    pub fn from_env() -> Self {
        let override_port = std::env::var(DEV_SERVER_PORT_ENV)
            .ok()
            .and_then(|raw| raw.trim().parse::<u16>().ok());
        Self {
            override_port,
            policy: AllocatorPolicy::default(),
            probe: TcpProbe,
        }
    }
}

impl Default for PortAllocator<TcpProbe> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PortProbe> PortAllocator<P> {
    pub fn with_probe(probe: P) -> Self {
        PortAllocator {
            override_port: None,
            policy: AllocatorPolicy::default(),
            probe,
        }
    }

    pub fn override_port(mut self, port: u16) -> Self {
        self.override_port = Some(port);
        self
    }

    pub fn policy(mut self, policy: AllocatorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Negotiate one free TCP port.
    ///
    /// Returns `None` when every candidate range is exhausted; the caller
    /// decides whether that is fatal. Allocation never fails for malformed
    /// claim input — non-numeric values are dropped during normalization.
    pub async fn allocate(&self, claims: ClaimedPorts) -> Option<u16> {
        if let Some(port) = self.override_port {
            if self.probe.reachable(port).await {
                return Some(port);
            }
        }

        let claimed = claims.into_ports();
        for range in candidate_ranges(&claimed, self.policy) {
            if range.is_empty() {
                continue;
            }
            if let Some(port) = self.probe.find_free(&range).await {
                return Some(port);
            }
        }
        None
    }
}

/// Split the scan interval on the claimed ports, in the order supplied.
///
/// Claims `[4000, 5000]` produce `[3000, 3999]` then `[4000, 4999]`. Each
/// range after the first starts at a claimed port; the bind test inside the
/// probe steps past it. No range above the last claim is emitted unless the
/// policy asks for it.
fn candidate_ranges(claimed: &[u16], policy: AllocatorPolicy) -> Vec<PortRange> {
    if claimed.is_empty() {
        return vec![PortRange {
            start: PORT_SCAN_FLOOR,
            end: PORT_SCAN_CEIL,
        }];
    }

    let mut ranges = Vec::with_capacity(claimed.len() + 1);
    let mut boundary = PORT_SCAN_FLOOR;
    for &port in claimed {
        ranges.push(PortRange {
            start: boundary,
            end: port.saturating_sub(1),
        });
        boundary = port;
    }
    if policy.include_trailing_range {
        ranges.push(PortRange {
            start: boundary,
            end: PORT_SCAN_CEIL,
        });
    }
    ranges
}
