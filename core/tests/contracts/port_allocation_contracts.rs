// Port Negotiation Contract Tests
//
// These tests verify INVARIANTS that MUST NEVER BREAK regardless of
// implementation. They document WHY the negotiation scheme behaves the way
// it does, so a refactor cannot silently change the protocol.

use std::sync::Mutex;

use anvil_build::{AllocatorPolicy, ClaimedPorts, PortAllocator, PortProbe, PortRange};

/// Fake probe recording every range it is asked about, answering from a
/// scripted queue.
struct ScriptedProbe {
    reachable_ports: Vec<u16>,
    answers: Mutex<Vec<Option<u16>>>,
    seen: Mutex<Vec<PortRange>>,
}

impl ScriptedProbe {
    fn new(answers: Vec<Option<u16>>) -> Self {
        ScriptedProbe {
            reachable_ports: Vec::new(),
            answers: Mutex::new(answers),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<PortRange> {
        self.seen.lock().unwrap().clone()
    }
}

impl PortProbe for &ScriptedProbe {
    async fn reachable(&self, port: u16) -> bool {
        self.reachable_ports.contains(&port)
    }

    async fn find_free(&self, range: &PortRange) -> Option<u16> {
        self.seen.lock().unwrap().push(range.clone());
        let mut answers = self.answers.lock().unwrap();
        if answers.is_empty() {
            None
        } else {
            answers.remove(0)
        }
    }
}

/// WHY: The scan interval is fixed at [3000, 65535]
/// REASON: Ports below 3000 collide with privileged/system services
/// BREAKS: Dev servers landing on well-known ports if changed
#[tokio::test]
async fn scan_interval_invariant() {
    let probe = ScriptedProbe::new(vec![Some(3000)]);
    let allocator = PortAllocator::with_probe(&probe);

    allocator.allocate(ClaimedPorts::None).await;

    assert_eq!(
        probe.seen(),
        vec![PortRange { start: 3000, end: 65535 }]
    );
}

/// WHY: Claims [4000, 5000] probe [3000, 3999] then [4000, 4999], nothing above
/// REASON: The scheme probes gaps below and between claims, never above the
///         last one; this boundary policy is observable behavior other
///         orchestration layers rely on
/// BREAKS: Port placement of every multi-locale dev setup if changed
#[tokio::test]
async fn boundary_policy_invariant() {
    let probe = ScriptedProbe::new(vec![None, None]);
    let allocator = PortAllocator::with_probe(&probe);

    let port = allocator
        .allocate(ClaimedPorts::from(vec![4000u16, 5000]))
        .await;

    assert_eq!(port, None);
    assert_eq!(
        probe.seen(),
        vec![
            PortRange { start: 3000, end: 3999 },
            PortRange { start: 4000, end: 4999 },
        ]
    );

    // If this test fails, ask yourself:
    // "Did I append a trailing range without the policy switch?"
    // "Every caller that wants the full scan sets include_trailing_range."
}

/// WHY: The trailing range is opt-in, default off
/// REASON: Preserves the historical boundary policy while letting callers
///         pin either behavior explicitly
/// BREAKS: Default behavior compatibility if flipped
#[tokio::test]
async fn trailing_range_is_opt_in() {
    let probe = ScriptedProbe::new(vec![None, None, Some(5001)]);
    let allocator = PortAllocator::with_probe(&probe).policy(AllocatorPolicy {
        include_trailing_range: true,
    });

    let port = allocator
        .allocate(ClaimedPorts::from(vec![4000u16, 5000]))
        .await;

    assert_eq!(port, Some(5001));
    assert_eq!(
        probe.seen().last(),
        Some(&PortRange { start: 5000, end: 65535 })
    );
    assert_eq!(AllocatorPolicy::default().include_trailing_range, false);
}

/// WHY: A returned port is never a claimed port and lies in [3000, 65535]
/// REASON: The entire point of negotiation is avoiding sibling processes
/// BREAKS: Concurrent per-locale builds would race for the same port
#[tokio::test]
async fn allocated_port_avoids_claims() {
    for claims in [vec![4000u16], vec![4000, 5000], vec![3500, 3501, 3502]] {
        // Script each range to answer with its own start port.
        let probe = ScriptedProbe::new(vec![Some(3000); claims.len()]);
        let allocator = PortAllocator::with_probe(&probe);

        if let Some(port) = allocator.allocate(ClaimedPorts::from(claims.clone())).await {
            assert!(!claims.contains(&port), "allocated a claimed port");
            assert!((3000..=65535).contains(&port));
        }
    }
}

/// WHY: Exhaustion is a value, never an error
/// REASON: The caller decides whether a missing port is fatal
/// BREAKS: Orchestrator error handling if this starts panicking or erroring
#[tokio::test]
async fn exhaustion_is_a_value() {
    let probe = ScriptedProbe::new(vec![]);
    let allocator = PortAllocator::with_probe(&probe);

    let port = allocator.allocate(ClaimedPorts::from(3000u16)).await;

    assert_eq!(port, None);
}

/// WHY: A reachable override port wins over any claimed-port input
/// REASON: A parent process pins ports for child builds and skips
///         negotiation entirely
/// BREAKS: Parent/child port coordination if the override stops winning
#[tokio::test]
async fn reachable_override_wins() {
    let probe = ScriptedProbe {
        reachable_ports: vec![9999],
        answers: Mutex::new(vec![Some(3000)]),
        seen: Mutex::new(Vec::new()),
    };
    let allocator = PortAllocator::with_probe(&probe).override_port(9999);

    let port = allocator
        .allocate(ClaimedPorts::from(vec![4000u16, 9999]))
        .await;

    assert_eq!(port, Some(9999));
    assert!(probe.seen().is_empty());
}

/// WHY: Malformed claim values are dropped, never fatal
/// REASON: Claim sets are scraped from heterogeneous orchestrator state;
///         a stray string must not abort dev-server startup
/// BREAKS: Dev-server startup robustness
#[tokio::test]
async fn malformed_claims_never_abort() {
    let probe = ScriptedProbe::new(vec![Some(3000)]);
    let allocator = PortAllocator::with_probe(&probe);

    let claims = ClaimedPorts::from_value(serde_json::json!({
        "spa": "4000",
        "note": "not a port",
        "flag": false,
        "fr": 5000
    }));
    let port = allocator.allocate(claims).await;

    assert_eq!(port, Some(3000));
    assert_eq!(
        probe.seen(),
        vec![
            PortRange { start: 3000, end: 3999 },
            PortRange { start: 4000, end: 4999 },
        ]
    );
}
