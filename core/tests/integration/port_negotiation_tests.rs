// Port negotiation integration tests
//
// These run against the real OS network stack via TcpProbe, so they assert
// invariants rather than exact ports.

use tokio::net::TcpListener;

use anvil_build::{ClaimedPorts, PortAllocator};

#[tokio::test]
async fn negotiates_a_port_in_the_scan_interval() {
    let allocator = PortAllocator::new();

    let port = allocator.allocate(ClaimedPorts::None).await;

    let port = port.expect("a machine with no free port above 3000 cannot run builds");
    assert!((3000..=65535).contains(&port));

    // The returned port is a strong hint, not a reservation, but it was
    // bindable at check time and should still be here.
    assert!(TcpListener::bind(("127.0.0.1", port)).await.is_ok());
}

#[tokio::test]
async fn avoids_a_port_a_sibling_actually_holds() {
    // Hold a port the way a sibling dev server would.
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let held = listener.local_addr().unwrap().port();

    let allocator = PortAllocator::new();
    let port = allocator.allocate(ClaimedPorts::from(held)).await;

    if let Some(port) = port {
        assert_ne!(port, held);
        assert!(port >= 3000 && port < held);
    }
}

#[tokio::test]
async fn reachable_override_returns_exactly_that_port() {
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let pinned = listener.local_addr().unwrap().port();

    let allocator = PortAllocator::new().override_port(pinned);
    let port = allocator.allocate(ClaimedPorts::from(vec![4000u16, 5000])).await;

    assert_eq!(port, Some(pinned));
}

#[tokio::test]
async fn unreachable_override_falls_back_to_negotiation() {
    // Find a port nothing listens on, then drop the listener.
    let free = {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let allocator = PortAllocator::new().override_port(free);
    let port = allocator.allocate(ClaimedPorts::None).await;

    let port = port.expect("negotiation should find some port");
    assert!((3000..=65535).contains(&port));
}
