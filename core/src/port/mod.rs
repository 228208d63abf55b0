/**
 * port module
 * Dev-server port negotiation for concurrent per-locale build processes
 */

pub mod allocator;
pub mod probe;

pub use allocator::{
    AllocatorPolicy, ClaimedPorts, PortAllocator, PortRange, DEV_SERVER_PORT_ENV,
    PORT_SCAN_CEIL, PORT_SCAN_FLOOR,
};
pub use probe::{PortProbe, TcpProbe};
