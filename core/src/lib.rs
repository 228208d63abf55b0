//! # Anvil Build Core
//!
//! Build-orchestration core for the Anvil web framework. Two independently
//! usable components, composed by the build orchestrator:
//!
//! - **Port negotiation** ([`port`]): allocate a non-conflicting TCP port for
//!   a dev-server instance, avoiding ports already claimed by sibling build
//!   processes (one process per locale is the common case).
//! - **Offline-worker artifacts** ([`worker`]): stage the browser-side
//!   caching worker for one build target, embedding environment- and
//!   locale-specific metadata and the request-routing rules the worker
//!   applies at runtime.
//!
//! ## Key Properties
//!
//! - Port exhaustion is a value (`None`), never an error; malformed claimed
//!   port inputs are coerced or dropped, never fatal.
//! - One build invocation, one artifact: worker staging is deterministic per
//!   `(environment, locale)` and concurrent locales never share temp files.
//! - dev/prod branching flows through an explicit [`project::Environment`]
//!   value; the core never reads ambient process state.

pub mod errors;
pub mod port;
pub mod project;
pub mod worker;

pub use errors::{BuildError, Result};
pub use port::{AllocatorPolicy, ClaimedPorts, PortAllocator, PortProbe, PortRange, TcpProbe};
pub use project::{
    BuildConfig, BuildTarget, Environment, ServiceWorkerOptions, ServiceWorkerSetting,
};
pub use worker::{
    build_worker_artifact, Bootstrap, ImportMode, RoutePattern, RouteRule, Strategy,
    WorkerArtifact,
};
