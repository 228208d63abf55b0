//! Worker module — offline cache manifest generation
//!
//! Produces the per-build service-worker artifact: a bootstrap preamble
//! embedding build metadata into the worker's global scope, the fixed
//! request-routing table, and the artifact descriptor the bundler's
//! asset-injection plugin consumes.

pub mod builder;
pub mod routes;
pub mod template;

pub use builder::{
    build_worker_artifact, locale_qualified_filename, ImportMode, WorkerArtifact,
    SW_IMPORTS_DIRNAME,
};
pub use routes::{
    apex_host, cache_name_details, match_request, route_rules, CacheNameDetails, RoutePattern,
    RouteRule, Strategy, LEGACY_CACHE_NAME,
};
pub use template::{
    legacy_cache_naming, render_preamble, render_template, Bootstrap, BootstrapEnv,
    ASSETS_DIRNAME_PLACEHOLDER, WORKER_GLOBAL, WORKER_TEMPLATE,
};
