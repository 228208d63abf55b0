//! Project module — shared build configuration
//!
//! Hosts the `.anvilbuild` configuration parser and the per-build target
//! value the orchestrator constructs for each (environment, locale) pair.

pub mod config;

pub use config::{
    BuildConfig, BuildTarget, Environment, ServiceWorkerOptions, ServiceWorkerSetting,
    DEV_PUBLIC_PATH_PREFIX, DEV_SERVICE_WORKER_FILENAME, LEGACY_NAMING_THRESHOLD,
};
