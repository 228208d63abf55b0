/**
 * config.rs
 * Shared build configuration (.anvilbuild, YAML format) and per-build target
 *
 * Format:
 * ```yaml
 * serviceWorker:
 *   filename: service-worker.js
 *   include: []
 *   exclude: []
 * distClientAssetsDirName: assets
 * baseVersion: 0.12.3
 * ```
 *
 * `serviceWorker` also accepts plain booleans: `false` opts out of worker
 * generation entirely, `true` (or omitting the key) means all defaults.
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{BuildError, Result};

/// Public-path prefix the dev server serves client assets under.
pub const DEV_PUBLIC_PATH_PREFIX: &str = "dist";

/// Fixed worker filename in dev, so a long-lived dev server can reference a
/// stable path across rebuilds.
pub const DEV_SERVICE_WORKER_FILENAME: &str = "service-worker.js";

/// Base versions below this threshold keep the legacy cache name.
pub const LEGACY_NAMING_THRESHOLD: &str = "0.12.0";

/// Build environment, passed by value through every decision that branches
/// on it. The core never reads it from ambient process state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

impl Environment {
    pub fn is_dev(self) -> bool {
        self == Environment::Dev
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Dev => write!(f, "dev"),
            Environment::Prod => write!(f, "prod"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            other => Err(BuildError::InvalidEnvironment(other.to_string())),
        }
    }
}

/// Service-worker options merged over built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceWorkerOptions {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sw_src: Option<PathBuf>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for ServiceWorkerOptions {
    fn default() -> Self {
        ServiceWorkerOptions {
            filename: DEV_SERVICE_WORKER_FILENAME.to_string(),
            sw_src: None,
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

/// `serviceWorker` configuration key: a plain toggle or an options table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ServiceWorkerSetting {
    Toggle(bool),
    Options(ServiceWorkerOptions),
}

impl Default for ServiceWorkerSetting {
    fn default() -> Self {
        ServiceWorkerSetting::Toggle(true)
    }
}

/// Shared build configuration read by the orchestrator and both core
/// components. `client_service_worker_pathname` is written back by the
/// worker builder for downstream consumers such as HTML injection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    #[serde(default)]
    pub service_worker: ServiceWorkerSetting,
    #[serde(default = "default_assets_dir_name")]
    pub dist_client_assets_dir_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_service_worker_pathname: Option<String>,
}

fn default_assets_dir_name() -> String {
    "assets".to_string()
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            service_worker: ServiceWorkerSetting::default(),
            dist_client_assets_dir_name: default_assets_dir_name(),
            base_version: None,
            client_service_worker_pathname: None,
        }
    }
}

impl BuildConfig {
    /// Load from a `.anvilbuild` YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BuildError::ConfigMissing);
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Build from an in-memory JSON document handed over by the
    /// orchestrator. A null document means the build was invoked without
    /// any configuration, which is fatal.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        if value.is_null() {
            return Err(BuildError::ConfigMissing);
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Resolved worker options, or `None` when generation is opted out.
    pub fn service_worker_options(&self) -> Option<ServiceWorkerOptions> {
        match &self.service_worker {
            ServiceWorkerSetting::Toggle(false) => None,
            ServiceWorkerSetting::Toggle(true) => Some(ServiceWorkerOptions::default()),
            ServiceWorkerSetting::Options(options) => Some(options.clone()),
        }
    }
}

/// One build output: environment, locale, and the asset metadata the worker
/// bootstrap needs. Constructed once per build invocation; immutable for
/// the duration of manifest generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    pub environment: Environment,
    pub locale_id: Option<String>,
    pub base_version: Option<String>,
    pub assets_dir_name: String,
}

impl BuildTarget {
    pub fn from_config(
        environment: Environment,
        locale_id: Option<String>,
        config: &BuildConfig,
    ) -> Self {
        BuildTarget {
            environment,
            locale_id,
            base_version: config.base_version.clone(),
            assets_dir_name: config.dist_client_assets_dir_name.clone(),
        }
    }
}
