//! Worker template staging
//!
//! The browser-side worker has no module loader; every piece of build
//! metadata it needs is inlined ahead of the base template as one global
//! object assignment (`self.__anvil = { ... }`). The base template carries
//! the fixed routing table and reads those globals at runtime.

use semver::Version;
use serde::Serialize;

use crate::errors::{BuildError, Result};
use crate::project::config::{
    BuildTarget, Environment, DEV_PUBLIC_PATH_PREFIX, LEGACY_NAMING_THRESHOLD,
};

/// Base worker template shipped with the crate.
pub const WORKER_TEMPLATE: &str = include_str!("worker-template.js");

/// Placeholder token substituted with the real assets directory name.
pub const ASSETS_DIRNAME_PLACEHOLDER: &str = "__DIST_CLIENT_ASSETS_DIRNAME__";

/// Global the preamble assigns. Downstream worker code reads it by name.
pub const WORKER_GLOBAL: &str = "self.__anvil";

/// Bootstrap metadata embedded into the worker's global scope.
///
/// Key names are wire format — the worker reads them by exact name, so any
/// renaming is a breaking change.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Bootstrap {
    #[serde(rename = "assetsDirName")]
    pub assets_dir_name: String,
    #[serde(rename = "__baseVersion_lt_0.12")]
    pub legacy_cache_naming: bool,
    pub env: BootstrapEnv,
    #[serde(rename = "localeId", skip_serializing_if = "Option::is_none")]
    pub locale_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BootstrapEnv {
    #[serde(rename = "BUILD_ENV")]
    pub build_env: Environment,
}

impl Bootstrap {
    /// In dev the worker sees the dev server's public-path prefix; in any
    /// other environment it sees the real hashed assets directory name.
    pub fn for_target(target: &BuildTarget) -> Self {
        let assets_dir_name = if target.environment.is_dev() {
            DEV_PUBLIC_PATH_PREFIX.to_string()
        } else {
            target.assets_dir_name.clone()
        };
        Bootstrap {
            assets_dir_name,
            legacy_cache_naming: legacy_cache_naming(target.base_version.as_deref()),
            env: BootstrapEnv {
                build_env: target.environment,
            },
            locale_id: target.locale_id.clone(),
        }
    }
}

/// Whether `base_version` predates the cache-versioning threshold.
///
/// Missing or unparsable versions are treated as post-threshold: only
/// builds that explicitly recorded an old base version keep the legacy
/// cache name.
pub fn legacy_cache_naming(base_version: Option<&str>) -> bool {
    let Some(raw) = base_version else {
        return false;
    };
    let threshold = Version::new(0, 12, 0);
    debug_assert_eq!(threshold.to_string(), LEGACY_NAMING_THRESHOLD);
    match Version::parse(raw.trim().trim_start_matches('v')) {
        Ok(version) => version < threshold,
        Err(_) => false,
    }
}

/// Serialize the bootstrap as the executable preamble statement.
///
/// Stable key order (struct order) and fixed 4-space indentation, so
/// staged templates are byte-stable across rebuilds of the same target.
pub fn render_preamble(bootstrap: &Bootstrap) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    bootstrap.serialize(&mut serializer)?;
    let json = String::from_utf8(buf)
        .map_err(|e| BuildError::Serialization(format!("preamble is not UTF-8: {e}")))?;
    Ok(format!("{WORKER_GLOBAL} = {json};\n\n"))
}

/// Full staged template: preamble + base template with the distribution
/// directory placeholder resolved.
pub fn render_template(bootstrap: &Bootstrap, assets_dir_name: &str) -> Result<String> {
    let preamble = render_preamble(bootstrap)?;
    let body = WORKER_TEMPLATE.replacen(ASSETS_DIRNAME_PLACEHOLDER, assets_dir_name, 1);
    Ok(format!("{preamble}{body}"))
}
