//! Offline-worker artifact builder
//!
//! One invocation per build target: resolve options, fix the destination
//! filename, stage the per-locale template, and hand the artifact
//! descriptor to the bundler's asset-injection plugin. Opting out
//! (`serviceWorker: false`) is the only path that produces no artifact;
//! a staging failure is fatal for the build and propagates unchanged.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::Result;
use crate::project::config::{
    BuildConfig, BuildTarget, DEV_SERVICE_WORKER_FILENAME,
};
use super::template::{render_template, Bootstrap};

/// Directory the bundler stages worker imports into for non-dev builds.
pub const SW_IMPORTS_DIRNAME: &str = "__sw-assets";

/// How the worker runtime library reaches the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Dev builds pull the runtime from a CDN; nothing extra to bundle.
    Cdn,
    /// Production builds bundle the runtime next to the worker.
    Local,
}

/// Artifact descriptor consumed by the bundler's asset-injection plugin.
/// This core resolves it; it never performs bundling itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerArtifact {
    pub sw_dest: String,
    pub sw_src: PathBuf,
    pub import_mode: ImportMode,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub imports_directory: String,
}

/// `service-worker.js` + locale `fr` → `service-worker.fr.js`.
pub fn locale_qualified_filename(filename: &str, locale_id: Option<&str>) -> String {
    match locale_id {
        Some(locale) if !locale.is_empty() => match filename.rsplit_once('.') {
            Some((stem, ext)) => format!("{stem}.{locale}.{ext}"),
            None => format!("{filename}.{locale}"),
        },
        _ => filename.to_string(),
    }
}

/// Build the worker artifact for one target.
///
/// Returns `Ok(None)` when worker generation is disabled in the
/// configuration — no artifact, no filesystem writes. As a side effect the
/// resolved destination is written back into `config` for downstream
/// consumers (HTML injection).
pub fn build_worker_artifact(
    config: &mut BuildConfig,
    target: &BuildTarget,
    tmp_dir: &Path,
) -> Result<Option<WorkerArtifact>> {
    let Some(options) = config.service_worker_options() else {
        return Ok(None);
    };
    let is_dev = target.environment.is_dev();

    // Dev keeps one well-known name; every other environment gets a
    // locale-qualified file one level above the hashed assets directory,
    // so multi-locale builds never collide.
    let sw_dest = if is_dev {
        DEV_SERVICE_WORKER_FILENAME.to_string()
    } else {
        format!(
            "../{}",
            locale_qualified_filename(&options.filename, target.locale_id.as_deref())
        )
    };

    let sw_src = match &options.sw_src {
        Some(custom) => custom.clone(),
        None => stage_template(target, tmp_dir)?,
    };

    config.client_service_worker_pathname = Some(sw_dest.clone());

    let mut include = vec![
        r"\.js$".to_string(),
        r"extract\.all\..+?\.large\.css$".to_string(),
    ];
    include.extend(options.include.iter().cloned());

    let mut exclude = vec![r"\.map$".to_string(), r"^manifest.*\.js$".to_string()];
    exclude.extend(options.exclude.iter().cloned());

    Ok(Some(WorkerArtifact {
        sw_dest,
        sw_src,
        import_mode: if is_dev { ImportMode::Cdn } else { ImportMode::Local },
        include,
        exclude,
        imports_directory: if is_dev {
            String::new()
        } else {
            SW_IMPORTS_DIRNAME.to_string()
        },
    }))
}

/// Stage the per-locale temporary template: drop any stale copy from a
/// previous build of the same locale, then write preamble + base template.
fn stage_template(target: &BuildTarget, tmp_dir: &Path) -> Result<PathBuf> {
    let filename = match target.locale_id.as_deref() {
        Some(locale) if !locale.is_empty() => format!("worker-template.{locale}.js"),
        _ => "worker-template.js".to_string(),
    };
    let path = tmp_dir.join(filename);

    if path.exists() {
        fs::remove_file(&path)?;
    }
    fs::create_dir_all(tmp_dir)?;

    let bootstrap = Bootstrap::for_target(target);
    let contents = render_template(&bootstrap, &target.assets_dir_name)?;
    fs::write(&path, contents)?;
    debug!("staged worker template at {}", path.display());

    Ok(path)
}
