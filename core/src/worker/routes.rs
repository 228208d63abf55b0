//! Request-routing rules baked into the worker template
//!
//! The table itself is fixed; its behavior depends on the globals the
//! bootstrap preamble injects (assets directory, legacy naming flag).
//! Rules are ordered and the first match wins. This module is the Rust
//! mirror of the `getRoute` helper in `worker-template.js` — the two must
//! stay in sync.

use regex::Regex;
use serde::Serialize;

/// Legacy cache name pinned by builds produced before cache versioning.
pub const LEGACY_CACHE_NAME: &str = "anvil-sw-cache";

/// Runtime cache-name namespacing (prefix-suffix plus per-kind markers).
pub const CACHE_PREFIX: &str = "anvil";
pub const CACHE_SUFFIX: &str = "cache";

/// Caching strategy applied to a matched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strategy {
    NetworkOnly,
    CacheFirst,
    NetworkFirst,
}

/// Cache-name markers handed to the runtime's namespacing.
///
/// Pre-threshold builds reuse `sw` for both kinds so already-installed
/// workers keep hitting the caches older builds created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNameDetails {
    pub prefix: &'static str,
    pub suffix: &'static str,
    pub precache: &'static str,
    pub runtime: &'static str,
}

pub fn cache_name_details(legacy_cache_naming: bool) -> CacheNameDetails {
    CacheNameDetails {
        prefix: CACHE_PREFIX,
        suffix: CACHE_SUFFIX,
        precache: if legacy_cache_naming { "sw" } else { "pre" },
        runtime: if legacy_cache_naming { "sw" } else { "rt" },
    }
}

/// Origin-scoped URL pattern.
///
/// The compiled expression anchors on protocol + matched host + optional
/// port, where the host is the last two dot-separated labels of the
/// serving origin — arbitrary subdomains are tolerated, cross-origin
/// requests never match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    pathname: Option<String>,
    any_query: bool,
}

impl RoutePattern {
    /// Match requests under a path prefix, terminated by `/` or end.
    pub fn for_path(pathname: &str) -> Self {
        RoutePattern {
            pathname: Some(pathname.to_string()),
            any_query: false,
        }
    }

    /// Match one exact path regardless of query string.
    pub fn with_query(pathname: &str) -> Self {
        RoutePattern {
            pathname: Some(pathname.to_string()),
            any_query: true,
        }
    }

    /// Match every same-origin request.
    pub fn catch_all() -> Self {
        RoutePattern {
            pathname: None,
            any_query: false,
        }
    }

    /// Regex source for requests served from `host` (already reduced to
    /// its last two labels, see [`apex_host`]).
    pub fn regex_source(&self, host: &str) -> String {
        let path = match &self.pathname {
            Some(p) => format!(r"\/{}", p.trim_start_matches('/')),
            None => String::new(),
        };
        let suffix = if self.any_query { r"\?.*" } else { r"\/" };
        format!(r"^[a-z]+:\/\/[^/]*?{host}[:]*[0-9]*{path}({suffix}|$)")
    }

    pub fn matcher(&self, host: &str) -> Option<Regex> {
        Regex::new(&self.regex_source(host)).ok()
    }
}

/// One routing rule; `cache_name` overrides the runtime's namespacing when
/// legacy naming is in effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub pattern: RoutePattern,
    pub strategy: Strategy,
    pub cache_name: Option<String>,
}

/// The fixed routing table, in matching order.
pub fn route_rules(assets_dir_name: &str, legacy_cache_naming: bool) -> Vec<RouteRule> {
    let legacy = legacy_cache_naming.then(|| LEGACY_CACHE_NAME.to_string());
    vec![
        // API calls always bypass the cache.
        RouteRule {
            pattern: RoutePattern::for_path("api"),
            strategy: Strategy::NetworkOnly,
            cache_name: None,
        },
        // Content-hashed assets are immutable.
        RouteRule {
            pattern: RoutePattern::for_path(assets_dir_name),
            strategy: Strategy::CacheFirst,
            cache_name: legacy.clone(),
        },
        RouteRule {
            pattern: RoutePattern::with_query("favicon.ico"),
            strategy: Strategy::CacheFirst,
            cache_name: legacy.clone(),
        },
        // Navigations prefer freshness but degrade gracefully offline.
        RouteRule {
            pattern: RoutePattern::catch_all(),
            strategy: Strategy::NetworkFirst,
            cache_name: legacy,
        },
    ]
}

/// Last two dot-separated labels of a host, port stripped.
pub fn apex_host(host: &str) -> String {
    let host = host.split(':').next().unwrap_or(host);
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        host.to_string()
    } else {
        labels[labels.len() - 2..].join(".")
    }
}

/// First-match routing for a GET request `url` served from `origin_host`.
///
/// Non-GET requests and cross-origin URLs match nothing and fall through
/// to the platform default (network, uncached).
pub fn match_request<'a>(
    rules: &'a [RouteRule],
    origin_host: &str,
    method: &str,
    url: &str,
) -> Option<&'a RouteRule> {
    if method != "GET" {
        return None;
    }
    let host = apex_host(origin_host);
    rules.iter().find(|rule| {
        rule.pattern
            .matcher(&host)
            .map(|re| re.is_match(url))
            .unwrap_or(false)
    })
}
