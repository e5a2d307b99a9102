//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SWCACHE_*)
//! 2. TOML config file (if SWCACHE_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The precache list, the CDN host list and the two versioned cache names
//! are the values an operator changes between releases. Bumping a cache
//! name is what evicts the previous generation on the next activation.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SWCACHE_*)
/// 2. TOML config file (if SWCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite cache database.
    ///
    /// Set via SWCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// The application's own origin. Requests to it are served cache-first
    /// from the precache, and relative precache entries resolve against it.
    ///
    /// Set via SWCACHE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Versioned name of the app-shell namespace.
    ///
    /// Set via SWCACHE_PRECACHE_CACHE environment variable.
    #[serde(default = "default_precache_cache")]
    pub precache_cache: String,

    /// Versioned name of the runtime namespace.
    ///
    /// Set via SWCACHE_RUNTIME_CACHE environment variable.
    #[serde(default = "default_runtime_cache")]
    pub runtime_cache: String,

    /// App-shell URLs fetched on install, absolute or origin-relative.
    ///
    /// Set via SWCACHE_PRECACHE_URLS environment variable (`[a, b]` syntax).
    #[serde(default = "default_precache_urls")]
    pub precache_urls: Vec<String>,

    /// Hosts served stale-while-revalidate from the runtime namespace.
    ///
    /// Set via SWCACHE_CDN_HOSTS environment variable (`[a, b]` syntax).
    #[serde(default = "default_cdn_hosts")]
    pub cdn_hosts: Vec<String>,

    /// User-Agent string for network requests.
    ///
    /// Set via SWCACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Optional transport timeout in milliseconds. Unset means requests
    /// may hang for as long as the network lets them.
    ///
    /// Set via SWCACHE_TIMEOUT_MS environment variable.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Maximum response body size accepted from the network.
    ///
    /// Set via SWCACHE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Maximum number of redirects the transport follows.
    ///
    /// Set via SWCACHE_MAX_REDIRECTS environment variable.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

/// The two live namespace identifiers of the current generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNames {
    pub precache: String,
    pub runtime: String,
}

impl CacheNames {
    pub fn new(precache: impl Into<String>, runtime: impl Into<String>) -> Self {
        Self { precache: precache.into(), runtime: runtime.into() }
    }

    /// Whether `name` is one of the live identifiers.
    pub fn is_current(&self, name: &str) -> bool {
        name == self.precache || name == self.runtime
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./swcache.sqlite")
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_precache_cache() -> String {
    "app-precache-v1".into()
}

fn default_runtime_cache() -> String {
    "app-runtime-v1".into()
}

fn default_precache_urls() -> Vec<String> {
    ["/", "/index.html", "/offline.html", "/manifest.json", "/icons/icon-192.png", "/icons/icon-512.png"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_cdn_hosts() -> Vec<String> {
    ["cdn.jsdelivr.net", "unpkg.com", "cdnjs.cloudflare.com", "fonts.googleapis.com", "fonts.gstatic.com"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_user_agent() -> String {
    "swcache/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_max_redirects() -> usize {
    20
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            origin: default_origin(),
            precache_cache: default_precache_cache(),
            runtime_cache: default_runtime_cache(),
            precache_urls: default_precache_urls(),
            cdn_hosts: default_cdn_hosts(),
            user_agent: default_user_agent(),
            timeout_ms: None,
            max_bytes: default_max_bytes(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// The live namespace identifiers.
    pub fn cache_names(&self) -> CacheNames {
        CacheNames::new(&self.precache_cache, &self.runtime_cache)
    }

    /// Parsed application origin.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `origin` is not an absolute http(s) URL.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ConfigError::Invalid { field: "origin".into(), reason: format!("unsupported scheme: {scheme}") }),
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SWCACHE_`
    /// 2. TOML file from `SWCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SWCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SWCACHE_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
