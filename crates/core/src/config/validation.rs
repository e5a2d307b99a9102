//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if a cache name is empty, and
    /// `ConfigError::Invalid` if:
    /// - `origin` is not an absolute http(s) URL
    /// - both cache names are equal
    /// - a precache entry does not resolve to an http(s) URL
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is set below 100ms or above 5 minutes
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        let origin = self.origin_url()?;

        if self.precache_cache.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "precache_cache".into(),
                hint: "Set SWCACHE_PRECACHE_CACHE to a versioned name such as app-precache-v1".into(),
            });
        }
        if self.runtime_cache.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "runtime_cache".into(),
                hint: "Set SWCACHE_RUNTIME_CACHE to a versioned name such as app-runtime-v1".into(),
            });
        }
        if self.precache_cache == self.runtime_cache {
            return Err(ConfigError::Invalid {
                field: "runtime_cache".into(),
                reason: "must differ from precache_cache".into(),
            });
        }

        for entry in &self.precache_urls {
            let resolved = origin.join(entry.trim()).map_err(|e| ConfigError::Invalid {
                field: "precache_urls".into(),
                reason: format!("{entry}: {e}"),
            })?;
            if !matches!(resolved.scheme(), "http" | "https") {
                return Err(ConfigError::Invalid {
                    field: "precache_urls".into(),
                    reason: format!("{entry}: unsupported scheme {}", resolved.scheme()),
                });
            }
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if let Some(timeout_ms) = self.timeout_ms {
            if timeout_ms < 100 {
                return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
            }
            if timeout_ms > 300_000 {
                return Err(ConfigError::Invalid {
                    field: "timeout_ms".into(),
                    reason: "must not exceed 5 minutes (300000ms)".into(),
                });
            }
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.cdn_hosts.iter().any(|h| origin.host_str() == Some(h.to_ascii_lowercase().as_str())) {
            tracing::warn!(
                origin = %origin,
                "origin host is also listed in cdn_hosts; \
                 CDN classification takes precedence"
            );
        }

        Ok(())
    }
}
