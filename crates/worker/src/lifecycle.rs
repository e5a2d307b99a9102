//! Install and activate transitions.
//!
//! ### Install
//! - Opens the precache namespace and fetches the manifest concurrently
//! - Writes the batch only if every response is 2xx, otherwise writes nothing
//! - Failures are logged and never abort the transition
//! - Always ends with the host's skip-waiting
//!
//! ### Activate
//! - Deletes every namespace that is not the current precache or runtime
//! - Claims open clients, then marks the worker active

use std::fmt;
use std::sync::Arc;

use futures_util::future::join_all;
use swcache_client::{Transport, resolve_manifest};
use swcache_core::{CacheNames, CacheStore, Error, Request, Response};
use tokio::sync::RwLock;
use url::Url;

use crate::host::Host;

/// Where the worker is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Uninstalled,
    /// Install has run; waiting for activation.
    Installing,
    Active,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Uninstalled => "uninstalled",
            LifecycleState::Installing => "installing",
            LifecycleState::Active => "active",
        };
        f.write_str(name)
    }
}

/// Outcome of a precache run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Number of entries written to the precache namespace.
    pub cached: usize,
    /// Manifest entries that failed, with the reason.
    pub failed: Vec<String>,
}

impl InstallReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Lifecycle {
    store: Arc<dyn CacheStore>,
    transport: Arc<dyn Transport>,
    host: Arc<dyn Host>,
    names: CacheNames,
    origin: Url,
    precache_urls: Vec<String>,
    state: RwLock<LifecycleState>,
}

impl Lifecycle {
    pub fn new(
        store: Arc<dyn CacheStore>, transport: Arc<dyn Transport>, host: Arc<dyn Host>, names: CacheNames, origin: Url,
        precache_urls: Vec<String>,
    ) -> Self {
        Self {
            store,
            transport,
            host,
            names,
            origin,
            precache_urls,
            state: RwLock::new(LifecycleState::default()),
        }
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    /// Precache the app shell, then ask the host to skip waiting.
    pub async fn install(&self) -> InstallReport {
        *self.state.write().await = LifecycleState::Installing;
        let namespace = &self.names.precache;

        let report = match self.precache(namespace).await {
            Ok(cached) => InstallReport { cached, failed: Vec::new() },
            Err(failed) => {
                for reason in &failed {
                    tracing::warn!(namespace = %namespace, "precache failed: {reason}");
                }
                InstallReport { cached: 0, failed }
            }
        };

        tracing::info!(namespace = %namespace, cached = report.cached, failed = report.failed.len(), "install finished");
        self.host.skip_waiting().await;
        report
    }

    /// Fetch the whole manifest and write it as one batch.
    async fn precache(&self, namespace: &str) -> Result<usize, Vec<String>> {
        self.store.open(namespace).await.map_err(|e| vec![e.to_string()])?;

        let urls = resolve_manifest(&self.origin, &self.precache_urls)
            .map_err(|e| vec![Error::InvalidUrl(e.to_string()).to_string()])?;

        let requests: Vec<Request> = urls.into_iter().map(Request::get).collect();
        let results = join_all(requests.iter().map(|request| self.transport.fetch(request))).await;

        let mut batch: Vec<(&Request, Response)> = Vec::with_capacity(requests.len());
        let mut failed = Vec::new();
        for (request, result) in requests.iter().zip(results) {
            match result {
                Ok(response) if response.is_success() => batch.push((request, response)),
                Ok(response) => failed.push(
                    Error::PrecacheFailed { url: request.url.to_string(), reason: format!("status {}", response.status) }
                        .to_string(),
                ),
                Err(e) => {
                    failed.push(Error::PrecacheFailed { url: request.url.to_string(), reason: e.to_string() }.to_string())
                }
            }
        }

        if !failed.is_empty() {
            return Err(failed);
        }

        for (request, response) in &batch {
            self.store.put(namespace, request, response).await.map_err(|e| vec![e.to_string()])?;
        }

        Ok(batch.len())
    }

    /// Evict stale namespaces and take control of open clients.
    ///
    /// Returns the deleted namespace identifiers.
    pub async fn activate(&self) -> Vec<String> {
        let mut deleted = Vec::new();

        match self.store.keys().await {
            Ok(keys) => {
                for name in keys.into_iter().filter(|name| !self.names.is_current(name)) {
                    match self.store.delete(&name).await {
                        Ok(_) => {
                            tracing::info!(namespace = %name, "evicted stale namespace");
                            deleted.push(name);
                        }
                        Err(e) => tracing::warn!(namespace = %name, error = %e, "failed to evict namespace"),
                    }
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to enumerate namespaces"),
        }

        self.host.claim().await;
        *self.state.write().await = LifecycleState::Active;
        deleted
    }
}
