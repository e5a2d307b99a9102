//! Caching strategies.
//!
//! Each strategy is a stateless procedure over one namespace and one
//! request. All state lives in the injected store; the functions only
//! decide the order of store lookups and network exchanges.
//!
//! Shared rules:
//! - Only 2xx responses are written to a namespace
//! - Store failures are logged and never change the response returned
//! - Transport failures end in a cache fallback or a synthetic 503

mod cache_first;
mod network_first;
mod stale_while_revalidate;

use std::fmt;
use std::sync::Arc;

use swcache_client::Transport;
use swcache_core::{CacheStore, Request, Response};
use tokio::sync::Mutex;
use tokio::task::JoinSet;

/// Body of the 503 served when an app-shell asset is neither cached nor
/// reachable.
pub const OFFLINE_MESSAGE: &str = "You are offline and this page has not been cached yet. \
                                   Reconnect and reload to continue.";

/// Body of the 503 served by the runtime strategies.
pub const GENERIC_OFFLINE_MESSAGE: &str = "Offline";

/// The three caching policies a route can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
    StaleWhileRevalidate,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::CacheFirst => "cache-first",
            Strategy::NetworkFirst => "network-first",
            Strategy::StaleWhileRevalidate => "stale-while-revalidate",
        };
        f.write_str(name)
    }
}

/// Store and transport handles shared by every strategy invocation.
///
/// Cloning is cheap; background revalidation tasks own a clone. Clones
/// share one set of in-flight refreshes.
#[derive(Clone)]
pub struct Strategies {
    store: Arc<dyn CacheStore>,
    transport: Arc<dyn Transport>,
    refreshes: Arc<Mutex<JoinSet<()>>>,
}

impl Strategies {
    pub fn new(store: Arc<dyn CacheStore>, transport: Arc<dyn Transport>) -> Self {
        Self { store, transport, refreshes: Arc::new(Mutex::new(JoinSet::new())) }
    }

    /// Wait for every background refresh started so far.
    pub async fn drain_refreshes(&self) {
        let mut pending = std::mem::take(&mut *self.refreshes.lock().await);
        while let Some(joined) = pending.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "revalidation task failed");
            }
        }
    }

    /// Run `strategy` for `request` against `namespace`.
    pub async fn run(&self, strategy: Strategy, namespace: &str, request: &Request) -> Response {
        match strategy {
            Strategy::CacheFirst => self.cache_first(namespace, request).await,
            Strategy::NetworkFirst => self.network_first(namespace, request).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(namespace, request).await,
        }
    }

    /// Store lookup where a failing store counts as a miss.
    async fn lookup(&self, namespace: &str, request: &Request) -> Option<Response> {
        match self.store.match_request(namespace, request).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(namespace, url = %request.url, error = %e, "cache lookup failed; treating as miss");
                None
            }
        }
    }

    /// Best-effort write of a 2xx response.
    async fn store_copy(&self, namespace: &str, request: &Request, response: &Response) {
        if !response.is_success() {
            tracing::debug!(namespace, url = %request.url, status = response.status, "not caching non-2xx response");
            return;
        }
        if let Err(e) = self.store.put(namespace, request, response).await {
            tracing::warn!(namespace, url = %request.url, error = %e, "failed to cache response");
        }
    }
}
