//! Stale-while-revalidate: answer from the namespace, refresh in the
//! background.

use swcache_core::{Request, Response};
use tokio::sync::oneshot;

use super::{GENERIC_OFFLINE_MESSAGE, Strategies};

impl Strategies {
    /// Start a background refresh, then answer from the namespace if it
    /// holds an entry. The refresh keeps running on a hit and is awaited on a
    /// miss; a miss with a failed refresh yields a 503.
    pub async fn stale_while_revalidate(&self, namespace: &str, request: &Request) -> Response {
        let refresh = self.spawn_refresh(namespace, request).await;

        if let Some(cached) = self.lookup(namespace, request).await {
            tracing::debug!(namespace, url = %request.url, "serving stale entry while revalidating");
            return cached;
        }

        match refresh.await {
            Ok(Some(response)) => response,
            Ok(None) => Response::offline(GENERIC_OFFLINE_MESSAGE),
            Err(_) => {
                tracing::warn!(namespace, url = %request.url, "revalidation task ended without a result");
                Response::offline(GENERIC_OFFLINE_MESSAGE)
            }
        }
    }

    /// Start a tracked refresh; its result arrives on the returned receiver.
    async fn spawn_refresh(&self, namespace: &str, request: &Request) -> oneshot::Receiver<Option<Response>> {
        let (tx, rx) = oneshot::channel();
        let task = self.clone().revalidate(namespace.to_string(), request.clone());

        let mut refreshes = self.refreshes.lock().await;
        while refreshes.try_join_next().is_some() {}
        refreshes.spawn(async move {
            tx.send(task.await).ok();
        });
        rx
    }

    async fn revalidate(self, namespace: String, request: Request) -> Option<Response> {
        match self.transport.fetch(&request).await {
            Ok(response) => {
                self.store_copy(&namespace, &request, &response).await;
                Some(response)
            }
            Err(e) => {
                tracing::debug!(namespace = %namespace, url = %request.url, error = %e, "revalidation failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use swcache_core::{CacheStore, MemoryStore};

    use crate::strategy::Strategies;
    use crate::testing::{BrokenStore, FakeTransport, get, ok};

    const NS: &str = "app-runtime-v1";
    const URL: &str = "https://cdn.jsdelivr.net/npm/lib@1/lib.min.js";

    fn setup() -> (Arc<MemoryStore>, Arc<FakeTransport>, Strategies) {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(FakeTransport::new());
        let strategies = Strategies::new(store.clone(), transport.clone());
        (store, transport, strategies)
    }

    #[tokio::test]
    async fn test_hit_returns_without_waiting_for_network() {
        let (store, transport, strategies) = setup();
        let request = get(URL);
        store.put(NS, &request, &ok("v1")).await.unwrap();
        transport.hang(URL);

        let response = tokio::time::timeout(Duration::from_secs(1), strategies.stale_while_revalidate(NS, &request))
            .await
            .expect("cached entry must be served while the network hangs");
        assert_eq!(&response.body[..], b"v1");
    }

    #[tokio::test]
    async fn test_hit_refreshes_entry_in_background() {
        let (store, transport, strategies) = setup();
        let request = get(URL);
        store.put(NS, &request, &ok("v1")).await.unwrap();
        transport.respond(URL, ok("v2"));

        let response = strategies.stale_while_revalidate(NS, &request).await;
        assert_eq!(&response.body[..], b"v1");

        let mut refreshed = false;
        for _ in 0..100 {
            let cached = store.match_request(NS, &request).await.unwrap().unwrap();
            if &cached.body[..] == b"v2" {
                refreshed = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(refreshed);
        assert_eq!(transport.calls_for(URL), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_entry() {
        let (store, transport, strategies) = setup();
        let request = get(URL);
        store.put(NS, &request, &ok("v1")).await.unwrap();
        transport.fail(URL);

        let response = strategies.stale_while_revalidate(NS, &request).await;
        assert_eq!(&response.body[..], b"v1");

        tokio::time::sleep(Duration::from_millis(50)).await;
        let cached = store.match_request(NS, &request).await.unwrap().unwrap();
        assert_eq!(&cached.body[..], b"v1");
    }

    #[tokio::test]
    async fn test_drain_waits_for_slow_refresh() {
        let (store, transport, strategies) = setup();
        let request = get(URL);
        store.put(NS, &request, &ok("v1")).await.unwrap();
        transport.respond_after(URL, Duration::from_millis(50), ok("v2"));

        let response = strategies.stale_while_revalidate(NS, &request).await;
        assert_eq!(&response.body[..], b"v1");

        strategies.drain_refreshes().await;
        let cached = store.match_request(NS, &request).await.unwrap().unwrap();
        assert_eq!(&cached.body[..], b"v2");
    }

    #[tokio::test]
    async fn test_failing_store_still_returns_network_response() {
        let transport = Arc::new(FakeTransport::new());
        let strategies = Strategies::new(Arc::new(BrokenStore), transport.clone());
        transport.respond(URL, ok("fresh"));

        let response = strategies.stale_while_revalidate(NS, &get(URL)).await;
        assert_eq!(response.status, 200);
        assert_eq!(&response.body[..], b"fresh");
    }

    #[tokio::test]
    async fn test_miss_awaits_network() {
        let (store, transport, strategies) = setup();
        let request = get(URL);
        transport.respond(URL, ok("fresh"));

        let response = strategies.stale_while_revalidate(NS, &request).await;
        assert_eq!(&response.body[..], b"fresh");

        let cached = store.match_request(NS, &request).await.unwrap().unwrap();
        assert_eq!(&cached.body[..], b"fresh");
    }

    #[tokio::test]
    async fn test_miss_offline_returns_503() {
        let (store, transport, strategies) = setup();
        transport.set_offline(true);

        let response = strategies.stale_while_revalidate(NS, &get(URL)).await;
        assert_eq!(response.status, 503);
        assert_eq!(store.entry_count(NS).await.unwrap(), 0);
    }
}
