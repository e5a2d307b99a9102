//! Cache-first: serve from the namespace, fall back to the network.

use swcache_core::{Request, Response};

use super::{OFFLINE_MESSAGE, Strategies};

impl Strategies {
    /// Serve a cached response without touching the network; on a miss,
    /// fetch, write 2xx responses through to the namespace, and return the
    /// network response. A transport failure on a miss yields a 503.
    pub async fn cache_first(&self, namespace: &str, request: &Request) -> Response {
        if let Some(cached) = self.lookup(namespace, request).await {
            tracing::debug!(namespace, url = %request.url, "cache-first hit");
            return cached;
        }

        match self.transport.fetch(request).await {
            Ok(response) => {
                self.store_copy(namespace, request, &response).await;
                response
            }
            Err(e) => {
                tracing::info!(namespace, url = %request.url, error = %e, "cache-first miss while offline");
                Response::offline(OFFLINE_MESSAGE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use swcache_core::{CacheStore, MemoryStore, Response};

    use crate::strategy::{OFFLINE_MESSAGE, Strategies};
    use crate::testing::{BrokenStore, FakeTransport, get, ok};

    const NS: &str = "app-precache-v1";

    fn setup() -> (Arc<MemoryStore>, Arc<FakeTransport>, Strategies) {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(FakeTransport::new());
        let strategies = Strategies::new(store.clone(), transport.clone());
        (store, transport, strategies)
    }

    #[tokio::test]
    async fn test_hit_never_touches_network() {
        let (store, transport, strategies) = setup();
        let request = get("https://app.test/index.html");
        store.put(NS, &request, &ok("<html>shell</html>")).await.unwrap();
        transport.set_offline(true);

        for _ in 0..3 {
            let response = strategies.cache_first(NS, &request).await;
            assert_eq!(&response.body[..], b"<html>shell</html>");
        }
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_miss_writes_through() {
        let (store, transport, strategies) = setup();
        let request = get("https://app.test/app.js");
        transport.respond("https://app.test/app.js", ok("console.log(1)"));

        let response = strategies.cache_first(NS, &request).await;
        assert_eq!(response.status, 200);

        let cached = store.match_request(NS, &request).await.unwrap().unwrap();
        assert_eq!(&cached.body[..], b"console.log(1)");

        strategies.cache_first(NS, &request).await;
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_miss_error_status_returned_not_cached() {
        let (store, transport, strategies) = setup();
        let request = get("https://app.test/gone.js");
        transport.respond("https://app.test/gone.js", Response::new(404, "Not Found", "missing"));

        let response = strategies.cache_first(NS, &request).await;
        assert_eq!(response.status, 404);
        assert_eq!(store.entry_count(NS).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cold_cache_offline_returns_503_and_writes_nothing() {
        let (store, transport, strategies) = setup();
        transport.set_offline(true);

        let response = strategies.cache_first(NS, &get("https://app.test/settings")).await;
        assert_eq!(response.status, 503);
        assert_eq!(&response.body[..], OFFLINE_MESSAGE.as_bytes());
        assert_eq!(store.entry_count(NS).await.unwrap(), 0);
        assert!(!store.has(NS).await.unwrap());
    }

    #[tokio::test]
    async fn test_failing_store_still_returns_network_response() {
        let transport = Arc::new(FakeTransport::new());
        let strategies = Strategies::new(Arc::new(BrokenStore), transport.clone());
        transport.respond("https://app.test/app.js", ok("fresh"));

        let response = strategies.cache_first(NS, &get("https://app.test/app.js")).await;
        assert_eq!(response.status, 200);
        assert_eq!(&response.body[..], b"fresh");
    }
}
