//! Network-first: prefer fresh data, fall back to the namespace.

use swcache_core::{Request, Response};

use super::{GENERIC_OFFLINE_MESSAGE, Strategies};

impl Strategies {
    /// Fetch first and keep a copy of 2xx responses. Any completed
    /// exchange is returned as-is, error statuses included. Only a
    /// transport failure consults the namespace, then falls back to a 503.
    pub async fn network_first(&self, namespace: &str, request: &Request) -> Response {
        match self.transport.fetch(request).await {
            Ok(response) => {
                self.store_copy(namespace, request, &response).await;
                response
            }
            Err(e) => {
                tracing::debug!(namespace, url = %request.url, error = %e, "network-first falling back to cache");
                match self.lookup(namespace, request).await {
                    Some(cached) => cached,
                    None => Response::offline(GENERIC_OFFLINE_MESSAGE),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use swcache_core::{CacheStore, MemoryStore, Response};

    use crate::strategy::Strategies;
    use crate::testing::{BrokenStore, FakeTransport, get, ok};

    const NS: &str = "app-runtime-v1";
    const URL: &str = "https://api.test/feed";

    fn setup() -> (Arc<MemoryStore>, Arc<FakeTransport>, Strategies) {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(FakeTransport::new());
        let strategies = Strategies::new(store.clone(), transport.clone());
        (store, transport, strategies)
    }

    #[tokio::test]
    async fn test_online_prefers_network_and_stores() {
        let (store, transport, strategies) = setup();
        let request = get(URL);
        store.put(NS, &request, &ok("old feed")).await.unwrap();
        transport.respond(URL, ok("new feed"));

        let response = strategies.network_first(NS, &request).await;
        assert_eq!(&response.body[..], b"new feed");

        let cached = store.match_request(NS, &request).await.unwrap().unwrap();
        assert_eq!(&cached.body[..], b"new feed");
    }

    #[tokio::test]
    async fn test_error_status_returned_without_fallback() {
        let (store, transport, strategies) = setup();
        let request = get(URL);
        store.put(NS, &request, &ok("old feed")).await.unwrap();
        transport.respond(URL, Response::new(500, "Internal Server Error", "boom"));

        let response = strategies.network_first(NS, &request).await;
        assert_eq!(response.status, 500);

        let cached = store.match_request(NS, &request).await.unwrap().unwrap();
        assert_eq!(&cached.body[..], b"old feed");
    }

    #[tokio::test]
    async fn test_offline_with_cached_entry() {
        let (store, transport, strategies) = setup();
        let request = get(URL);
        store.put(NS, &request, &ok("old feed")).await.unwrap();
        transport.set_offline(true);

        let response = strategies.network_first(NS, &request).await;
        assert_eq!(response.status, 200);
        assert_eq!(&response.body[..], b"old feed");
    }

    #[tokio::test]
    async fn test_offline_without_cached_entry() {
        let (_store, transport, strategies) = setup();
        transport.set_offline(true);

        let response = strategies.network_first(NS, &get(URL)).await;
        assert_eq!(response.status, 503);
        assert_eq!(&response.body[..], b"Offline");
    }

    #[tokio::test]
    async fn test_failing_store_still_returns_network_response() {
        let transport = Arc::new(FakeTransport::new());
        let strategies = Strategies::new(Arc::new(BrokenStore), transport.clone());
        transport.respond(URL, ok("fresh"));

        let response = strategies.network_first(NS, &get(URL)).await;
        assert_eq!(response.status, 200);
        assert_eq!(&response.body[..], b"fresh");
    }

    #[tokio::test]
    async fn test_failing_store_offline_returns_503() {
        let transport = Arc::new(FakeTransport::new());
        let strategies = Strategies::new(Arc::new(BrokenStore), transport.clone());
        transport.set_offline(true);

        let response = strategies.network_first(NS, &get(URL)).await;
        assert_eq!(response.status, 503);
    }
}
