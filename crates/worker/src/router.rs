//! Request classification and strategy dispatch.
//!
//! Only GET requests over http(s) are eligible. Eligible requests are
//! classified in a fixed order, first match wins:
//!
//! 1. host is a CDN host: stale-while-revalidate on the runtime namespace
//! 2. origin is the application origin: cache-first on the precache namespace
//! 3. anything else: network-first on the runtime namespace

use std::collections::HashSet;

use swcache_core::{CacheNames, Request, Response};
use url::{Origin, Url};

use crate::strategy::{Strategies, Strategy};

/// Resource class of an eligible request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestClass {
    Cdn,
    SameOrigin,
    Other,
}

/// A strategy bound to the namespace it runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub strategy: Strategy,
    pub namespace: String,
}

/// Result of intercepting a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Let the environment perform the request untouched.
    PassThrough,
    /// Substitute this response.
    Respond(Response),
}

pub struct Router {
    strategies: Strategies,
    origin: Origin,
    cdn_hosts: HashSet<String>,
    names: CacheNames,
}

impl Router {
    pub fn new<S: AsRef<str>>(strategies: Strategies, origin: &Url, cdn_hosts: &[S], names: CacheNames) -> Self {
        let cdn_hosts = cdn_hosts.iter().map(|h| h.as_ref().trim().to_ascii_lowercase()).collect();
        Self { strategies, origin: origin.origin(), cdn_hosts, names }
    }

    /// Classify `request`, or `None` if it is not eligible for interception.
    pub fn classify(&self, request: &Request) -> Option<RequestClass> {
        if !request.is_get() || !request.is_http() {
            return None;
        }

        if let Some(host) = request.url.host_str()
            && self.cdn_hosts.contains(&host.to_ascii_lowercase())
        {
            return Some(RequestClass::Cdn);
        }

        if request.url.origin() == self.origin {
            return Some(RequestClass::SameOrigin);
        }

        Some(RequestClass::Other)
    }

    /// The strategy and namespace `request` would be served with.
    pub fn plan(&self, request: &Request) -> Option<Route> {
        let (strategy, namespace) = match self.classify(request)? {
            RequestClass::Cdn => (Strategy::StaleWhileRevalidate, &self.names.runtime),
            RequestClass::SameOrigin => (Strategy::CacheFirst, &self.names.precache),
            RequestClass::Other => (Strategy::NetworkFirst, &self.names.runtime),
        };
        Some(Route { strategy, namespace: namespace.clone() })
    }

    /// Intercept `request`, running exactly one strategy when eligible.
    pub async fn route(&self, request: &Request) -> FetchOutcome {
        let Some(route) = self.plan(request) else {
            tracing::trace!(method = %request.method, url = %request.url, "passing request through");
            return FetchOutcome::PassThrough;
        };

        tracing::debug!(strategy = %route.strategy, namespace = %route.namespace, url = %request.url, "routing request");
        let response = self.strategies.run(route.strategy, &route.namespace, request).await;
        FetchOutcome::Respond(response)
    }
}
