//! In-memory namespace store.
//!
//! Same semantics as [`CacheDb`](super::CacheDb) without durability.
//! Used by tests and by hosts that run without a database file.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::hash::compute_cache_key;
use super::store::{CacheStore, ensure_name};
use crate::{Error, Request, Response};

#[derive(Debug, Default)]
struct Namespace {
    created: u64,
    entries: HashMap<String, Response>,
}

#[derive(Debug, Default)]
struct Inner {
    namespaces: HashMap<String, Namespace>,
    next_seq: u64,
}

impl Inner {
    fn open(&mut self, name: &str) -> &mut Namespace {
        if !self.namespaces.contains_key(name) {
            let created = self.next_seq;
            self.next_seq += 1;
            self.namespaces.insert(name.to_string(), Namespace { created, ..Default::default() });
        }
        self.namespaces.entry(name.to_string()).or_default()
    }
}

/// Process-local [`CacheStore`] guarded by a tokio `RwLock`.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn open(&self, namespace: &str) -> Result<(), Error> {
        ensure_name(namespace)?;
        self.inner.write().await.open(namespace);
        Ok(())
    }

    async fn has(&self, namespace: &str) -> Result<bool, Error> {
        Ok(self.inner.read().await.namespaces.contains_key(namespace))
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        let inner = self.inner.read().await;
        let mut names: Vec<(&String, u64)> = inner.namespaces.iter().map(|(k, ns)| (k, ns.created)).collect();
        names.sort_by_key(|(_, created)| *created);
        Ok(names.into_iter().map(|(k, _)| k.clone()).collect())
    }

    async fn delete(&self, namespace: &str) -> Result<bool, Error> {
        Ok(self.inner.write().await.namespaces.remove(namespace).is_some())
    }

    async fn match_request(&self, namespace: &str, request: &Request) -> Result<Option<Response>, Error> {
        let key = compute_cache_key(&request.method, &request.url);
        let inner = self.inner.read().await;
        Ok(inner
            .namespaces
            .get(namespace)
            .and_then(|ns| ns.entries.get(&key))
            .cloned())
    }

    async fn put(&self, namespace: &str, request: &Request, response: &Response) -> Result<(), Error> {
        ensure_name(namespace)?;
        let key = compute_cache_key(&request.method, &request.url);
        self.inner
            .write()
            .await
            .open(namespace)
            .entries
            .insert(key, response.clone());
        Ok(())
    }

    async fn entry_count(&self, namespace: &str) -> Result<usize, Error> {
        Ok(self
            .inner
            .read()
            .await
            .namespaces
            .get(namespace)
            .map_or(0, |ns| ns.entries.len()))
    }
}
