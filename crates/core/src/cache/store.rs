//! The namespace store seam.

use async_trait::async_trait;

use crate::{Error, Request, Response};

/// Durable mapping from namespace name to request-keyed responses.
///
/// Individual operations are atomic. Sequences of operations are not:
/// two writers for the same key race and the last write wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Create the namespace if it does not exist yet.
    async fn open(&self, namespace: &str) -> Result<(), Error>;

    async fn has(&self, namespace: &str) -> Result<bool, Error>;

    /// Namespace names in creation order.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Remove a namespace with all of its entries.
    ///
    /// Returns false if the namespace did not exist.
    async fn delete(&self, namespace: &str) -> Result<bool, Error>;

    /// Look up the stored response for `request`.
    ///
    /// A missing namespace is a miss, not an error.
    async fn match_request(&self, namespace: &str, request: &Request) -> Result<Option<Response>, Error>;

    /// Store `response` under the key of `request`, replacing any previous
    /// value. The namespace is created on demand.
    async fn put(&self, namespace: &str, request: &Request, response: &Response) -> Result<(), Error>;

    /// Number of entries in the namespace (zero if it does not exist).
    async fn entry_count(&self, namespace: &str) -> Result<usize, Error>;
}

pub(crate) fn ensure_name(namespace: &str) -> Result<(), Error> {
    if namespace.trim().is_empty() {
        return Err(Error::InvalidInput("namespace name cannot be empty".into()));
    }
    Ok(())
}
