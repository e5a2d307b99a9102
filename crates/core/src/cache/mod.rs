//! Namespaced response cache.
//!
//! A namespace is an isolated, named collection of request-keyed
//! response snapshots. Two backends implement [`CacheStore`]:
//!
//! - [`CacheDb`]: durable SQLite storage via tokio-rusqlite, WAL mode,
//!   schema managed by migrations
//! - [`MemoryStore`]: process-local maps, used in tests and ephemeral hosts
//!
//! Keys are SHA-256 digests of the request method and URL.

pub mod connection;
pub mod entries;
pub mod hash;
pub mod memory;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use memory::MemoryStore;
pub use store::CacheStore;
