//! Request interception and caching policy for swcache.
//!
//! The [`Worker`] is built once at startup from configuration plus three
//! injected collaborators: a [`CacheStore`](swcache_core::CacheStore), a
//! [`Transport`](swcache_client::Transport) and a [`Host`]. It dispatches
//! lifecycle, fetch, message, push and sync events to:
//!
//! - [`Router`]: picks one caching strategy per request
//! - [`Strategies`]: cache-first, network-first, stale-while-revalidate
//! - [`Lifecycle`]: precache on install, evict stale namespaces on activate
//! - [`ControlChannel`]: control messages and notification hooks

pub mod control;
pub mod error;
pub mod handler;
pub mod host;
pub mod lifecycle;
pub mod router;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testing;

pub use control::{ControlChannel, ControlMessage, ReplyPort};
pub use error::WorkerError;
pub use handler::{Event, EventKind, Outcome, Worker};
pub use host::{Host, Notification};
pub use lifecycle::{InstallReport, Lifecycle, LifecycleState};
pub use router::{FetchOutcome, RequestClass, Route, Router};
pub use strategy::{Strategies, Strategy};
