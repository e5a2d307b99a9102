//! Worker construction and event dispatch.
//!
//! This module defines the [`Worker`], which owns the router, the
//! lifecycle manager and the control channel, and routes each incoming
//! event to the one that handles it.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use swcache_client::Transport;
use swcache_core::{AppConfig, CacheStore, Error, Request};

use crate::control::{ControlChannel, ReplyPort};
use crate::host::Host;
use crate::lifecycle::{InstallReport, Lifecycle};
use crate::router::{FetchOutcome, Router};
use crate::strategy::Strategies;

/// Event types the worker registers handlers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Install,
    Activate,
    Fetch,
    Message,
    Push,
    Sync,
}

impl EventKind {
    pub const ALL: [EventKind; 6] =
        [EventKind::Install, EventKind::Activate, EventKind::Fetch, EventKind::Message, EventKind::Push, EventKind::Sync];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::Install => "install",
            EventKind::Activate => "activate",
            EventKind::Fetch => "fetch",
            EventKind::Message => "message",
            EventKind::Push => "push",
            EventKind::Sync => "sync",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An event delivered by the hosting environment.
#[derive(Debug)]
pub enum Event {
    Install,
    Activate,
    Fetch(Request),
    Message { data: Value, reply: Option<ReplyPort> },
    Push(Option<String>),
    Sync(String),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Install => EventKind::Install,
            Event::Activate => EventKind::Activate,
            Event::Fetch(_) => EventKind::Fetch,
            Event::Message { .. } => EventKind::Message,
            Event::Push(_) => EventKind::Push,
            Event::Sync(_) => EventKind::Sync,
        }
    }
}

/// What handling an event produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Installed(InstallReport),
    /// Identifiers of the evicted namespaces.
    Activated(Vec<String>),
    Fetch(FetchOutcome),
    /// Message, push and sync handlers complete without a result.
    Handled,
}

/// The offline cache worker.
pub struct Worker {
    router: Router,
    lifecycle: Lifecycle,
    control: ControlChannel,
    strategies: Strategies,
}

impl Worker {
    /// Build a worker from configuration and its collaborators.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configured origin is not an http(s) URL.
    pub fn new(
        config: &AppConfig, store: Arc<dyn CacheStore>, transport: Arc<dyn Transport>, host: Arc<dyn Host>,
    ) -> Result<Self, Error> {
        let origin = config.origin_url()?;
        let names = config.cache_names();

        let strategies = Strategies::new(store.clone(), transport.clone());
        let router = Router::new(strategies.clone(), &origin, &config.cdn_hosts, names.clone());
        let control = ControlChannel::new(host.clone(), names.precache.clone());
        let lifecycle = Lifecycle::new(store, transport, host, names, origin, config.precache_urls.clone());

        tracing::debug!(events = ?EventKind::ALL.map(EventKind::name), "registered event handlers");
        Ok(Self { router, lifecycle, control, strategies })
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Wait for background cache refreshes still in flight.
    pub async fn shutdown(&self) {
        self.strategies.drain_refreshes().await;
    }

    /// Run the handler registered for `event` to completion.
    pub async fn dispatch(&self, event: Event) -> Outcome {
        tracing::trace!(event = %event.kind(), "dispatching event");
        match event {
            Event::Install => Outcome::Installed(self.lifecycle.install().await),
            Event::Activate => Outcome::Activated(self.lifecycle.activate().await),
            Event::Fetch(request) => Outcome::Fetch(self.router.route(&request).await),
            Event::Message { data, reply } => {
                self.control.handle_message(&data, reply).await;
                Outcome::Handled
            }
            Event::Push(payload) => {
                self.control.handle_push(payload.as_deref()).await;
                Outcome::Handled
            }
            Event::Sync(tag) => {
                self.control.handle_sync(&tag).await;
                Outcome::Handled
            }
        }
    }
}
