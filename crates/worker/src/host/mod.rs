//! Capabilities the hosting environment provides to the worker.

pub mod stdio;

use async_trait::async_trait;
use serde::Serialize;

pub use stdio::{Incoming, Outgoing, StdioHost, parse_line, serve};

/// Environment-side effects the worker can request.
#[async_trait]
pub trait Host: Send + Sync {
    /// Supersede the previously active instance without waiting for its
    /// clients to close.
    async fn skip_waiting(&self);

    /// Take control of all open application contexts immediately.
    async fn claim(&self);

    /// Display a notification to the user.
    async fn show_notification(&self, notification: Notification);
}

/// A notification descriptor built from a push payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
}
