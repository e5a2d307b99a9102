//! Control messages and notification hooks.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::host::{Host, Notification};

const DEFAULT_TITLE: &str = "New notification";
const DEFAULT_BODY: &str = "You have a new update.";
const DEFAULT_ICON: &str = "/icons/icon-192.png";

/// Reply side of a message's channel.
pub type ReplyPort = oneshot::Sender<String>;

/// Recognized control tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    ForceActivate,
    GetVersion,
}

impl ControlMessage {
    /// Parse a message payload. Only the exact string tokens are recognized.
    pub fn parse(data: &Value) -> Option<Self> {
        match data.as_str()? {
            "force-activate" => Some(Self::ForceActivate),
            "get-version" => Some(Self::GetVersion),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PushPayload {
    title: Option<String>,
    body: Option<String>,
}

pub struct ControlChannel {
    host: Arc<dyn Host>,
    version: String,
}

impl ControlChannel {
    /// `version` is the identifier reported to version queries.
    pub fn new(host: Arc<dyn Host>, version: impl Into<String>) -> Self {
        Self { host, version: version.into() }
    }

    /// Handle a control message, replying on `reply` where the message
    /// expects an answer.
    pub async fn handle_message(&self, data: &Value, reply: Option<ReplyPort>) {
        match ControlMessage::parse(data) {
            Some(ControlMessage::ForceActivate) => {
                tracing::info!("force-activate requested");
                self.host.skip_waiting().await;
            }
            Some(ControlMessage::GetVersion) => match reply {
                Some(port) => {
                    if port.send(self.version.clone()).is_err() {
                        tracing::debug!("version reply dropped; requester went away");
                    }
                }
                None => tracing::debug!("version query without a reply channel"),
            },
            None => tracing::debug!(data = %data, "ignoring unrecognized message"),
        }
    }

    /// Build a notification from an optional JSON payload and show it.
    pub async fn handle_push(&self, payload: Option<&str>) -> Notification {
        let payload = match payload {
            Some(text) => serde_json::from_str::<PushPayload>(text).unwrap_or_else(|e| {
                tracing::debug!(error = %e, "malformed push payload; using defaults");
                PushPayload::default()
            }),
            None => PushPayload::default(),
        };

        let notification = Notification {
            title: payload.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            body: payload.body.unwrap_or_else(|| DEFAULT_BODY.to_string()),
            icon: DEFAULT_ICON.to_string(),
        };

        self.host.show_notification(notification.clone()).await;
        notification
    }

    pub async fn handle_sync(&self, tag: &str) {
        tracing::info!(tag, "background sync requested");
    }
}
