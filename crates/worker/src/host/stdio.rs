//! JSON-lines host over stdin/stdout.
//!
//! ### Input
//! One event per line, tagged by `"type"`: `install`, `activate`, `fetch`,
//! `message`, `push`, `sync`. Lifecycle events and messages are handled
//! inline in arrival order; fetch events run as independent tasks.
//!
//! ### Output
//! One record per line. Records from concurrent fetches are written in
//! completion order. Response bodies are base64 (standard alphabet) so
//! binary assets survive the trip. Malformed input lines are logged and
//! skipped.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use swcache_core::Request;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;

use async_trait::async_trait;

use super::{Host, Notification};
use crate::error::WorkerError;
use crate::handler::{Event, Outcome, Worker};
use crate::router::FetchOutcome;

/// An event read from stdin.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Incoming {
    Install,
    Activate,
    Fetch {
        id: String,
        request: Request,
    },
    Message {
        data: Value,
        #[serde(default)]
        reply_to: Option<String>,
    },
    Push {
        #[serde(default)]
        data: Option<String>,
    },
    Sync {
        tag: String,
    },
}

/// A record written to stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outgoing {
    Installed { cached: usize, failed: Vec<String> },
    Activated { deleted: Vec<String> },
    Response { id: String, status: u16, status_text: String, headers: Vec<(String, String)>, body: String },
    Passthrough { id: String },
    Reply { reply_to: String, data: String },
    SkipWaiting,
    Claim,
    Notification(Notification),
}

impl Outgoing {
    fn from_fetch(id: String, outcome: FetchOutcome) -> Self {
        match outcome {
            FetchOutcome::PassThrough => Outgoing::Passthrough { id },
            FetchOutcome::Respond(response) => Outgoing::Response {
                id,
                status: response.status,
                status_text: response.status_text,
                headers: response.headers,
                body: STANDARD.encode(&response.body),
            },
        }
    }
}

/// Host whose capabilities become output records.
#[derive(Debug, Clone)]
pub struct StdioHost {
    tx: mpsc::UnboundedSender<Outgoing>,
}

impl StdioHost {
    /// Create a host and the receiver its records arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Outgoing>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, record: Outgoing) {
        if self.tx.send(record).is_err() {
            tracing::debug!("output channel closed; dropping record");
        }
    }
}

#[async_trait]
impl Host for StdioHost {
    async fn skip_waiting(&self) {
        self.send(Outgoing::SkipWaiting);
    }

    async fn claim(&self) {
        self.send(Outgoing::Claim);
    }

    async fn show_notification(&self, notification: Notification) {
        self.send(Outgoing::Notification(notification));
    }
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Incoming>, WorkerError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some).map_err(|e| WorkerError::MalformedEvent(e.to_string()))
}

async fn write_record<W: AsyncWrite + Unpin>(writer: &mut W, record: &Outgoing) -> Result<(), WorkerError> {
    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}

/// Run the event loop until `reader` reaches end of input, then wait for
/// in-flight fetches and background refreshes and flush every pending
/// record.
///
/// # Errors
///
/// Returns `WorkerError::Io` if reading input or writing output fails.
pub async fn serve<R, W>(
    worker: Arc<Worker>, host: StdioHost, mut records: mpsc::UnboundedReceiver<Outgoing>, reader: R, mut writer: W,
) -> Result<(), WorkerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut fetches = JoinSet::new();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_line(&line) {
                    Ok(Some(incoming)) => handle(&worker, &host, &mut fetches, incoming).await,
                    Ok(None) => {}
                    Err(e) => tracing::warn!(error = %e, "skipping input line"),
                }
            }
            Some(record) = records.recv() => write_record(&mut writer, &record).await?,
            Some(joined) = fetches.join_next(), if !fetches.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!(error = %e, "fetch task failed");
                }
            }
        }
    }

    while let Some(joined) = fetches.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "fetch task failed");
        }
    }
    worker.shutdown().await;
    while let Ok(record) = records.try_recv() {
        write_record(&mut writer, &record).await?;
    }

    tracing::info!("input closed; event loop finished");
    Ok(())
}

async fn handle(worker: &Arc<Worker>, host: &StdioHost, fetches: &mut JoinSet<()>, incoming: Incoming) {
    match incoming {
        Incoming::Install => {
            if let Outcome::Installed(report) = worker.dispatch(Event::Install).await {
                host.send(Outgoing::Installed { cached: report.cached, failed: report.failed });
            }
        }
        Incoming::Activate => {
            if let Outcome::Activated(deleted) = worker.dispatch(Event::Activate).await {
                host.send(Outgoing::Activated { deleted });
            }
        }
        Incoming::Fetch { id, request } => {
            let worker = Arc::clone(worker);
            let host = host.clone();
            fetches.spawn(async move {
                if let Outcome::Fetch(outcome) = worker.dispatch(Event::Fetch(request)).await {
                    host.send(Outgoing::from_fetch(id, outcome));
                }
            });
        }
        Incoming::Message { data, reply_to } => {
            let Some(reply_to) = reply_to else {
                worker.dispatch(Event::Message { data, reply: None }).await;
                return;
            };
            let (tx, rx) = oneshot::channel();
            worker.dispatch(Event::Message { data, reply: Some(tx) }).await;
            if let Ok(data) = rx.await {
                host.send(Outgoing::Reply { reply_to, data });
            }
        }
        Incoming::Push { data } => {
            worker.dispatch(Event::Push(data)).await;
        }
        Incoming::Sync { tag } => {
            worker.dispatch(Event::Sync(tag)).await;
        }
    }
}
