//! Test doubles for the transport and the host.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use swcache_client::{FetchError, Transport};
use swcache_core::{CacheStore, Error, Request, Response};
use url::Url;

use crate::host::{Host, Notification};

#[derive(Clone)]
enum Behavior {
    Respond(Response),
    Delay(Duration, Response),
    Fail,
    Hang,
}

/// Scripted transport: per-URL behavior, defaulting to `200 OK` with the
/// URL as body. Counts every exchange.
#[derive(Default)]
pub(crate) struct FakeTransport {
    calls: AtomicUsize,
    per_url: Mutex<HashMap<String, usize>>,
    scripts: Mutex<HashMap<String, Behavior>>,
    offline: Mutex<bool>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, url: &str, response: Response) {
        self.script(url, Behavior::Respond(response));
    }

    pub(crate) fn respond_after(&self, url: &str, delay: Duration, response: Response) {
        self.script(url, Behavior::Delay(delay, response));
    }

    pub(crate) fn fail(&self, url: &str) {
        self.script(url, Behavior::Fail);
    }

    pub(crate) fn hang(&self, url: &str) {
        self.script(url, Behavior::Hang);
    }

    /// Fail every exchange regardless of scripts.
    pub(crate) fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn calls_for(&self, url: &str) -> usize {
        let key = normalize(url);
        self.per_url.lock().unwrap().get(&key).copied().unwrap_or(0)
    }

    fn script(&self, url: &str, behavior: Behavior) {
        self.scripts.lock().unwrap().insert(normalize(url), behavior);
    }
}

fn normalize(url: &str) -> String {
    Url::parse(url).map(|u| u.to_string()).unwrap_or_else(|_| url.to_string())
}

#[async_trait]
impl Transport for FakeTransport {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let key = request.url.to_string();
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.per_url.lock().unwrap().entry(key.clone()).or_default() += 1;

        if *self.offline.lock().unwrap() {
            return Err(FetchError::Offline);
        }

        let behavior = self.scripts.lock().unwrap().get(&key).cloned();
        match behavior {
            Some(Behavior::Respond(response)) => Ok(response),
            Some(Behavior::Delay(delay, response)) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            Some(Behavior::Fail) => Err(FetchError::Offline),
            Some(Behavior::Hang) => std::future::pending().await,
            None => Ok(Response::new(200, "OK", key)),
        }
    }
}

/// Store whose every operation fails.
pub(crate) struct BrokenStore;

fn unavailable() -> Error {
    Error::InvalidInput("store unavailable".into())
}

#[async_trait]
impl CacheStore for BrokenStore {
    async fn open(&self, _namespace: &str) -> Result<(), Error> {
        Err(unavailable())
    }

    async fn has(&self, _namespace: &str) -> Result<bool, Error> {
        Err(unavailable())
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        Err(unavailable())
    }

    async fn delete(&self, _namespace: &str) -> Result<bool, Error> {
        Err(unavailable())
    }

    async fn match_request(&self, _namespace: &str, _request: &Request) -> Result<Option<Response>, Error> {
        Err(unavailable())
    }

    async fn put(&self, _namespace: &str, _request: &Request, _response: &Response) -> Result<(), Error> {
        Err(unavailable())
    }

    async fn entry_count(&self, _namespace: &str) -> Result<usize, Error> {
        Err(unavailable())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HostCall {
    SkipWaiting,
    Claim,
    Notify(Notification),
}

/// Host that records every capability invocation.
#[derive(Default)]
pub(crate) struct RecordingHost {
    calls: Mutex<Vec<HostCall>>,
}

impl RecordingHost {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Host for RecordingHost {
    async fn skip_waiting(&self) {
        self.calls.lock().unwrap().push(HostCall::SkipWaiting);
    }

    async fn claim(&self) {
        self.calls.lock().unwrap().push(HostCall::Claim);
    }

    async fn show_notification(&self, notification: Notification) {
        self.calls.lock().unwrap().push(HostCall::Notify(notification));
    }
}

pub(crate) fn get(url: &str) -> Request {
    Request::get(Url::parse(url).unwrap())
}

pub(crate) fn ok(body: &'static str) -> Response {
    Response::new(200, "OK", body)
}
