//! swcache worker entry point.
//!
//! Reads host events as JSON lines on stdin and writes records on stdout.
//! Logging goes to stderr to avoid interfering with the protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use swcache_client::{FetchClient, FetchConfig};
use swcache_core::{AppConfig, CacheDb};
use swcache_worker::Worker;
use swcache_worker::host::{StdioHost, serve};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;

    tracing::info!(
        origin = %config.origin,
        precache = %config.precache_cache,
        runtime = %config.runtime_cache,
        db = %config.db_path.display(),
        "Starting swcache worker on stdio"
    );

    let store = CacheDb::open(&config.db_path).await?;
    let transport = FetchClient::new(FetchConfig::from(&config))?;
    let (host, records) = StdioHost::new();

    let worker = Worker::new(&config, Arc::new(store), Arc::new(transport), Arc::new(host.clone()))?;

    serve(Arc::new(worker), host, records, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;

    Ok(())
}
