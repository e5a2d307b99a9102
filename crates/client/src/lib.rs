//! Network transport for swcache.
//!
//! This crate provides the [`Transport`] seam the caching strategies use
//! for network exchanges, its reqwest implementation, and URL resolution
//! for the precache manifest.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig, FetchError, Transport, UrlError, resolve, resolve_manifest};
