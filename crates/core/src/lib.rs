//! Core types and shared functionality for swcache.
//!
//! This crate provides:
//! - Request/response model shared by the store and the transport
//! - Namespace store trait with SQLite and in-memory backends
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;

pub use cache::{CacheDb, CacheStore, MemoryStore};
pub use config::{AppConfig, CacheNames};
pub use error::Error;
pub use http::{Request, Response};
