//! # locapub-store
//!
//! Session-scoped, best-effort key/value cache for the Locapub client.
//!
//! Callers depend on the [`CacheStore`] trait only. Two backends exist: an
//! in-memory map for tests and ephemeral runs, and a SQLite file where each
//! client session writes under its own namespace. Both enforce a byte quota;
//! a write past the quota fails with [`StoreError::QuotaExceeded`], which
//! callers are expected to log and ignore.

pub mod cache;
pub mod database;
pub mod memory;
pub mod migrations;

mod error;

pub use cache::CacheStore;
pub use database::SqliteStore;
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
