//! # locapub-server
//!
//! Development backend for the Locapub client.
//!
//! Implements the webhook endpoints the client calls (content generation,
//! support and campaign records, campaign distribution) over an in-memory
//! store, with the same wire format and error convention as the production
//! service. Used for local development and end-to-end tests.

pub mod api;
pub mod config;
pub mod error;
pub mod generate;
pub mod records;

pub use api::{build_router, serve, serve_listener, AppState};
pub use config::ServerConfig;
pub use error::ServerError;
