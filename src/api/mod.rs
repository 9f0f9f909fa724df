//! HTTP API module.
//!
//! This module provides the HTTP server, API types, and the import
//! progress event stream.

pub mod events;
pub mod server;
pub mod types;

pub use events::*;
pub use server::start_server;
pub use types::*;
