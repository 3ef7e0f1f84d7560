//! # janus
//!
//! A Manifest-driven request/response RPC runtime over Unix domain datagram
//! sockets. Every exchange is one JSON datagram out, at most one JSON
//! datagram back — there is no persistent connection, no multiplexed stream,
//! and no connection pool to manage.
//!
//! ## Components
//!
//! - [`security`] — the pure validator gating every exterior string and size.
//! - [`manifest`] — the typed contract describing a server's requests and
//!   models, plus the parser and response validator built on top of it.
//! - [`protocol`] — the `Request`/`Response` wire envelopes.
//! - [`transport`] — the async datagram send/receive layer.
//! - [`client`] — [`JanusClient`], the connectionless RPC caller.
//! - [`server`] — [`JanusServer`], the handler-registry-driven RPC responder.
//! - [`events`] — the synchronous pub/sub surface for server lifecycle events.
//! - [`config`] — typed, validated configuration for both engines.
//! - [`error`] — the JSON-RPC 2.0 compatible error taxonomy.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use janus::prelude::*;
//! use janus::manifest::Manifest;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Arc::new(JanusServer::new(
//!         ServerConfig::new("/tmp/janus_demo.sock"),
//!         Manifest::empty("1.0.0"),
//!     )?);
//!     server
//!         .register_request_handler("double", |args| async move {
//!             let n = args.and_then(|a| a.get("n").and_then(|v| v.as_i64())).unwrap_or(0);
//!             Ok(json!(n * 2))
//!         })
//!         .await?;
//!
//!     let client = JanusClient::new(ClientConfig::new("/tmp/janus_demo.sock"))?;
//!     let _ = client.ping().await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod manifest;
pub mod protocol;
pub mod security;
pub mod server;
pub mod transport;
pub mod util;

pub use client::JanusClient;
pub use config::{ClientConfig, SecurityConfig, ServerConfig};
pub use error::{ErrorCode, JsonRpcError, Result};
pub use events::{Event, EventBus};
pub use manifest::{Manifest, ManifestParser, ResponseValidator};
pub use protocol::{Request, Response};
pub use security::SecurityValidator;
pub use server::JanusServer;

/// Convenience re-exports for applications built on top of this crate.
pub mod prelude {
    pub use crate::client::JanusClient;
    pub use crate::config::{ClientConfig, ServerConfig};
    pub use crate::error::{ErrorCode, JsonRpcError, Result};
    pub use crate::manifest::{Argument, Manifest, ManifestParser, Model, RequestSpec};
    pub use crate::protocol::{Request, Response};
    pub use crate::server::JanusServer;
}

/// Crate version, matching `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name, matching `Cargo.toml`.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_info_is_populated() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "janus-rpc");
    }
}
