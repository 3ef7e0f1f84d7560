//! Typed configuration for the server and client engines.
//!
//! Plain structs with a `Default` impl carrying the runtime's baseline
//! defaults and a `validate()` pass that rejects degenerate values eagerly,
//! before they reach the runtime.

pub use crate::security::SecurityConfig;
use std::time::Duration;

/// Configuration for [`crate::server::JanusServer`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub socket_path: String,
    pub default_timeout: Duration,
    pub max_message_size: usize,
    pub cleanup_on_start: bool,
    pub cleanup_on_shutdown: bool,
    pub max_concurrent_handlers: usize,
}

impl ServerConfig {
    pub fn new(socket_path: impl Into<String>) -> Self {
        Self {
            socket_path: socket_path.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.socket_path.is_empty() {
            return Err("socket_path must not be empty".to_string());
        }
        if self.max_message_size == 0 {
            return Err("max_message_size must be greater than 0".to_string());
        }
        if self.max_concurrent_handlers == 0 {
            return Err("max_concurrent_handlers must be greater than 0".to_string());
        }
        if self.default_timeout.is_zero() {
            return Err("default_timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            socket_path: String::new(),
            default_timeout: Duration::from_secs(30),
            max_message_size: 64 * 1024,
            cleanup_on_start: true,
            cleanup_on_shutdown: true,
            max_concurrent_handlers: 100,
        }
    }
}

/// Configuration for [`crate::client::JanusClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub socket_path: String,
    pub default_timeout: Duration,
    pub datagram_timeout: Duration,
    pub max_message_size: usize,
    pub enable_validation: bool,
    pub connection_timeout: Duration,
    pub max_pending_requests: usize,
}

impl ClientConfig {
    pub fn new(socket_path: impl Into<String>) -> Self {
        Self {
            socket_path: socket_path.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.socket_path.is_empty() {
            return Err("socket_path must not be empty".to_string());
        }
        if self.max_message_size == 0 {
            return Err("max_message_size must be greater than 0".to_string());
        }
        if self.max_pending_requests == 0 {
            return Err("max_pending_requests must be greater than 0".to_string());
        }
        if self.default_timeout.is_zero() || self.datagram_timeout.is_zero() {
            return Err("timeouts must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            socket_path: String::new(),
            default_timeout: Duration::from_secs(30),
            datagram_timeout: Duration::from_secs(5),
            max_message_size: 64 * 1024,
            enable_validation: true,
            connection_timeout: Duration::from_secs(10),
            max_pending_requests: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_and_client_defaults_are_sane() {
        let server = ServerConfig::default();
        assert_eq!(server.default_timeout, Duration::from_secs(30));
        assert_eq!(server.max_message_size, 64 * 1024);
        assert_eq!(server.max_concurrent_handlers, 100);

        let client = ClientConfig::default();
        assert_eq!(client.datagram_timeout, Duration::from_secs(5));
        assert_eq!(client.max_pending_requests, 1000);
    }

    #[test]
    fn validate_rejects_zeroed_fields() {
        let mut server = ServerConfig::new("/tmp/janus.sock");
        server.max_concurrent_handlers = 0;
        assert!(server.validate().is_err());
    }
}
