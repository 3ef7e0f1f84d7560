//! Datagram Transport: the async Unix-domain datagram transport layer, built
//! on `tokio::net::UnixDatagram`. Provides a small send/receive/reply-socket
//! API shared by both the client and server engines.

use crate::error::{JsonRpcError, Result, TransportError};
use crate::protocol::{Request, Response};
use crate::util::PathUtils;
use std::time::Duration;
use tokio::net::UnixDatagram;

/// A bound, ephemeral reply socket owned by one outstanding client call.
/// Unlinked on every exit path via [`ReplySocket::close`] or `Drop`.
pub struct ReplySocket {
    socket: UnixDatagram,
    path: String,
}

impl ReplySocket {
    pub fn bind() -> Result<Self> {
        let path = PathUtils::generate_reply_socket_path();
        PathUtils::ensure_socket_dir(&path)?;
        let socket = UnixDatagram::bind(&path).map_err(TransportError::Io)?;
        Ok(Self { socket, path })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Await exactly one reply datagram, or time out. The client never
    /// waits for a second datagram on this socket.
    pub async fn recv_one(&self, max_message_size: usize, timeout: Duration) -> Result<Response> {
        let mut buf = vec![0u8; max_message_size];
        let len = tokio::time::timeout(timeout, self.socket.recv(&mut buf))
            .await
            .map_err(|_| TransportError::Timeout(timeout))?
            .map_err(TransportError::Io)?;
        let response: Response = serde_json::from_slice(&buf[..len])?;
        Ok(response)
    }

    pub fn close(self) {
        // Explicit drop makes the unlink-on-exit intent visible at call sites.
        drop(self);
    }
}

impl Drop for ReplySocket {
    fn drop(&mut self) {
        PathUtils::cleanup_socket_file(&self.path);
    }
}

/// Stateless send/receive helpers shared by the client and server engines.
pub struct DatagramTransport;

impl DatagramTransport {
    /// Send `request` to `socket_path` from an unbound (client-side) datagram socket.
    pub async fn send_request(socket_path: &str, request: &Request, max_message_size: usize) -> Result<()> {
        let payload = serde_json::to_vec(request)?;
        if payload.len() > max_message_size {
            return Err(TransportError::MessageTooLarge(payload.len(), max_message_size).into());
        }
        let socket = UnixDatagram::unbound().map_err(TransportError::Io)?;
        socket.send_to(&payload, socket_path).await.map_err(TransportError::Io)?;
        Ok(())
    }

    /// Send `response` to the reply path named in the originating request, if any.
    pub async fn send_response(reply_to: &str, response: &Response, max_message_size: usize) -> Result<()> {
        let payload = serde_json::to_vec(response)?;
        if payload.len() > max_message_size {
            return Err(TransportError::MessageTooLarge(payload.len(), max_message_size).into());
        }
        let socket = UnixDatagram::unbound().map_err(TransportError::Io)?;
        socket.send_to(&payload, reply_to).await.map_err(TransportError::Io)?;
        Ok(())
    }

    /// Parse an inbound request datagram, surfacing malformed JSON/shape as `ParseError`.
    pub fn parse_request(bytes: &[u8]) -> Result<Request> {
        crate::security::SecurityValidator::validate_utf8(bytes)?;
        let request: Request = serde_json::from_slice(bytes).map_err(JsonRpcError::from)?;
        Ok(request)
    }
}
