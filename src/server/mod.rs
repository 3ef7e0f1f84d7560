//! Server Engine: handler registry, built-in request catalogue, and
//! datagram-accept loop, built on `tokio::net::UnixDatagram`.

use crate::config::ServerConfig;
use crate::error::{ErrorCode, JsonRpcError, Result};
use crate::events::{Event, EventBus};
use crate::manifest::{Manifest, ManifestParser, RESERVED_REQUESTS};
use crate::protocol::{Request, Response};
use crate::security::SecurityConfig;
use crate::transport::DatagramTransport;
use crate::util::{PathUtils, TimeUtils};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::UnixDatagram;
use tokio::sync::{RwLock, Semaphore};

/// Server lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Created,
    Listening,
    Draining,
    Closed,
}

/// Server-side bookkeeping for one observed client.
#[derive(Debug, Clone)]
pub struct ClientActivity {
    pub address: String,
    pub last_activity: std::time::SystemTime,
    pub request_count: u64,
}

/// A boxed async handler: `(name, args) -> Result<Value>`. No `async_trait`
/// is used here — boxed closures returning boxed futures are sufficient.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value>> + Send>>;
pub type RequestHandler = Arc<dyn Fn(Option<HashMap<String, Value>>) -> HandlerFuture + Send + Sync>;

/// Aggregate counters surfaced by [`JanusServer::get_server_stats`].
#[derive(Debug, Clone, Default)]
pub struct ServerStats {
    pub listening: bool,
    pub active_handlers: usize,
    pub total_clients: usize,
    pub total_handlers: usize,
    pub socket_path: String,
}

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
const DRAIN_GRACE: Duration = Duration::from_secs(30);

/// Manifest-driven request/response RPC server over a Unix datagram socket.
pub struct JanusServer {
    config: ServerConfig,
    security: SecurityConfig,
    manifest: RwLock<Manifest>,
    handlers: RwLock<HashMap<String, RequestHandler>>,
    clients: RwLock<HashMap<String, ClientActivity>>,
    events: Arc<EventBus>,
    state: RwLock<ServerState>,
    active_handlers: Arc<AtomicUsize>,
    total_requests: Arc<AtomicUsize>,
    concurrency: Arc<Semaphore>,
}

impl JanusServer {
    pub fn new(config: ServerConfig, manifest: Manifest) -> Result<Self> {
        config.validate().map_err(|e| JsonRpcError::new(ErrorCode::InvalidRequest, Some(e)))?;
        ManifestParser::validate(&manifest)?;
        let concurrency = Arc::new(Semaphore::new(config.max_concurrent_handlers));
        Ok(Self {
            security: SecurityConfig::default(),
            manifest: RwLock::new(manifest),
            handlers: RwLock::new(HashMap::new()),
            clients: RwLock::new(HashMap::new()),
            events: Arc::new(EventBus::new()),
            state: RwLock::new(ServerState::Created),
            active_handlers: Arc::new(AtomicUsize::new(0)),
            total_requests: Arc::new(AtomicUsize::new(0)),
            concurrency,
            config,
        })
    }

    pub fn events(&self) -> Arc<EventBus> {
        self.events.clone()
    }

    pub async fn state(&self) -> ServerState {
        *self.state.read().await
    }

    /// Register a handler for a non-reserved, Manifest-declared (or ad hoc)
    /// request name. Reserved names are rejected — they are answered by the
    /// built-in catalogue and can never be overridden.
    pub async fn register_request_handler<F, Fut>(&self, name: impl Into<String>, handler: F) -> Result<()>
    where
        F: Fn(Option<HashMap<String, Value>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let name = name.into();
        if RESERVED_REQUESTS.contains(&name.as_str()) {
            return Err(JsonRpcError::new(
                ErrorCode::ValidationFailed,
                Some(format!("'{name}' is a reserved built-in request and cannot be overridden")),
            ));
        }
        let boxed: RequestHandler = Arc::new(move |args| Box::pin(handler(args)));
        self.handlers.write().await.insert(name, boxed);
        Ok(())
    }

    pub async fn unregister_request_handler(&self, name: &str) -> bool {
        self.handlers.write().await.remove(name).is_some()
    }

    pub async fn get_all_handlers(&self) -> Vec<String> {
        self.handlers.read().await.keys().cloned().collect()
    }

    pub async fn get_server_stats(&self) -> ServerStats {
        ServerStats {
            listening: *self.state.read().await == ServerState::Listening,
            active_handlers: self.active_handlers.load(Ordering::SeqCst),
            total_clients: self.clients.read().await.len(),
            total_handlers: self.handlers.read().await.len(),
            socket_path: self.config.socket_path.clone(),
        }
    }

    /// Drop clients whose last observed activity is older than `max_inactive`.
    pub async fn cleanup_inactive_clients(&self, max_inactive: Duration) {
        let cutoff = std::time::SystemTime::now() - max_inactive;
        self.clients.write().await.retain(|_, activity| activity.last_activity >= cutoff);
    }

    /// Bind the listening socket and serve requests until [`Self::shutdown`]
    /// is called. The dispatch order per datagram is `clientActivity` →
    /// `request` → handler → `response`.
    pub async fn listen(self: Arc<Self>) -> Result<()> {
        if self.config.cleanup_on_start {
            PathUtils::cleanup_socket_file(&self.config.socket_path);
        }
        PathUtils::ensure_socket_dir(&self.config.socket_path)?;
        let socket = UnixDatagram::bind(&self.config.socket_path).map_err(crate::error::TransportError::Io)?;
        *self.state.write().await = ServerState::Listening;
        log::info!("janus server listening on {}", self.config.socket_path);
        self.events.publish(Event::Listening);

        let mut buf = vec![0u8; self.config.max_message_size];
        loop {
            if *self.state.read().await != ServerState::Listening {
                break;
            }
            let (len, _) = match socket.recv_from(&mut buf).await {
                Ok(result) => result,
                Err(e) => {
                    self.events.publish(Event::Error { error: e.into() });
                    continue;
                }
            };
            self.handle_datagram(&buf[..len]).await;
        }

        if self.config.cleanup_on_shutdown {
            PathUtils::cleanup_socket_file(&self.config.socket_path);
        }
        *self.state.write().await = ServerState::Closed;
        log::info!("janus server stopped listening on {}", self.config.socket_path);
        Ok(())
    }

    async fn handle_datagram(self: &Arc<Self>, bytes: &[u8]) {
        let request = match DatagramTransport::parse_request(bytes) {
            Ok(request) => request,
            Err(error) => {
                self.events.publish(Event::Error { error });
                return;
            }
        };

        let client_addr = request.reply_to.clone().unwrap_or_else(|| "unknown".to_string());
        self.record_client_activity(&client_addr).await;

        if let Err(error) = request.validate(&self.security) {
            log::warn!("rejected malformed request from {client_addr}: {error}");
            if let Some(reply_to) = &request.reply_to {
                let response = Response::failure(request.id.clone(), error.clone());
                let _ = DatagramTransport::send_response(reply_to, &response, self.config.max_message_size).await;
            }
            self.events.publish(Event::Error { error });
            return;
        }

        self.total_requests.fetch_add(1, Ordering::SeqCst);
        log::debug!("dispatching request '{}' ({}) from {client_addr}", request.request, request.id);
        self.events.publish(Event::Request {
            request: request.clone(),
            client_addr: client_addr.clone(),
        });

        let server = self.clone();
        tokio::spawn(async move {
            server.dispatch(request, client_addr).await;
        });
    }

    async fn record_client_activity(&self, address: &str) {
        let mut clients = self.clients.write().await;
        let entry = clients.entry(address.to_string()).or_insert_with(|| ClientActivity {
            address: address.to_string(),
            last_activity: std::time::SystemTime::now(),
            request_count: 0,
        });
        entry.last_activity = std::time::SystemTime::now();
        entry.request_count += 1;
        self.events.publish(Event::ClientActivity {
            address: address.to_string(),
            when: TimeUtils::now_iso8601(),
        });
    }

    /// Race the resolved handler (built-in or registered) against the
    /// request's timeout, enforcing the concurrency cap and always decrementing
    /// `active_handlers` on every exit path.
    async fn dispatch(self: Arc<Self>, request: Request, client_addr: String) {
        let permit = match self.concurrency.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                if let Some(reply_to) = &request.reply_to {
                    let error = JsonRpcError::new(
                        ErrorCode::ResourceLimitExceeded,
                        Some("server is at its concurrent-handler limit".to_string()),
                    );
                    let response = Response::failure(request.id.clone(), error);
                    let _ =
                        DatagramTransport::send_response(reply_to, &response, self.config.max_message_size).await;
                }
                return;
            }
        };

        self.active_handlers.fetch_add(1, Ordering::SeqCst);
        let timeout = Duration::from_secs_f64(request.timeout.unwrap_or(self.config.default_timeout.as_secs_f64()));

        let outcome = tokio::time::timeout(timeout, self.run_handler(&request)).await;

        let response = match outcome {
            Ok(Ok(result)) => Response::success(request.id.clone(), result),
            Ok(Err(error)) => Response::failure(request.id.clone(), error),
            Err(_) => {
                log::warn!("request '{}' ({}) timed out after {:?}", request.request, request.id, timeout);
                Response::failure(
                    request.id.clone(),
                    JsonRpcError::new(
                        ErrorCode::HandlerTimeout,
                        Some(format!("handler exceeded its {:?} timeout", timeout)),
                    ),
                )
            }
        };

        if let Some(reply_to) = &request.reply_to {
            if let Err(error) =
                DatagramTransport::send_response(reply_to, &response, self.config.max_message_size).await
            {
                self.events.publish(Event::Error { error });
            } else {
                self.events.publish(Event::Response {
                    response: response.clone(),
                    client_addr,
                });
            }
        }

        self.active_handlers.fetch_sub(1, Ordering::SeqCst);
        drop(permit);
    }

    async fn run_handler(&self, request: &Request) -> Result<Value> {
        if let Some(result) = self.run_builtin(request).await {
            return result;
        }
        let handler = {
            let handlers = self.handlers.read().await;
            handlers.get(&request.request).cloned()
        };
        match handler {
            Some(handler) => handler(request.args.clone()).await,
            None => Err(JsonRpcError::new(
                ErrorCode::MethodNotFound,
                Some(format!("no handler registered for request '{}'", request.request)),
            )),
        }
    }

    /// The built-in request catalogue. Returns `None` when
    /// `request.request` does not name a built-in, so the caller falls
    /// through to the registered-handler lookup.
    async fn run_builtin(&self, request: &Request) -> Option<Result<Value>> {
        match request.request.as_str() {
            "ping" => Some(Ok(json!({"message": "pong", "timestamp": TimeUtils::now_iso8601()}))),
            "echo" => {
                let message = request
                    .args
                    .as_ref()
                    .and_then(|a| a.get("message"))
                    .cloned()
                    .unwrap_or_else(|| json!("echo"));
                Some(Ok(json!({"message": message, "timestamp": TimeUtils::now_iso8601()})))
            }
            "get_info" => {
                let stats = self.get_server_stats().await;
                Some(Ok(json!({
                    "server": "janus-rpc",
                    "version": SERVER_VERSION,
                    "timestamp": TimeUtils::now_iso8601(),
                    "listening": stats.listening,
                    "activeHandlers": stats.active_handlers,
                    "totalClients": stats.total_clients,
                    "totalHandlers": stats.total_handlers,
                    "socketPath": stats.socket_path,
                })))
            }
            "manifest" => {
                let manifest = self.manifest.read().await;
                Some(serde_json::to_value(&*manifest).map_err(JsonRpcError::from))
            }
            "validate" => Some(Ok(json!({
                "valid": true,
                "received": request.args,
                "timestamp": TimeUtils::now_iso8601(),
            }))),
            "slow_process" => {
                let duration_ms = request
                    .args
                    .as_ref()
                    .and_then(|a| a.get("duration"))
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0);
                tokio::time::sleep(Duration::from_millis(duration_ms)).await;
                Some(Ok(json!({
                    "completed": true,
                    "durationMs": duration_ms,
                    "timestamp": TimeUtils::now_iso8601(),
                })))
            }
            _ => None,
        }
    }

    /// Enter the `draining` state, wait up to [`DRAIN_GRACE`] for in-flight
    /// handlers to finish, then stop listening and unlink the socket.
    pub async fn shutdown(&self) {
        *self.state.write().await = ServerState::Draining;
        let deadline = Instant::now() + DRAIN_GRACE;
        while self.active_handlers.load(Ordering::SeqCst) > 0 && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        *self.state.write().await = ServerState::Closed;
        if self.config.cleanup_on_shutdown {
            PathUtils::cleanup_socket_file(&self.config.socket_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ServerConfig {
        let dir = tempfile::Builder::new().prefix("janus_srv_test_").tempdir().unwrap().into_path();
        ServerConfig::new(dir.join("janus.sock").to_string_lossy().into_owned())
    }

    #[tokio::test]
    async fn reserved_names_cannot_be_registered() {
        let server = JanusServer::new(test_config(), Manifest::empty("1.0.0")).unwrap();
        let result = server.register_request_handler("ping", |_| async { Ok(json!(null)) }).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn builtin_ping_returns_pong() {
        let server = JanusServer::new(test_config(), Manifest::empty("1.0.0")).unwrap();
        let request = Request::new("ping", None);
        let result = server.run_builtin(&request).await.unwrap().unwrap();
        assert_eq!(result["message"], json!("pong"));
    }

    #[tokio::test]
    async fn builtin_echo_defaults_message() {
        let server = JanusServer::new(test_config(), Manifest::empty("1.0.0")).unwrap();
        let request = Request::new("echo", None);
        let result = server.run_builtin(&request).await.unwrap().unwrap();
        assert_eq!(result["message"], json!("echo"));
    }

    #[tokio::test]
    async fn unregistered_non_builtin_is_method_not_found() {
        let server = JanusServer::new(test_config(), Manifest::empty("1.0.0")).unwrap();
        let request = Request::new("does_not_exist", None);
        let error = server.run_handler(&request).await.unwrap_err();
        assert_eq!(error.code, ErrorCode::MethodNotFound.code());
    }

    #[tokio::test]
    async fn registered_handler_is_invoked() {
        let server = JanusServer::new(test_config(), Manifest::empty("1.0.0")).unwrap();
        server
            .register_request_handler("double", |args| async move {
                let n = args.and_then(|a| a.get("n").and_then(|v| v.as_i64())).unwrap_or(0);
                Ok(json!(n * 2))
            })
            .await
            .unwrap();
        let mut args = HashMap::new();
        args.insert("n".to_string(), json!(21));
        let request = Request::new("double", Some(args));
        let result = server.run_handler(&request).await.unwrap();
        assert_eq!(result, json!(42));
    }
}
