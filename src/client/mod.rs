//! Client Engine: lazy Manifest fetch-and-cache plus a correlation check on
//! every reply, addressed by a flat request name rather than channel+command.

use crate::config::ClientConfig;
use crate::error::{ErrorCode, JsonRpcError, Result};
use crate::manifest::{Manifest, ResponseValidator, RESERVED_REQUESTS};
use crate::protocol::{Request, Response};
use crate::security::SecurityConfig;
use crate::transport::{DatagramTransport, ReplySocket};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// A connectionless RPC client bound to one server socket path.
///
/// Owns no persistent connection — every call opens a fresh unbound sending
/// socket and, when a reply is expected, a fresh ephemeral reply socket that
/// is torn down on every exit path (success, failure, or timeout).
pub struct JanusClient {
    config: ClientConfig,
    security: SecurityConfig,
    manifest: RwLock<Option<Manifest>>,
}

impl JanusClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate().map_err(|e| JsonRpcError::new(ErrorCode::InvalidRequest, Some(e)))?;
        Ok(Self {
            config,
            security: SecurityConfig::default(),
            manifest: RwLock::new(None),
        })
    }

    /// Send a request and await exactly one correlated reply, or time out.
    pub async fn send_request(
        &self,
        request_name: &str,
        args: Option<HashMap<String, Value>>,
        timeout: Option<f64>,
    ) -> Result<Response> {
        if self.config.enable_validation {
            self.ensure_manifest_loaded().await?;
            self.validate_against_manifest(request_name, &args).await?;
        }

        let mut request = Request::new(request_name, args);
        if let Some(timeout) = timeout {
            request = request.with_timeout(timeout);
        }
        request.validate(&self.security)?;

        let reply_socket = ReplySocket::bind()?;
        let mut wire_request = request.clone();
        wire_request.reply_to = Some(reply_socket.path().to_string());

        DatagramTransport::send_request(&self.config.socket_path, &wire_request, self.config.max_message_size)
            .await?;

        let wait = timeout
            .map(Duration::from_secs_f64)
            .unwrap_or(self.config.default_timeout);
        let response = reply_socket.recv_one(self.config.max_message_size, wait).await?;

        if !response.correlates_with(&wire_request) {
            log::error!(
                "correlation mismatch: expected request_id {}, got {}",
                wire_request.id,
                response.request_id
            );
            return Err(JsonRpcError::new(
                ErrorCode::ValidationFailed,
                Some(format!(
                    "CORRELATION_MISMATCH: expected request_id {}, got {}",
                    wire_request.id, response.request_id
                )),
            ));
        }

        Ok(response)
    }

    /// Send a request with no reply socket attached; the server still
    /// processes it, but no datagram is awaited.
    pub async fn send_request_no_response(
        &self,
        request_name: &str,
        args: Option<HashMap<String, Value>>,
    ) -> Result<()> {
        if self.config.enable_validation {
            self.ensure_manifest_loaded().await?;
            self.validate_against_manifest(request_name, &args).await?;
        }
        let request = Request::new(request_name, args);
        request.validate(&self.security)?;
        DatagramTransport::send_request(&self.config.socket_path, &request, self.config.max_message_size).await
    }

    /// Convenience: `sendRequest("ping", …, timeout=10s)`.
    pub async fn ping(&self) -> Result<bool> {
        let response = self.send_request("ping", None, Some(10.0)).await?;
        Ok(response.success)
    }

    /// Fire a `ping` and report whether a well-formed reply arrived in time.
    pub async fn test_connection(&self) -> bool {
        self.ping().await.unwrap_or(false)
    }

    /// Fetch and cache the server's Manifest via the `manifest` built-in, if
    /// not already cached. Subsequent calls are a cheap cache read.
    pub async fn ensure_manifest_loaded(&self) -> Result<()> {
        if self.manifest.read().await.is_some() {
            return Ok(());
        }
        let mut guard = self.manifest.write().await;
        if guard.is_some() {
            return Ok(());
        }
        let request = Request::new("manifest", None).with_timeout(10.0);
        let reply_socket = ReplySocket::bind()?;
        let mut wire_request = request.clone();
        wire_request.reply_to = Some(reply_socket.path().to_string());
        DatagramTransport::send_request(&self.config.socket_path, &wire_request, self.config.max_message_size)
            .await?;
        let response = reply_socket
            .recv_one(self.config.max_message_size, Duration::from_secs(10))
            .await?;
        let manifest_value = response
            .result
            .ok_or_else(|| JsonRpcError::new(ErrorCode::InternalError, Some("manifest fetch returned no result".into())))?;
        let manifest: Manifest = serde_json::from_value(manifest_value)?;
        log::debug!("fetched and cached manifest from {}", self.config.socket_path);
        *guard = Some(manifest);
        Ok(())
    }

    /// Explicitly replace the cached Manifest, e.g. after a known server restart.
    pub async fn set_manifest(&self, manifest: Manifest) {
        *self.manifest.write().await = Some(manifest);
    }

    async fn validate_against_manifest(
        &self,
        request_name: &str,
        args: &Option<HashMap<String, Value>>,
    ) -> Result<()> {
        let guard = self.manifest.read().await;
        let Some(manifest) = guard.as_ref() else {
            return Ok(());
        };
        let Some(spec) = manifest.requests.get(request_name) else {
            if RESERVED_REQUESTS.contains(&request_name) {
                return Ok(());
            }
            return Err(JsonRpcError::new(
                ErrorCode::MethodNotFound,
                Some(format!("'{request_name}' is not declared in the server's Manifest")),
            ));
        };
        let provided = args.clone().unwrap_or_default();
        for (arg_name, arg_schema) in &spec.args {
            match provided.get(arg_name) {
                Some(value) => {
                    let result = ResponseValidator::validate(value, arg_schema, manifest);
                    if !result.is_valid() {
                        let first = &result.errors[0];
                        return Err(JsonRpcError::validation_error(
                            first.field.clone(),
                            serde_json::Value::Null,
                            first.message.clone(),
                        ));
                    }
                }
                None if arg_schema.required => {
                    return Err(JsonRpcError::new(
                        ErrorCode::InvalidParams,
                        Some(format!("required argument '{arg_name}' is missing")),
                    ));
                }
                None => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{ArgType, Argument, RequestSpec};

    #[test]
    fn new_rejects_invalid_config() {
        let config = ClientConfig::new("");
        assert!(JanusClient::new(config).is_err());
    }

    fn required_string_arg() -> Argument {
        Argument {
            arg_type: ArgType::String,
            required: true,
            description: None,
            default: None,
            min_length: None,
            max_length: None,
            pattern: None,
            minimum: None,
            maximum: None,
            enum_values: None,
            items: None,
            properties: None,
            model_ref: None,
        }
    }

    async fn client_with_manifest_request(name: &str, arg_name: &str) -> JanusClient {
        let client = JanusClient::new(ClientConfig::new("/tmp/janus-client-test.sock")).unwrap();
        let mut requests = HashMap::new();
        let mut args = HashMap::new();
        args.insert(arg_name.to_string(), required_string_arg());
        requests.insert(
            name.to_string(),
            RequestSpec {
                description: Some("test request".into()),
                args,
                response: required_string_arg(),
                timeout: None,
                error_codes: None,
                channel: None,
            },
        );
        client
            .set_manifest(Manifest {
                version: "1.0.0".into(),
                name: None,
                description: None,
                requests,
                models: None,
            })
            .await;
        client
    }

    #[tokio::test]
    async fn unknown_request_against_loaded_manifest_is_method_not_found() {
        let client = client_with_manifest_request("greet", "name").await;
        let err = client.validate_against_manifest("does_not_exist", &None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MethodNotFound.code());
    }

    #[tokio::test]
    async fn reserved_request_against_loaded_manifest_is_allowed_through() {
        let client = client_with_manifest_request("greet", "name").await;
        assert!(client.validate_against_manifest("ping", &None).await.is_ok());
    }

    #[tokio::test]
    async fn missing_required_argument_is_invalid_params() {
        let client = client_with_manifest_request("greet", "name").await;
        let err = client.validate_against_manifest("greet", &None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams.code());
    }
}
