//! `Request`/`Response` wire envelopes: no `channelId`, the request name
//! travels directly as `request`.

use crate::error::JsonRpcError;
use crate::security::{NameKind, SecurityConfig, SecurityValidator};
use crate::util::{PathUtils, TimeUtils};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// One request datagram: at most `maxMessageSize` bytes of JSON, UTF-8.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Request {
    /// v4 UUID, unique per request; echoed back as the response's `request_id`.
    pub id: String,

    /// Name of the request being invoked (e.g. `"ping"` or a Manifest-declared name).
    pub request: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<HashMap<String, Value>>,

    /// Per-request timeout in seconds, overriding the server/client default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,

    pub timestamp: String,

    /// Filesystem path of an ephemeral reply socket; absence means fire-and-forget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

impl Request {
    /// Construct a request with a fresh `id` and current `timestamp`, no reply socket.
    pub fn new(request: impl Into<String>, args: Option<HashMap<String, Value>>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            request: request.into(),
            args,
            timeout: None,
            timestamp: TimeUtils::now_iso8601(),
            reply_to: None,
        }
    }

    pub fn with_timeout(mut self, timeout_secs: f64) -> Self {
        self.timeout = Some(timeout_secs);
        self
    }

    /// Attach a freshly generated ephemeral reply socket path.
    pub fn with_reply_to(mut self) -> Self {
        self.reply_to = Some(PathUtils::generate_reply_socket_path());
        self
    }

    pub fn expects_reply(&self) -> bool {
        self.reply_to.is_some()
    }

    /// Shape and security validation: `id` is a v4 UUID, `request` is a
    /// well-formed name, `timestamp` is a
    /// valid ISO-8601 instant, `reply_to` (when present) is a valid socket
    /// path, and the serialized message respects the configured size limits.
    pub fn validate(&self, config: &SecurityConfig) -> crate::error::Result<()> {
        SecurityValidator::validate_uuid(&self.id)?;
        SecurityValidator::validate_name(&self.request, NameKind::Request, config)?;
        SecurityValidator::validate_timestamp(&self.timestamp)?;
        if let Some(timeout) = self.timeout {
            SecurityValidator::validate_timeout(timeout, config)?;
        }
        if let Some(reply_to) = &self.reply_to {
            SecurityValidator::validate_socket_path(reply_to, config)?;
        }
        SecurityValidator::validate_args_size(&self.args, config)?;
        let value = serde_json::to_value(self)?;
        SecurityValidator::validate_message_content(&value, config)?;
        Ok(())
    }
}

/// One response datagram, carrying exactly one of `result`/`error`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Response {
    /// Echoes the originating request's `id`.
    pub request_id: String,

    /// Fresh UUID identifying this response itself.
    pub id: String,

    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,

    pub timestamp: String,
}

impl Response {
    pub fn success(request_id: impl Into<String>, result: Value) -> Self {
        Self {
            request_id: request_id.into(),
            id: Uuid::new_v4().to_string(),
            success: true,
            result: Some(result),
            error: None,
            timestamp: TimeUtils::now_iso8601(),
        }
    }

    pub fn failure(request_id: impl Into<String>, error: JsonRpcError) -> Self {
        Self {
            request_id: request_id.into(),
            id: Uuid::new_v4().to_string(),
            success: false,
            result: None,
            error: Some(error),
            timestamp: TimeUtils::now_iso8601(),
        }
    }

    /// `success XOR error present`.
    pub fn is_well_formed(&self) -> bool {
        self.success == self.result.is_some() && self.success != self.error.is_some()
    }

    pub fn correlates_with(&self, request: &Request) -> bool {
        self.request_id == request.id
    }
}

/// Small fluent builder for constructing a [`Request`] over the flat
/// request vocabulary.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    request: Option<String>,
    args: HashMap<String, Value>,
    timeout: Option<f64>,
    with_reply: bool,
}

impl RequestBuilder {
    pub fn new(request: impl Into<String>) -> Self {
        Self {
            request: Some(request.into()),
            args: HashMap::new(),
            timeout: None,
            with_reply: false,
        }
    }

    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    pub fn timeout(mut self, secs: f64) -> Self {
        self.timeout = Some(secs);
        self
    }

    pub fn expect_reply(mut self) -> Self {
        self.with_reply = true;
        self
    }

    pub fn build(self) -> Request {
        let mut request = Request::new(self.request.expect("request name is required"), Some(self.args));
        if let Some(timeout) = self.timeout {
            request = request.with_timeout(timeout);
        }
        if self.with_reply {
            request = request.with_reply_to();
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_has_valid_id_and_timestamp() {
        let request = Request::new("ping", None);
        let config = SecurityConfig::default();
        assert!(request.validate(&config).is_ok());
    }

    #[test]
    fn success_response_is_well_formed() {
        let response = Response::success("abc", serde_json::json!({"ok": true}));
        assert!(response.is_well_formed());
    }

    #[test]
    fn failure_response_is_well_formed() {
        let error = JsonRpcError::new(crate::error::ErrorCode::MethodNotFound, None);
        let response = Response::failure("abc", error);
        assert!(response.is_well_formed());
    }

    #[test]
    fn response_correlates_with_originating_request() {
        let request = Request::new("ping", None);
        let response = Response::success(request.id.clone(), serde_json::json!({}));
        assert!(response.correlates_with(&request));

        let other = Request::new("ping", None);
        assert!(!response.correlates_with(&other));
    }

    #[test]
    fn builder_produces_reply_expecting_request_with_args() {
        let request = RequestBuilder::new("echo")
            .arg("message", "hi")
            .timeout(5.0)
            .expect_reply()
            .build();
        assert_eq!(request.request, "echo");
        assert_eq!(request.args.unwrap().get("message").unwrap(), "hi");
        assert!(request.reply_to.is_some());
    }
}
