//! JSON-RPC 2.0 compatible error taxonomy.
//!
//! Every fallible operation in this crate returns [`JsonRpcError`]. The error
//! carries a stable numeric `code` from [`ErrorCode`], a canonical `message`
//! for that code, and an optional `data` payload with free-form `details`
//! and `context`.

mod code;

pub use code::ErrorCode;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Additional, optional context attached to a [`JsonRpcError`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcErrorData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl JsonRpcErrorData {
    pub fn with_details<S: Into<String>>(details: S) -> Self {
        Self {
            details: Some(details.into()),
            context: None,
        }
    }

    pub fn with_context(mut self, context: HashMap<String, serde_json::Value>) -> Self {
        self.context = Some(context);
        self
    }
}

/// A JSON-RPC 2.0 compliant error, as carried by a failed [`crate::protocol::Response`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonRpcErrorData>,
}

impl JsonRpcError {
    /// Construct an error carrying the canonical message for `code`, with optional details.
    pub fn new(code: ErrorCode, details: Option<String>) -> Self {
        Self {
            code: code.code(),
            message: code.message().to_string(),
            data: details.map(JsonRpcErrorData::with_details),
        }
    }

    /// Construct an error with structured context attached.
    pub fn with_context(
        code: ErrorCode,
        details: Option<String>,
        context: HashMap<String, serde_json::Value>,
    ) -> Self {
        let data = JsonRpcErrorData {
            details,
            context: Some(context),
        };
        Self {
            code: code.code(),
            message: code.message().to_string(),
            data: Some(data),
        }
    }

    /// Construct a `VALIDATION_FAILED` error naming the offending field and value.
    pub fn validation_error<S: Into<String>>(field: S, value: serde_json::Value, details: S) -> Self {
        let mut context = HashMap::new();
        context.insert("field".to_string(), serde_json::Value::String(field.into()));
        context.insert("value".to_string(), value);
        Self::with_context(ErrorCode::ValidationFailed, Some(details.into()), context)
    }

    /// Best-known [`ErrorCode`] for this error's numeric code, if recognized.
    pub fn error_code(&self) -> Option<ErrorCode> {
        ErrorCode::from_code(self.code)
    }

    pub fn details(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.details.as_deref())
    }
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.details() {
            Some(details) => write!(f, "JSON-RPC error {}: {} - {}", self.code, self.message, details),
            None => write!(f, "JSON-RPC error {}: {}", self.code, self.message),
        }
    }
}

impl std::error::Error for JsonRpcError {}

impl From<std::io::Error> for JsonRpcError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => {
                JsonRpcError::new(ErrorCode::ResourceNotFound, Some(error.to_string()))
            }
            std::io::ErrorKind::PermissionDenied => {
                JsonRpcError::new(ErrorCode::SecurityViolation, Some(error.to_string()))
            }
            _ => JsonRpcError::new(ErrorCode::InternalError, Some(error.to_string())),
        }
    }
}

impl From<serde_json::Error> for JsonRpcError {
    fn from(error: serde_json::Error) -> Self {
        JsonRpcError::new(ErrorCode::ParseError, Some(error.to_string()))
    }
}

impl From<serde_yaml::Error> for JsonRpcError {
    fn from(error: serde_yaml::Error) -> Self {
        JsonRpcError::new(ErrorCode::ParseError, Some(error.to_string()))
    }
}

impl From<regex::Error> for JsonRpcError {
    fn from(error: regex::Error) -> Self {
        JsonRpcError::new(ErrorCode::ValidationFailed, Some(error.to_string()))
    }
}

/// Low-level transport failures, mapped to [`JsonRpcError`] at the API boundary.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("message too large: {0} bytes exceeds limit of {1} bytes")]
    MessageTooLarge(usize, usize),

    #[error("socket io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl From<TransportError> for JsonRpcError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::MessageTooLarge(size, limit) => {
                let mut context = HashMap::new();
                context.insert("size".to_string(), serde_json::Value::from(size));
                context.insert("limit".to_string(), serde_json::Value::from(limit));
                JsonRpcError::with_context(
                    ErrorCode::ResourceLimitExceeded,
                    Some(format!("message of {size} bytes exceeds limit of {limit} bytes")),
                    context,
                )
            }
            TransportError::Io(e) => e.into(),
            TransportError::Timeout(d) => {
                JsonRpcError::new(ErrorCode::HandlerTimeout, Some(format!("timed out after {d:?}")))
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, JsonRpcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_values_match_taxonomy() {
        assert_eq!(ErrorCode::ParseError.code(), -32700);
        assert_eq!(ErrorCode::MethodNotFound.code(), -32601);
        assert_eq!(ErrorCode::ValidationFailed.code(), -32013);
        assert_eq!(ErrorCode::HandlerTimeout.code(), -32001);
        assert_eq!(ErrorCode::SecurityViolation.code(), -32002);
        assert_eq!(ErrorCode::ResourceLimitExceeded.code(), -32003);
        assert_eq!(ErrorCode::ResourceNotFound.code(), -32004);
        assert_eq!(ErrorCode::AuthenticationFailed.code(), -32005);
    }

    #[test]
    fn round_trips_through_json() {
        let error = JsonRpcError::new(ErrorCode::MethodNotFound, Some("no such request".to_string()));
        let json = serde_json::to_string(&error).unwrap();
        let back: JsonRpcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, back);
    }

    #[test]
    fn validation_error_carries_field_and_value() {
        let error = JsonRpcError::validation_error("age", serde_json::json!(-1), "must be non-negative");
        assert_eq!(error.code, -32013);
        let context = error.data.unwrap().context.unwrap();
        assert_eq!(context.get("field"), Some(&serde_json::Value::String("age".to_string())));
    }
}
