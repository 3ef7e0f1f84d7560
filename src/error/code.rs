use serde::{Deserialize, Serialize};
use std::fmt;

/// JSON-RPC 2.0 compatible error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    /// Malformed JSON or binary payload.
    ParseError = -32700,
    /// Shape/field violation in a request or response.
    InvalidRequest = -32600,
    /// Unknown request name.
    MethodNotFound = -32601,
    /// Missing or wrongly-typed argument.
    InvalidParams = -32602,
    /// Unclassified server fault.
    InternalError = -32603,

    /// Handler exceeded its per-request timeout.
    HandlerTimeout = -32001,
    /// Security validator refused an input.
    SecurityViolation = -32002,
    /// Concurrency or size cap hit.
    ResourceLimitExceeded = -32003,
    /// Named resource absent.
    ResourceNotFound = -32004,
    /// Credential check failed (reserved for future use).
    AuthenticationFailed = -32005,

    /// Manifest or request validation failure.
    ValidationFailed = -32013,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "PARSE_ERROR",
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::MethodNotFound => "METHOD_NOT_FOUND",
            ErrorCode::InvalidParams => "INVALID_PARAMS",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::HandlerTimeout => "HANDLER_TIMEOUT",
            ErrorCode::SecurityViolation => "SECURITY_VIOLATION",
            ErrorCode::ResourceLimitExceeded => "RESOURCE_LIMIT_EXCEEDED",
            ErrorCode::ResourceNotFound => "RESOURCE_NOT_FOUND",
            ErrorCode::AuthenticationFailed => "AUTHENTICATION_FAILED",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Parse error",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::MethodNotFound => "Method not found",
            ErrorCode::InvalidParams => "Invalid params",
            ErrorCode::InternalError => "Internal error",
            ErrorCode::HandlerTimeout => "Handler timeout",
            ErrorCode::SecurityViolation => "Security violation",
            ErrorCode::ResourceLimitExceeded => "Resource limit exceeded",
            ErrorCode::ResourceNotFound => "Resource not found",
            ErrorCode::AuthenticationFailed => "Authentication failed",
            ErrorCode::ValidationFailed => "Validation failed",
        }
    }

    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -32700 => Some(ErrorCode::ParseError),
            -32600 => Some(ErrorCode::InvalidRequest),
            -32601 => Some(ErrorCode::MethodNotFound),
            -32602 => Some(ErrorCode::InvalidParams),
            -32603 => Some(ErrorCode::InternalError),
            -32001 => Some(ErrorCode::HandlerTimeout),
            -32002 => Some(ErrorCode::SecurityViolation),
            -32003 => Some(ErrorCode::ResourceLimitExceeded),
            -32004 => Some(ErrorCode::ResourceNotFound),
            -32005 => Some(ErrorCode::AuthenticationFailed),
            -32013 => Some(ErrorCode::ValidationFailed),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
