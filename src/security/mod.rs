//! Security Validator: a pure function library that gates every exterior
//! string and size that crosses the wire boundary.
//!
//! Every operation here is total — it returns a decision in bounded time and
//! never panics.

use crate::error::{ErrorCode, JsonRpcError};
use once_cell_lite::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Tunables for [`SecurityValidator`].
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub max_name_length: usize,
    pub max_args_size: usize,
    pub max_total_size: usize,
    pub min_timeout: f64,
    pub max_timeout: f64,
    pub allowed_directories: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_name_length: 256,
            max_args_size: 5 * 1024 * 1024,
            max_total_size: 10 * 1024 * 1024,
            min_timeout: 0.1,
            max_timeout: 300.0,
            allowed_directories: vec![
                "/tmp/".to_string(),
                "/var/run/".to_string(),
                "/var/tmp/".to_string(),
            ],
        }
    }
}

/// What kind of identifier is being validated by [`SecurityValidator::validate_name`];
/// only used to make error messages specific, the rule itself is identical for all kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Request,
    Argument,
    Model,
    Channel,
}

impl NameKind {
    fn label(&self) -> &'static str {
        match self {
            NameKind::Request => "request name",
            NameKind::Argument => "argument name",
            NameKind::Model => "model name",
            NameKind::Channel => "channel name",
        }
    }
}

const UNIX_SOCKET_PATH_LIMIT: usize = 108;

struct Patterns {
    path_chars: Regex,
    name_chars: Regex,
    uuid_v4: Regex,
    timestamp: Regex,
}

static PATTERNS: Lazy<Patterns> = Lazy::new(|| Patterns {
    path_chars: Regex::new(r"^[A-Za-z0-9/_.\-]+$").unwrap(),
    name_chars: Regex::new(r"^[A-Za-z0-9_\-]+$").unwrap(),
    uuid_v4: Regex::new(
        r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$",
    )
    .unwrap(),
    timestamp: Regex::new(
        r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{3}Z$",
    )
    .unwrap(),
});

/// Pure validation functions gating every exterior string and size.
pub struct SecurityValidator;

impl SecurityValidator {
    /// Validate a Unix-domain socket path (server socket or ephemeral reply socket).
    pub fn validate_socket_path(path: &str, config: &SecurityConfig) -> crate::error::Result<()> {
        if path.is_empty() {
            return Err(JsonRpcError::new(
                ErrorCode::SecurityViolation,
                Some("EMPTY_PATH: socket path cannot be empty".to_string()),
            ));
        }
        if path.len() > UNIX_SOCKET_PATH_LIMIT {
            return Err(JsonRpcError::new(
                ErrorCode::SecurityViolation,
                Some(format!(
                    "PATH_TOO_LONG: socket path is {} bytes, limit is {UNIX_SOCKET_PATH_LIMIT}",
                    path.len()
                )),
            ));
        }
        if path.contains('\0') {
            return Err(JsonRpcError::new(
                ErrorCode::SecurityViolation,
                Some("NULL_BYTE_INJECTION: socket path contains a NUL byte".to_string()),
            ));
        }
        if path.contains("../") || path.contains("..\\") {
            return Err(JsonRpcError::new(
                ErrorCode::SecurityViolation,
                Some("PATH_TRAVERSAL_ATTEMPT: socket path contains a traversal sequence".to_string()),
            ));
        }
        if !PATTERNS.path_chars.is_match(path) {
            return Err(JsonRpcError::new(
                ErrorCode::SecurityViolation,
                Some("INVALID_PATH_CHARACTERS: socket path contains disallowed characters".to_string()),
            ));
        }
        if !config
            .allowed_directories
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            return Err(JsonRpcError::new(
                ErrorCode::SecurityViolation,
                Some(format!(
                    "FORBIDDEN_DIRECTORY: socket path must begin with one of {:?}",
                    config.allowed_directories
                )),
            ));
        }
        Ok(())
    }

    /// Validate a request/argument/model/channel identifier.
    pub fn validate_name(name: &str, kind: NameKind, config: &SecurityConfig) -> crate::error::Result<()> {
        if name.is_empty() {
            return Err(JsonRpcError::new(
                ErrorCode::ValidationFailed,
                Some(format!("EMPTY_NAME: {} cannot be empty", kind.label())),
            ));
        }
        if name.len() > config.max_name_length {
            return Err(JsonRpcError::new(
                ErrorCode::ValidationFailed,
                Some(format!(
                    "NAME_TOO_LONG: {} exceeds {} characters",
                    kind.label(),
                    config.max_name_length
                )),
            ));
        }
        if name.contains('\0') {
            return Err(JsonRpcError::new(
                ErrorCode::SecurityViolation,
                Some(format!("NULL_BYTE_INJECTION: {} contains a NUL byte", kind.label())),
            ));
        }
        if !PATTERNS.name_chars.is_match(name) {
            return Err(JsonRpcError::new(
                ErrorCode::ValidationFailed,
                Some(format!(
                    "INVALID_NAME_CHARACTERS: {} must match ^[A-Za-z0-9_-]+$",
                    kind.label()
                )),
            ));
        }
        Ok(())
    }

    /// Validate a request timeout in seconds.
    pub fn validate_timeout(timeout: f64, config: &SecurityConfig) -> crate::error::Result<()> {
        if !timeout.is_finite() {
            return Err(JsonRpcError::new(
                ErrorCode::ValidationFailed,
                Some("INVALID_TIMEOUT: timeout must be finite".to_string()),
            ));
        }
        if timeout < config.min_timeout {
            return Err(JsonRpcError::new(
                ErrorCode::ValidationFailed,
                Some(format!(
                    "TIMEOUT_TOO_SMALL: {timeout} is below the minimum of {}",
                    config.min_timeout
                )),
            ));
        }
        if timeout > config.max_timeout {
            return Err(JsonRpcError::new(
                ErrorCode::ValidationFailed,
                Some(format!(
                    "TIMEOUT_TOO_LARGE: {timeout} is above the maximum of {}",
                    config.max_timeout
                )),
            ));
        }
        Ok(())
    }

    pub fn timeout_as_duration(timeout: f64) -> Duration {
        Duration::from_secs_f64(timeout)
    }

    /// Validate a v4 UUID string.
    pub fn validate_uuid(value: &str) -> crate::error::Result<()> {
        if !PATTERNS.uuid_v4.is_match(value) {
            return Err(JsonRpcError::new(
                ErrorCode::ValidationFailed,
                Some(format!("INVALID_UUID: '{value}' is not a valid v4 UUID")),
            ));
        }
        Ok(())
    }

    /// Validate an ISO-8601 timestamp with millisecond precision and a trailing `Z`.
    pub fn validate_timestamp(value: &str) -> crate::error::Result<()> {
        if !PATTERNS.timestamp.is_match(value) {
            return Err(JsonRpcError::new(
                ErrorCode::ValidationFailed,
                Some(format!(
                    "INVALID_TIMESTAMP: '{value}' does not match YYYY-MM-DDTHH:MM:SS.sssZ"
                )),
            ));
        }
        chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.3fZ").map_err(|_| {
            JsonRpcError::new(
                ErrorCode::ValidationFailed,
                Some(format!("INVALID_TIMESTAMP: '{value}' is not a real calendar date/time")),
            )
        })?;
        Ok(())
    }

    /// Validate a message's serialized size, UTF-8 validity, and JSON validity.
    pub fn validate_message_content(value: &Value, config: &SecurityConfig) -> crate::error::Result<()> {
        let serialized = serde_json::to_vec(value)?;
        Self::validate_utf8(&serialized)?;
        if serialized.contains(&0u8) {
            return Err(JsonRpcError::new(
                ErrorCode::SecurityViolation,
                Some("NULL_BYTE_INJECTION: message contains a NUL byte".to_string()),
            ));
        }
        if serialized.len() > config.max_total_size {
            return Err(JsonRpcError::new(
                ErrorCode::ResourceLimitExceeded,
                Some(format!(
                    "message is {} bytes, limit is {} bytes",
                    serialized.len(),
                    config.max_total_size
                )),
            ));
        }
        Ok(())
    }

    /// Validate the serialized size of request arguments.
    pub fn validate_args_size(
        args: &Option<HashMap<String, Value>>,
        config: &SecurityConfig,
    ) -> crate::error::Result<()> {
        if let Some(args) = args {
            let size = serde_json::to_vec(args)?.len();
            if size > config.max_args_size {
                return Err(JsonRpcError::new(
                    ErrorCode::ResourceLimitExceeded,
                    Some(format!(
                        "arguments are {size} bytes, limit is {} bytes",
                        config.max_args_size
                    )),
                ));
            }
        }
        Ok(())
    }

    pub fn validate_utf8(data: &[u8]) -> crate::error::Result<()> {
        std::str::from_utf8(data).map_err(|_| {
            JsonRpcError::new(
                ErrorCode::InvalidRequest,
                Some("INVALID_UTF8: payload is not valid UTF-8".to_string()),
            )
        })?;
        Ok(())
    }
}

/// A tiny, dependency-free lazily-initialized static, used only for the
/// compiled validation regexes above. Kept local rather than pulling in
/// `once_cell` for a single use site.
mod once_cell_lite {
    use std::sync::OnceLock;

    pub struct Lazy<T> {
        cell: OnceLock<T>,
        init: fn() -> T,
    }

    impl<T> Lazy<T> {
        pub const fn new(init: fn() -> T) -> Self {
            Self {
                cell: OnceLock::new(),
                init,
            }
        }
    }

    impl<T> std::ops::Deref for Lazy<T> {
        type Target = T;
        fn deref(&self) -> &T {
            self.cell.get_or_init(self.init)
        }
    }
}
