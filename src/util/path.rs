//! Filesystem helpers for socket paths.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

static REPLY_SOCKET_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct PathUtils;

impl PathUtils {
    /// Generate a fresh ephemeral reply-socket path:
    /// `/tmp/janus_resp_<pid>_<millis>_<rand>.sock`, distinct across all
    /// calls within the process lifetime and collision-resistant across
    /// co-resident processes.
    pub fn generate_reply_socket_path() -> String {
        let pid = std::process::id();
        let millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        // Process-local counter plus a millisecond timestamp makes the path
        // unique within this process even if two calls land in the same tick;
        // the pid makes it unique across co-resident processes.
        let seq = REPLY_SOCKET_COUNTER.fetch_add(1, Ordering::Relaxed);
        format!("/tmp/janus_resp_{pid}_{millis}_{seq:x}.sock")
    }

    pub fn ensure_socket_dir(socket_path: &str) -> std::io::Result<()> {
        if let Some(parent) = Path::new(socket_path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Best-effort unlink; absence of the file is not an error.
    pub fn cleanup_socket_file(socket_path: &str) {
        let _ = std::fs::remove_file(socket_path);
    }
}
