//! Timestamp formatting. The wire representation is always an ISO-8601
//! string with millisecond precision and a trailing `Z` — numeric
//! seconds-since-epoch is never accepted.

use chrono::Utc;

pub struct TimeUtils;

impl TimeUtils {
    /// Current time formatted as `YYYY-MM-DDTHH:MM:SS.sssZ`.
    pub fn now_iso8601() -> String {
        Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
    }
}
