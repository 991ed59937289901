//! Domain types for vidstore
//!
//! The video record entity and its lifecycle status model.

mod record;
mod status;

pub use record::{VideoMeta, VideoRecord};
pub use status::{Stage, VideoStatus};

use chrono::{DateTime, SecondsFormat, Utc};

/// Current time as an RFC 3339 UTC string, the timestamp format of the state file.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp. Returns `None` for values that are not RFC 3339.
pub fn parse_iso(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts).ok().map(|dt| dt.with_timezone(&Utc))
}
