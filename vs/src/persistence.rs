//! Snapshot persistence for the state store
//!
//! The whole store is one JSON document: records, aggregate counters and
//! store metadata. Writes are batched on an operation counter and replace
//! the canonical file atomically via a temp-file rename, so readers only
//! ever see the previous or the fully-written snapshot. When backups are
//! enabled the previous snapshot is kept at `<path>.backup`, best-effort.
//!
//! Loading never fails the process: a missing or corrupt file yields a
//! fresh store, malformed records are skipped, and snapshots from before
//! the status enum (progress booleans) are migrated in place.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::domain::{VideoRecord, VideoStatus, now_iso};
use crate::error::StoreError;
use crate::stats::PipelineStats;

/// Snapshot schema version, re-tagged onto the document on every save
pub const SCHEMA_VERSION: &str = "2.0";

/// Default number of mutations between physical writes
pub const DEFAULT_SAVE_INTERVAL: u32 = 10;

/// Store-level metadata persisted alongside the records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreMeta {
    /// When the store file was first created (RFC 3339)
    pub created_at: String,
    /// Schema version of the document
    pub version: String,
    /// When the snapshot was last written, stamped at save time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl Default for StoreMeta {
    fn default() -> Self {
        Self {
            created_at: now_iso(),
            version: SCHEMA_VERSION.to_string(),
            last_updated: None,
        }
    }
}

/// Full store state as persisted on disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub videos: HashMap<String, VideoRecord>,
    #[serde(default)]
    pub stats: PipelineStats,
    #[serde(default)]
    pub metadata: StoreMeta,
}

/// Raw document shape, with records left unparsed so one bad record cannot
/// take down the whole load
#[derive(Debug, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    videos: HashMap<String, Value>,
    #[serde(default)]
    stats: PipelineStats,
    #[serde(default)]
    metadata: StoreMeta,
}

/// Serialized view of a snapshot with save-time metadata stamped in
#[derive(Serialize)]
struct DiskSnapshot<'a> {
    videos: &'a HashMap<String, VideoRecord>,
    stats: &'a PipelineStats,
    metadata: StoreMeta,
}

/// Pre-enum record shape: status as a set of progress booleans
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LegacyStatusFlags {
    downloaded: bool,
    transcribed: bool,
    json_ready: bool,
}

impl LegacyStatusFlags {
    fn into_status(self) -> VideoStatus {
        if self.json_ready {
            VideoStatus::Completed
        } else if self.transcribed {
            VideoStatus::Transcribed
        } else if self.downloaded {
            VideoStatus::Downloaded
        } else {
            VideoStatus::Discovered
        }
    }
}

/// Parse one stored record, migrating legacy shapes and backfilling missing
/// fields with safe defaults. Unknown status strings are an error so an
/// invalid variant is never constructed.
fn migrate_record(video_id: &str, mut value: Value) -> eyre::Result<VideoRecord> {
    let obj = value
        .as_object_mut()
        .ok_or_else(|| eyre::eyre!("record is not an object"))?;

    let legacy = match obj.get("status") {
        Some(status) if status.is_object() => Some(serde_json::from_value::<LegacyStatusFlags>(status.clone())?),
        _ => None,
    };
    if let Some(flags) = legacy {
        let status = flags.into_status();
        debug!(%video_id, %status, "migrated legacy status flags");
        obj.insert("status".to_string(), Value::String(status.to_string()));
    }

    if !obj.contains_key("video_id") {
        obj.insert("video_id".to_string(), Value::String(video_id.to_string()));
    }

    let mut record: VideoRecord = serde_json::from_value(value)?;
    if record.discovered_at.is_empty() {
        record.discovered_at = now_iso();
    }
    if record.last_updated.is_empty() {
        record.last_updated = record.discovered_at.clone();
    }
    Ok(record)
}

/// Append a suffix after the full file name (`state.json` -> `state.json.tmp`)
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".");
    os.push(suffix);
    PathBuf::from(os)
}

/// Owns the canonical state file and the write-batching counter
pub struct StateFile {
    path: PathBuf,
    backup_enabled: bool,
    save_interval: u32,
    ops_since_save: u32,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>, backup_enabled: bool, save_interval: u32) -> Self {
        Self {
            path: path.into(),
            backup_enabled,
            save_interval: save_interval.max(1),
            ops_since_save: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot. Never fails: bad data falls back to a fresh store
    /// and individually malformed records are skipped with a warning.
    pub fn load(&self) -> Snapshot {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no state file, starting fresh");
            return Snapshot::default();
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "state file unreadable, starting fresh");
                return Snapshot::default();
            }
        };

        let raw: RawSnapshot = match serde_json::from_str(&content) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "state file corrupt, starting fresh");
                return Snapshot::default();
            }
        };

        let mut videos = HashMap::with_capacity(raw.videos.len());
        for (video_id, value) in raw.videos {
            match migrate_record(&video_id, value) {
                Ok(record) => {
                    videos.insert(video_id, record);
                }
                Err(e) => warn!(%video_id, error = %e, "skipping malformed video record"),
            }
        }

        debug!(path = %self.path.display(), count = videos.len(), "loaded state file");
        Snapshot {
            videos,
            stats: raw.stats,
            metadata: raw.metadata,
        }
    }

    /// Record one mutation and write the snapshot once the batching interval
    /// is reached; `force` writes immediately. Write failures are logged and
    /// swallowed: the in-memory state stays authoritative for this process,
    /// at the cost of losing the current batch on a crash.
    pub fn save(&mut self, snapshot: &Snapshot, force: bool) {
        self.ops_since_save += 1;
        if !force && self.ops_since_save < self.save_interval {
            return;
        }

        match self.write_snapshot(snapshot) {
            Ok(()) => {
                self.ops_since_save = 0;
                debug!(path = %self.path.display(), "snapshot written");
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to persist state, keeping in-memory copy");
            }
        }
    }

    fn write_snapshot(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if self.backup_enabled && self.path.exists() {
            let backup = sibling(&self.path, "backup");
            if let Err(e) = fs::copy(&self.path, &backup) {
                warn!(path = %backup.display(), error = %e, "could not write backup file");
            }
        }

        let disk = DiskSnapshot {
            videos: &snapshot.videos,
            stats: &snapshot.stats,
            metadata: StoreMeta {
                created_at: snapshot.metadata.created_at.clone(),
                version: SCHEMA_VERSION.to_string(),
                last_updated: Some(now_iso()),
            },
        };
        let body = serde_json::to_string_pretty(&disk)?;

        // Write-then-rename keeps the canonical file whole through a crash.
        let tmp = sibling(&self.path, "tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
