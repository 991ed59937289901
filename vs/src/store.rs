//! State store facade
//!
//! Owns every video record plus the aggregate counters and delegates
//! persistence to [`StateFile`]. All mutation goes through `&mut self`, so
//! one writer at a time is enforced in-process; a second process sharing the
//! same state file is last-writer-wins at the file layer.

use chrono::{Duration, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::Config;
use crate::domain::{VideoMeta, VideoRecord, VideoStatus, parse_iso};
use crate::error::StoreError;
use crate::persistence::{DEFAULT_SAVE_INTERVAL, Snapshot, StateFile, StoreMeta};
use crate::stats::PipelineStats;

/// How many records a summary includes
const RECENT_LIMIT: usize = 10;

/// Title length cap in summaries
const TITLE_PREVIEW_CHARS: usize = 50;

/// Tunables for opening a store
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub backup_enabled: bool,
    pub save_interval: u32,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            backup_enabled: true,
            save_interval: DEFAULT_SAVE_INTERVAL,
        }
    }
}

/// Optional details accompanying a status update
#[derive(Debug, Clone, Default)]
pub struct StatusChange {
    /// Required when entering a failure status
    pub error_message: Option<String>,
    /// Artifact location produced by the stage
    pub file_path: Option<String>,
    /// Artifact kind the location is stored under (audio, transcript, json)
    pub file_type: Option<String>,
}

impl StatusChange {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn artifact(kind: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            file_type: Some(kind.into()),
            file_path: Some(path.into()),
            error_message: None,
        }
    }

    pub fn with_artifact(mut self, kind: impl Into<String>, path: impl Into<String>) -> Self {
        self.file_type = Some(kind.into());
        self.file_path = Some(path.into());
        self
    }
}

/// Compact record view used in summaries
#[derive(Debug, Clone, Serialize)]
pub struct VideoDigest {
    pub video_id: String,
    pub title: String,
    pub status: VideoStatus,
    pub last_updated: String,
}

/// Point-in-time report over the whole store
#[derive(Debug, Clone, Serialize)]
pub struct StoreSummary {
    pub total_videos: usize,
    pub stats: PipelineStats,
    pub metadata: StoreMeta,
    /// Most recently updated records, newest first
    pub recent_videos: Vec<VideoDigest>,
}

/// The single authority over all video records
pub struct StateStore {
    file: StateFile,
    snapshot: Snapshot,
}

impl StateStore {
    /// Open or create a store at the given path with default options
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with(path, StoreOptions::default())
    }

    /// Open or create a store with explicit batching/backup options
    pub fn open_with(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = StateFile::new(path, options.backup_enabled, options.save_interval);
        let snapshot = file.load();
        debug!(path = %path.display(), videos = snapshot.videos.len(), "opened state store");
        Ok(Self { file, snapshot })
    }

    /// Open the store described by a loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        Self::open_with(&config.store.state_file, config.store.options())
    }

    /// Track a new video. Returns `Ok(false)` without mutating anything if
    /// the id is already present; an empty id is an error.
    pub fn add(&mut self, meta: VideoMeta) -> Result<bool, StoreError> {
        if meta.video_id.is_empty() {
            return Err(StoreError::MissingId);
        }
        if self.snapshot.videos.contains_key(&meta.video_id) {
            debug!(video_id = %meta.video_id, "already tracked, skipping");
            return Ok(false);
        }

        let record = VideoRecord::discovered(meta);
        debug!(video_id = %record.video_id, title = %record.title, "tracking new video");
        self.snapshot.stats.record_discovered();
        self.snapshot.videos.insert(record.video_id.clone(), record);
        self.file.save(&self.snapshot, false);
        Ok(true)
    }

    /// Move a video to a new status, applying attempt/error/artifact
    /// bookkeeping and the counter update. Returns `false` for unknown ids.
    ///
    /// Transitions are not rejected: callers own the stage ordering, and an
    /// edge outside the stage graph is applied with a warning.
    pub fn update_status(&mut self, video_id: &str, new_status: VideoStatus, change: StatusChange) -> bool {
        let Some(record) = self.snapshot.videos.get_mut(video_id) else {
            warn!(%video_id, "status update for unknown video");
            return false;
        };

        let old_status = record.status;
        if !new_status.expected_from(old_status) {
            warn!(%video_id, from = %old_status, to = %new_status, "unexpected status transition");
        }

        record.status = new_status;
        record.touch();

        if let Some(message) = change.error_message {
            record.error_message = Some(message);
        } else if new_status.is_failure() {
            warn!(%video_id, status = %new_status, "failure status set without an error message");
        } else {
            record.error_message = None;
        }

        if let (Some(kind), Some(path)) = (change.file_type, change.file_path) {
            if !record.set_artifact(kind.clone(), path) {
                warn!(%video_id, %kind, "ignoring empty artifact path");
            }
        }

        if let Some(stage) = new_status.attempt_stage() {
            record.bump_attempts(stage);
        }

        debug!(%video_id, from = %old_status, to = %new_status, "status updated");
        self.snapshot.stats.apply_transition(old_status, new_status);
        self.file.save(&self.snapshot, false);
        true
    }

    /// Look up one record
    pub fn get(&self, video_id: &str) -> Option<&VideoRecord> {
        self.snapshot.videos.get(video_id)
    }

    /// Read-only view over every record, in store-iteration order
    pub fn records(&self) -> impl Iterator<Item = &VideoRecord> {
        self.snapshot.videos.values()
    }

    /// All records currently in a status, in store-iteration order
    pub fn list_by_status(&self, status: VideoStatus) -> Vec<&VideoRecord> {
        self.snapshot.videos.values().filter(|v| v.status == status).collect()
    }

    /// Records in a stage failure whose attempt counter has room left
    pub fn list_retryable(&self, max_attempts: u32) -> Vec<&VideoRecord> {
        self.snapshot
            .videos
            .values()
            .filter(|v| v.is_retryable(max_attempts))
            .collect()
    }

    /// Current counters, as a copy the caller may mutate freely
    pub fn stats(&self) -> PipelineStats {
        self.snapshot.stats.clone()
    }

    pub fn metadata(&self) -> &StoreMeta {
        &self.snapshot.metadata
    }

    pub fn len(&self) -> usize {
        self.snapshot.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.videos.is_empty()
    }

    /// Summarize the store: totals, counters, metadata and the most recently
    /// updated records with display-truncated titles
    pub fn export_summary(&self) -> StoreSummary {
        let mut recent: Vec<&VideoRecord> = self.snapshot.videos.values().collect();
        recent.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));

        let recent_videos = recent
            .into_iter()
            .take(RECENT_LIMIT)
            .map(|v| VideoDigest {
                video_id: v.video_id.clone(),
                title: preview_title(&v.title),
                status: v.status,
                last_updated: v.last_updated.clone(),
            })
            .collect();

        StoreSummary {
            total_videos: self.snapshot.videos.len(),
            stats: self.snapshot.stats.clone(),
            metadata: self.snapshot.metadata.clone(),
            recent_videos,
        }
    }

    /// Remove failure-state records whose `last_updated` predates the
    /// threshold. Timestamps that no longer parse count as stale. Saves
    /// immediately when anything was removed; returns the removed count.
    pub fn cleanup_stale(&mut self, days: i64) -> usize {
        let cutoff = Utc::now() - Duration::days(days);

        let stale: Vec<String> = self
            .snapshot
            .videos
            .values()
            .filter(|v| v.status.is_failure())
            .filter(|v| match parse_iso(&v.last_updated) {
                Some(ts) => ts < cutoff,
                None => true,
            })
            .map(|v| v.video_id.clone())
            .collect();

        for video_id in &stale {
            if let Some(record) = self.snapshot.videos.remove(video_id) {
                self.snapshot.stats.record_removed(record.status);
                debug!(%video_id, status = %record.status, "removed stale record");
            }
        }

        if !stale.is_empty() {
            self.file.save(&self.snapshot, true);
        }
        stale.len()
    }

    /// Write the snapshot now, regardless of the batching counter
    pub fn flush(&mut self) {
        self.file.save(&self.snapshot, true);
    }
}

fn preview_title(title: &str) -> String {
    if title.chars().count() > TITLE_PREVIEW_CHARS {
        let cut: String = title.chars().take(TITLE_PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        title.to_string()
    }
}
