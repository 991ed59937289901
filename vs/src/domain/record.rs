//! Video record entity
//!
//! One record per discovered video: the descriptive payload handed over by
//! discovery, the lifecycle status, per-stage attempt counters, the last
//! error and the artifact paths produced along the way.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::status::{Stage, VideoStatus};
use super::now_iso;

/// Descriptive payload for a discovered video, as produced by the discovery
/// tool. Everything besides `video_id` is opaque to the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoMeta {
    pub video_id: String,
    pub title: String,
    pub channel: String,
    pub description: String,
    pub published_at: String,
    /// Duration in seconds
    pub duration: u64,
    /// Human-readable duration, e.g. "10:23"
    pub duration_str: String,
    pub view_count: u64,
    pub url: String,
    pub search_term: String,
}

/// Persistent state of one tracked video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub duration_str: String,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub search_term: String,

    /// Current lifecycle status
    #[serde(default)]
    pub status: VideoStatus,

    /// When the record was first added (RFC 3339)
    #[serde(default)]
    pub discovered_at: String,

    /// Refreshed on every mutation (RFC 3339)
    #[serde(default)]
    pub last_updated: String,

    #[serde(default)]
    pub download_attempts: u32,
    #[serde(default)]
    pub transcription_attempts: u32,
    #[serde(default)]
    pub formatting_attempts: u32,

    /// Set while in a failure state, cleared on recovery
    #[serde(default)]
    pub error_message: Option<String>,

    /// Artifact kind (audio, transcript, json) to storage location
    #[serde(default)]
    pub file_paths: HashMap<String, String>,
}

impl VideoRecord {
    /// Create a fresh record in `Discovered` from discovery metadata
    pub fn discovered(meta: VideoMeta) -> Self {
        let now = now_iso();
        Self {
            video_id: meta.video_id,
            title: meta.title,
            channel: meta.channel,
            description: meta.description,
            published_at: meta.published_at,
            duration: meta.duration,
            duration_str: meta.duration_str,
            view_count: meta.view_count,
            url: meta.url,
            search_term: meta.search_term,
            status: VideoStatus::Discovered,
            discovered_at: now.clone(),
            last_updated: now,
            download_attempts: 0,
            transcription_attempts: 0,
            formatting_attempts: 0,
            error_message: None,
            file_paths: HashMap::new(),
        }
    }

    /// Refresh the mutation timestamp
    pub fn touch(&mut self) {
        self.last_updated = now_iso();
    }

    /// Attempts spent in a stage so far
    pub fn attempts_for(&self, stage: Stage) -> u32 {
        match stage {
            Stage::Download => self.download_attempts,
            Stage::Transcription => self.transcription_attempts,
            Stage::Formatting => self.formatting_attempts,
        }
    }

    /// Count one more attempt at a stage
    pub fn bump_attempts(&mut self, stage: Stage) {
        match stage {
            Stage::Download => self.download_attempts += 1,
            Stage::Transcription => self.transcription_attempts += 1,
            Stage::Formatting => self.formatting_attempts += 1,
        }
    }

    /// Record an artifact location. Empty locations are rejected so a later
    /// update can never wipe out a path that was already recorded.
    pub fn set_artifact(&mut self, kind: impl Into<String>, path: impl Into<String>) -> bool {
        let path = path.into();
        if path.is_empty() {
            return false;
        }
        self.file_paths.insert(kind.into(), path);
        true
    }

    /// Check if this record sits in a stage failure with attempts to spare
    pub fn is_retryable(&self, max_attempts: u32) -> bool {
        match self.status.failure_stage() {
            Some(stage) => self.attempts_for(stage) < max_attempts,
            None => false,
        }
    }
}
