//! Aggregate per-status counters
//!
//! `total_discovered` is cumulative and only ever grows; every other counter
//! tracks the number of live records currently in that status. `Discovered`
//! and the three in-progress states carry no counter.

use serde::{Deserialize, Serialize};

use crate::domain::VideoStatus;

/// Running counts per status category, persisted as the `stats` map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineStats {
    /// Cumulative count of everything ever added, never decremented
    pub total_discovered: u64,
    pub download_pending: u64,
    pub downloaded: u64,
    pub download_failed: u64,
    pub transcription_pending: u64,
    pub transcribed: u64,
    pub transcription_failed: u64,
    pub formatting_pending: u64,
    pub formatted: u64,
    pub formatting_failed: u64,
    pub completed: u64,
    pub failed: u64,
}

impl PipelineStats {
    /// The counter tracking a status, `None` for untracked transient states
    fn counter_mut(&mut self, status: VideoStatus) -> Option<&mut u64> {
        match status {
            VideoStatus::DownloadPending => Some(&mut self.download_pending),
            VideoStatus::Downloaded => Some(&mut self.downloaded),
            VideoStatus::DownloadFailed => Some(&mut self.download_failed),
            VideoStatus::TranscriptionPending => Some(&mut self.transcription_pending),
            VideoStatus::Transcribed => Some(&mut self.transcribed),
            VideoStatus::TranscriptionFailed => Some(&mut self.transcription_failed),
            VideoStatus::FormattingPending => Some(&mut self.formatting_pending),
            VideoStatus::Formatted => Some(&mut self.formatted),
            VideoStatus::FormattingFailed => Some(&mut self.formatting_failed),
            VideoStatus::Completed => Some(&mut self.completed),
            VideoStatus::Failed => Some(&mut self.failed),
            VideoStatus::Discovered
            | VideoStatus::Downloading
            | VideoStatus::Transcribing
            | VideoStatus::Formatting => None,
        }
    }

    /// Read the counter for a status, `None` for untracked states
    pub fn counter(&self, status: VideoStatus) -> Option<u64> {
        match status {
            VideoStatus::DownloadPending => Some(self.download_pending),
            VideoStatus::Downloaded => Some(self.downloaded),
            VideoStatus::DownloadFailed => Some(self.download_failed),
            VideoStatus::TranscriptionPending => Some(self.transcription_pending),
            VideoStatus::Transcribed => Some(self.transcribed),
            VideoStatus::TranscriptionFailed => Some(self.transcription_failed),
            VideoStatus::FormattingPending => Some(self.formatting_pending),
            VideoStatus::Formatted => Some(self.formatted),
            VideoStatus::FormattingFailed => Some(self.formatting_failed),
            VideoStatus::Completed => Some(self.completed),
            VideoStatus::Failed => Some(self.failed),
            VideoStatus::Discovered
            | VideoStatus::Downloading
            | VideoStatus::Transcribing
            | VideoStatus::Formatting => None,
        }
    }

    /// Count one newly added record
    pub fn record_discovered(&mut self) {
        self.total_discovered += 1;
    }

    /// Move one record between status categories. The outgoing counter is
    /// floored at zero rather than going negative.
    pub fn apply_transition(&mut self, from: VideoStatus, to: VideoStatus) {
        if let Some(counter) = self.counter_mut(from) {
            *counter = counter.saturating_sub(1);
        }
        if let Some(counter) = self.counter_mut(to) {
            *counter += 1;
        }
    }

    /// Drop one record physically removed by retention cleanup
    pub fn record_removed(&mut self, status: VideoStatus) {
        if let Some(counter) = self.counter_mut(status) {
            *counter = counter.saturating_sub(1);
        }
    }

    /// Sum of the per-status counters (excludes cumulative `total_discovered`)
    pub fn tracked_total(&self) -> u64 {
        self.download_pending
            + self.downloaded
            + self.download_failed
            + self.transcription_pending
            + self.transcribed
            + self.transcription_failed
            + self.formatting_pending
            + self.formatted
            + self.formatting_failed
            + self.completed
            + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_moves_count_between_categories() {
        let mut stats = PipelineStats::default();
        stats.apply_transition(VideoStatus::Discovered, VideoStatus::DownloadPending);
        assert_eq!(stats.download_pending, 1);

        stats.apply_transition(VideoStatus::DownloadPending, VideoStatus::Downloading);
        assert_eq!(stats.download_pending, 0);
        // in-progress states are untracked
        assert_eq!(stats.tracked_total(), 0);

        stats.apply_transition(VideoStatus::Downloading, VideoStatus::Downloaded);
        assert_eq!(stats.downloaded, 1);
        assert_eq!(stats.tracked_total(), 1);
    }

    #[test]
    fn test_decrement_floors_at_zero() {
        let mut stats = PipelineStats::default();
        stats.apply_transition(VideoStatus::Downloaded, VideoStatus::TranscriptionPending);
        assert_eq!(stats.downloaded, 0);
        assert_eq!(stats.transcription_pending, 1);
    }

    #[test]
    fn test_total_discovered_is_cumulative() {
        let mut stats = PipelineStats::default();
        stats.record_discovered();
        stats.record_discovered();
        stats.apply_transition(VideoStatus::Discovered, VideoStatus::Completed);
        assert_eq!(stats.total_discovered, 2);
    }

    #[test]
    fn test_record_removed_decrements() {
        let mut stats = PipelineStats::default();
        stats.apply_transition(VideoStatus::Downloading, VideoStatus::DownloadFailed);
        assert_eq!(stats.download_failed, 1);
        stats.record_removed(VideoStatus::DownloadFailed);
        assert_eq!(stats.download_failed, 0);
        stats.record_removed(VideoStatus::DownloadFailed);
        assert_eq!(stats.download_failed, 0);
    }

    #[test]
    fn test_untracked_statuses_have_no_counter() {
        let stats = PipelineStats::default();
        assert!(stats.counter(VideoStatus::Discovered).is_none());
        assert!(stats.counter(VideoStatus::Downloading).is_none());
        assert!(stats.counter(VideoStatus::Transcribing).is_none());
        assert!(stats.counter(VideoStatus::Formatting).is_none());
        assert!(stats.counter(VideoStatus::Completed).is_some());
    }

    #[test]
    fn test_serde_backfills_missing_categories() {
        let stats: PipelineStats = serde_json::from_str(r#"{"total_discovered": 7, "downloaded": 3}"#).unwrap();
        assert_eq!(stats.total_discovered, 7);
        assert_eq!(stats.downloaded, 3);
        assert_eq!(stats.failed, 0);
    }
}
