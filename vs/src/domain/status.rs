//! Video lifecycle status model
//!
//! Every record moves through a fixed download -> transcription -> formatting
//! pipeline. Each stage has a pending, an in-progress, a done and a failed
//! state; failed stages can be retried until the stage's attempt counter
//! reaches the configured maximum. `Completed` and `Failed` are terminal.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::StoreError;

/// Pipeline stage that owns an attempt counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Download,
    Transcription,
    Formatting,
}

/// Lifecycle status of a video record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    /// Initial state, metadata recorded but nothing fetched yet
    #[default]
    Discovered,
    /// Queued for download
    DownloadPending,
    /// Download in progress
    Downloading,
    /// Media on disk
    Downloaded,
    /// Download failed, retryable
    DownloadFailed,
    /// Queued for transcription
    TranscriptionPending,
    /// Transcription in progress
    Transcribing,
    /// Transcript on disk
    Transcribed,
    /// Transcription failed, retryable
    TranscriptionFailed,
    /// Queued for formatting
    FormattingPending,
    /// Formatting in progress
    Formatting,
    /// Formatted output on disk
    Formatted,
    /// Formatting failed, retryable
    FormattingFailed,
    /// All stages done
    Completed,
    /// Given up after exhausting retries
    Failed,
}

impl VideoStatus {
    /// All statuses, in pipeline order
    pub const ALL: [VideoStatus; 15] = [
        Self::Discovered,
        Self::DownloadPending,
        Self::Downloading,
        Self::Downloaded,
        Self::DownloadFailed,
        Self::TranscriptionPending,
        Self::Transcribing,
        Self::Transcribed,
        Self::TranscriptionFailed,
        Self::FormattingPending,
        Self::Formatting,
        Self::Formatted,
        Self::FormattingFailed,
        Self::Completed,
        Self::Failed,
    ];

    /// Check if this is a failure state (stage failure or terminal failure)
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Self::DownloadFailed | Self::TranscriptionFailed | Self::FormattingFailed | Self::Failed
        )
    }

    /// Check if this is a terminal state
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// The stage whose attempt counter is bumped when this status is entered
    pub fn attempt_stage(self) -> Option<Stage> {
        match self {
            Self::Downloading => Some(Stage::Download),
            Self::Transcribing => Some(Stage::Transcription),
            Self::Formatting => Some(Stage::Formatting),
            _ => None,
        }
    }

    /// The stage a stage-failure status belongs to (`None` for non-failure
    /// statuses and for the terminal `Failed`, which is past retrying)
    pub fn failure_stage(self) -> Option<Stage> {
        match self {
            Self::DownloadFailed => Some(Stage::Download),
            Self::TranscriptionFailed => Some(Stage::Transcription),
            Self::FormattingFailed => Some(Stage::Formatting),
            _ => None,
        }
    }

    /// Statuses a record is expected to be in immediately before entering
    /// this one. Exhaustive over the stage graph, including retry edges.
    pub fn expected_predecessors(self) -> &'static [VideoStatus] {
        use VideoStatus::*;
        match self {
            Discovered => &[],
            DownloadPending => &[Discovered, DownloadFailed],
            Downloading => &[DownloadPending, DownloadFailed],
            Downloaded => &[Downloading],
            DownloadFailed => &[Downloading],
            TranscriptionPending => &[Downloaded, TranscriptionFailed],
            Transcribing => &[TranscriptionPending, TranscriptionFailed],
            Transcribed => &[Transcribing],
            TranscriptionFailed => &[Transcribing],
            FormattingPending => &[Transcribed, FormattingFailed],
            Formatting => &[FormattingPending, FormattingFailed],
            Formatted => &[Formatting],
            FormattingFailed => &[Formatting],
            Completed => &[Formatted],
            Failed => &[DownloadFailed, TranscriptionFailed, FormattingFailed],
        }
    }

    /// Check whether arriving here from `previous` follows the stage graph.
    /// The store applies unexpected transitions anyway and only warns.
    pub fn expected_from(self, previous: VideoStatus) -> bool {
        self == previous || self.expected_predecessors().contains(&previous)
    }
}

impl std::fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discovered => write!(f, "discovered"),
            Self::DownloadPending => write!(f, "download_pending"),
            Self::Downloading => write!(f, "downloading"),
            Self::Downloaded => write!(f, "downloaded"),
            Self::DownloadFailed => write!(f, "download_failed"),
            Self::TranscriptionPending => write!(f, "transcription_pending"),
            Self::Transcribing => write!(f, "transcribing"),
            Self::Transcribed => write!(f, "transcribed"),
            Self::TranscriptionFailed => write!(f, "transcription_failed"),
            Self::FormattingPending => write!(f, "formatting_pending"),
            Self::Formatting => write!(f, "formatting"),
            Self::Formatted => write!(f, "formatted"),
            Self::FormattingFailed => write!(f, "formatting_failed"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for VideoStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use VideoStatus::*;
        Ok(match s {
            "discovered" => Discovered,
            "download_pending" => DownloadPending,
            "downloading" => Downloading,
            "downloaded" => Downloaded,
            "download_failed" => DownloadFailed,
            "transcription_pending" => TranscriptionPending,
            "transcribing" => Transcribing,
            "transcribed" => Transcribed,
            "transcription_failed" => TranscriptionFailed,
            "formatting_pending" => FormattingPending,
            "formatting" => Formatting,
            "formatted" => Formatted,
            "formatting_failed" => FormattingFailed,
            "completed" => Completed,
            "failed" => Failed,
            _ => return Err(StoreError::UnknownStatus(s.to_string())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_parse_round_trip() {
        for status in VideoStatus::ALL {
            let name = status.to_string();
            assert_eq!(name.parse::<VideoStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_display_matches_serde_name() {
        for status in VideoStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = "downloding".parse::<VideoStatus>().unwrap_err();
        assert!(matches!(err, StoreError::UnknownStatus(_)));
    }

    #[test]
    fn test_is_failure() {
        assert!(VideoStatus::DownloadFailed.is_failure());
        assert!(VideoStatus::TranscriptionFailed.is_failure());
        assert!(VideoStatus::FormattingFailed.is_failure());
        assert!(VideoStatus::Failed.is_failure());
        assert!(!VideoStatus::Downloaded.is_failure());
        assert!(!VideoStatus::Completed.is_failure());
    }

    #[test]
    fn test_is_terminal() {
        assert!(VideoStatus::Completed.is_terminal());
        assert!(VideoStatus::Failed.is_terminal());
        assert!(!VideoStatus::Formatted.is_terminal());
    }

    #[test]
    fn test_attempt_stage() {
        assert_eq!(VideoStatus::Downloading.attempt_stage(), Some(Stage::Download));
        assert_eq!(VideoStatus::Transcribing.attempt_stage(), Some(Stage::Transcription));
        assert_eq!(VideoStatus::Formatting.attempt_stage(), Some(Stage::Formatting));
        assert_eq!(VideoStatus::Downloaded.attempt_stage(), None);
    }

    #[test]
    fn test_failure_stage() {
        assert_eq!(VideoStatus::DownloadFailed.failure_stage(), Some(Stage::Download));
        assert_eq!(VideoStatus::Failed.failure_stage(), None);
    }

    #[test]
    fn test_expected_from_stage_graph() {
        use VideoStatus::*;
        assert!(DownloadPending.expected_from(Discovered));
        assert!(Downloading.expected_from(DownloadPending));
        assert!(Downloaded.expected_from(Downloading));
        assert!(TranscriptionPending.expected_from(Downloaded));
        assert!(Completed.expected_from(Formatted));

        // retry edges
        assert!(Downloading.expected_from(DownloadFailed));
        assert!(Transcribing.expected_from(TranscriptionFailed));
        assert!(Failed.expected_from(FormattingFailed));

        // out-of-order jumps
        assert!(!Completed.expected_from(Discovered));
        assert!(!Transcribing.expected_from(Downloading));
    }

    #[test]
    fn test_expected_from_accepts_same_status() {
        assert!(VideoStatus::Downloading.expected_from(VideoStatus::Downloading));
    }
}
