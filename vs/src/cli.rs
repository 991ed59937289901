//! CLI argument parsing for vidstore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::VideoStatus;

#[derive(Parser, Debug)]
#[command(name = "vs")]
#[command(author, version, about = "Lifecycle state tracker for video processing pipelines", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the state file location from the config
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Track new videos from a discovery metadata file
    Add {
        /// JSON file holding one record or an array of records
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Update the status of a tracked video
    Set {
        /// Video ID to update
        #[arg(required = true)]
        video_id: String,

        /// New status (snake_case, e.g. downloading, transcription_failed)
        #[arg(required = true)]
        status: VideoStatus,

        /// Error message, for failure statuses
        #[arg(short, long)]
        error: Option<String>,

        /// Artifact location produced by the stage
        #[arg(long, requires = "file_type")]
        file_path: Option<String>,

        /// Artifact kind (audio, transcript, json)
        #[arg(long, requires = "file_path")]
        file_type: Option<String>,
    },

    /// Print a tracked video as JSON
    Get {
        /// Video ID to look up
        #[arg(required = true)]
        video_id: String,
    },

    /// List tracked videos, optionally filtered by status
    List {
        /// Only show videos in this status
        #[arg(short, long)]
        status: Option<VideoStatus>,
    },

    /// List failed videos still eligible for retry
    Retryable {
        /// Attempt cap (default from config)
        #[arg(short, long)]
        max_attempts: Option<u32>,
    },

    /// Show aggregate status counters
    Stats,

    /// Show a summary of the store as JSON
    Summary,

    /// Remove failed records older than the threshold
    Cleanup {
        /// Age threshold in days (default from config)
        #[arg(short, long)]
        days: Option<i64>,
    },
}
