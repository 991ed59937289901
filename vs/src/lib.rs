//! vidstore - crash-consistent lifecycle tracking for video pipelines
//!
//! Vidstore keeps one record per discovered video as it moves through the
//! download -> transcription -> formatting pipeline, together with aggregate
//! per-status counters and store metadata. The whole state persists as a
//! single JSON snapshot with batched, atomic writes, so a crash never leaves
//! a half-written file behind: readers observe either the previous or the
//! fully-written snapshot.
//!
//! # Example
//!
//! ```ignore
//! use vidstore::{StateStore, StatusChange, VideoMeta, VideoStatus};
//!
//! let mut store = StateStore::open("db/video_state.json")?;
//! store.add(VideoMeta { video_id: "abc123".into(), ..Default::default() })?;
//! store.update_status("abc123", VideoStatus::Downloading, StatusChange::default());
//! store.update_status(
//!     "abc123",
//!     VideoStatus::Downloaded,
//!     StatusChange::artifact("audio", "/data/audio/abc123.mp3"),
//! );
//! store.flush();
//! ```
//!
//! # Modules
//!
//! - [`domain`] - the record entity and its status model
//! - [`stats`] - aggregate per-status counters
//! - [`persistence`] - snapshot load/save with migration, batching and backups
//! - [`store`] - the `StateStore` facade all callers go through
//! - [`config`] - YAML configuration with fallback chain
//! - [`cli`] - command-line argument types

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod stats;
pub mod store;

pub use config::Config;
pub use domain::{Stage, VideoMeta, VideoRecord, VideoStatus, now_iso, parse_iso};
pub use error::StoreError;
pub use persistence::{DEFAULT_SAVE_INTERVAL, SCHEMA_VERSION, Snapshot, StateFile, StoreMeta};
pub use stats::PipelineStats;
pub use store::{StateStore, StatusChange, StoreOptions, StoreSummary, VideoDigest};
