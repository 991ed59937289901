//! vidstore CLI entry point

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::info;

use vidstore::cli::{Cli, Command};
use vidstore::config::Config;
use vidstore::{StateStore, StatusChange, VideoMeta};

fn setup_logging() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let state_file = cli.state_file.unwrap_or_else(|| config.store.state_file.clone());

    info!(path = %state_file.display(), "vidstore starting");
    let mut store = StateStore::open_with(&state_file, config.store.options())?;

    match cli.command {
        Command::Add { file } => {
            let content =
                std::fs::read_to_string(&file).context(format!("Failed to read {}", file.display()))?;
            let metas = parse_meta_file(&content)?;

            let mut added = 0usize;
            for meta in metas {
                if store.add(meta)? {
                    added += 1;
                }
            }
            store.flush();
            println!("{} Added {} video(s)", "✓".green(), added);
        }
        Command::Set {
            video_id,
            status,
            error,
            file_path,
            file_type,
        } => {
            let change = StatusChange {
                error_message: error,
                file_path,
                file_type,
            };
            if !store.update_status(&video_id, status, change) {
                return Err(eyre::eyre!("unknown video: {}", video_id));
            }
            store.flush();
            println!("{} {} -> {}", "✓".green(), video_id.cyan(), status.to_string().yellow());
        }
        Command::Get { video_id } => {
            let record = store
                .get(&video_id)
                .ok_or_else(|| eyre::eyre!("unknown video: {}", video_id))?;
            println!("{}", serde_json::to_string_pretty(record)?);
        }
        Command::List { status } => {
            let records: Vec<_> = match status {
                Some(status) => store.list_by_status(status),
                None => store.records().collect(),
            };
            if records.is_empty() {
                println!("No videos found");
            }
            for record in records {
                println!(
                    "{}  {}  {}",
                    record.video_id.yellow(),
                    record.status.to_string().cyan(),
                    record.title
                );
            }
        }
        Command::Retryable { max_attempts } => {
            let max = max_attempts.unwrap_or(config.retry.max_attempts);
            let records = store.list_retryable(max);
            if records.is_empty() {
                println!("No retryable videos");
            }
            for record in records {
                let attempts = record
                    .status
                    .failure_stage()
                    .map(|stage| record.attempts_for(stage))
                    .unwrap_or(0);
                println!(
                    "{}  {}  attempts: {}/{}",
                    record.video_id.yellow(),
                    record.status.to_string().red(),
                    attempts,
                    max
                );
            }
        }
        Command::Stats => {
            let stats = store.stats();
            println!("Videos tracked: {}", store.len());
            println!("  Total discovered: {}", stats.total_discovered);
            println!("  Download pending: {}", stats.download_pending);
            println!("  Downloaded: {}", stats.downloaded);
            println!("  Download failed: {}", stats.download_failed);
            println!("  Transcription pending: {}", stats.transcription_pending);
            println!("  Transcribed: {}", stats.transcribed);
            println!("  Transcription failed: {}", stats.transcription_failed);
            println!("  Formatting pending: {}", stats.formatting_pending);
            println!("  Formatted: {}", stats.formatted);
            println!("  Formatting failed: {}", stats.formatting_failed);
            println!("  Completed: {}", stats.completed);
            println!("  Failed: {}", stats.failed);
        }
        Command::Summary => {
            let summary = store.export_summary();
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Cleanup { days } => {
            let days = days.unwrap_or(config.cleanup.stale_days);
            let removed = store.cleanup_stale(days);
            println!("{} Removed {} stale record(s)", "✓".green(), removed);
        }
    }

    Ok(())
}

/// Parse a metadata file holding either one record or an array of records
fn parse_meta_file(content: &str) -> Result<Vec<VideoMeta>> {
    if let Ok(list) = serde_json::from_str::<Vec<VideoMeta>>(content) {
        return Ok(list);
    }
    let single: VideoMeta = serde_json::from_str(content).context("Failed to parse video metadata")?;
    Ok(vec![single])
}
