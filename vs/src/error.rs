//! Store error types

use thiserror::Error;

/// Errors surfaced by store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record cannot be tracked without an id
    #[error("video_id is required")]
    MissingId,

    /// A status string that is not one of the known lifecycle states
    #[error("unknown status: {0}")]
    UnknownStatus(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(StoreError::MissingId.to_string(), "video_id is required");
        assert_eq!(
            StoreError::UnknownStatus("downloding".to_string()).to_string(),
            "unknown status: downloding"
        );
    }
}
