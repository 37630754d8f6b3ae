use serde::{Deserialize, Serialize};

use super::FailureContext;

/// HTTP download events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DownloadEvent {
    Started {
        url: String,
        total_size: Option<u64>,
    },

    /// Emitted per received chunk
    Progress {
        url: String,
        downloaded: u64,
        total: Option<u64>,
    },

    Completed {
        url: String,
        final_size: u64,
        duration_ms: u64,
    },

    Failed {
        url: String,
        failure: FailureContext,
    },
}
