use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;

/// Game installation and removal events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstallEvent {
    Started { install_dir: PathBuf },

    Extracted { entries: usize },

    WindowsFilesStripped { count: usize },

    LauncherWritten { path: PathBuf },

    DesktopEntryWritten { path: PathBuf },

    /// A desktop cache tool was missing or failed; not fatal
    CacheRefreshSkipped { tool: String, reason: String },

    Completed { install_dir: PathBuf },

    Failed { failure: FailureContext },

    Removed { path: PathBuf },

    UninstallCompleted { removed: usize },
}
