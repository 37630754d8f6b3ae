use serde::Serialize;
use std::path::PathBuf;

/// Installation result
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub install_dir: PathBuf,
    /// Jar launched by the launcher, relative to `install_dir`
    pub jar: PathBuf,
    pub launcher: PathBuf,
    pub desktop_entry: PathBuf,
    /// Installed icon, when the archive shipped one
    pub icon: Option<PathBuf>,
    /// Files extracted from the archive
    pub entries: usize,
    /// Windows executables removed
    pub stripped: usize,
    /// Java binary the launcher runs
    pub java: PathBuf,
}

/// Uninstall result
#[derive(Debug, Clone, Default, Serialize)]
pub struct UninstallReport {
    /// Paths that existed and were removed
    pub removed: Vec<PathBuf>,
}

impl UninstallReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}
