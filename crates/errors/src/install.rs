//! Game installation error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InstallError {
    #[error("installation failed: {message}")]
    Failed { message: String },

    #[error("download from {url} returned an empty file")]
    EmptyDownload { url: String },

    #[error("extraction failed: {message}")]
    ExtractionFailed { message: String },

    #[error("no game jar found under {path}")]
    GameJarNotFound { path: String },

    #[error("atomic operation failed: {message}")]
    AtomicOperationFailed { message: String },

    #[error("filesystem operation failed: {operation} on {path}: {message}")]
    FilesystemError {
        operation: String,
        path: String,
        message: String,
    },
}

impl UserFacingError for InstallError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::EmptyDownload { .. } => Some("The download server returned nothing; retry later."),
            Self::ExtractionFailed { .. } => {
                Some("The game archive looks corrupt; retry the installation.")
            }
            Self::GameJarNotFound { .. } => {
                Some("Set `game.jar` in the configuration file to the game's jar.")
            }
            Self::FilesystemError { .. } | Self::AtomicOperationFailed { .. } => {
                Some("Check permissions on the install directory and retry.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::EmptyDownload { .. } | Self::ExtractionFailed { .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Failed { .. } => "install.failed",
            Self::EmptyDownload { .. } => "install.empty_download",
            Self::ExtractionFailed { .. } => "install.extraction_failed",
            Self::GameJarNotFound { .. } => "install.game_jar_not_found",
            Self::AtomicOperationFailed { .. } => "install.atomic_failed",
            Self::FilesystemError { .. } => "install.filesystem_error",
        };
        Some(code)
    }
}
