//! Capability resolution error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Step label reported for package-manager installs
pub const STEP_PACKAGE_MANAGER: &str = "package_manager_install";

/// Step label reported for portable fallback installs
pub const STEP_PORTABLE_DOWNLOAD: &str = "portable_download_install";

/// Errors produced while resolving a capability
///
/// Every variant names the capability it was raised for so the caller can
/// render an actionable message without extra context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResolveError {
    #[error("{capability}: no package is known for the {family} package family and no portable fallback exists")]
    UnsupportedFamily { capability: String, family: String },

    #[error("{capability}: {family} failed to install {package}: {message}")]
    PackageManagerInstallFailed {
        capability: String,
        family: String,
        package: String,
        message: String,
    },

    #[error("{capability}: download from {url} failed: {message}")]
    DownloadFailed {
        capability: String,
        url: String,
        message: String,
    },

    #[error("{capability}: download from {url} returned an empty archive")]
    EmptyArchive { capability: String, url: String },

    #[error("{capability}: unrecognized archive layout: {message}")]
    UnidentifiableArchiveLayout { capability: String, message: String },

    #[error("{capability}: no portable runtime is published for architecture {arch}")]
    UnsupportedArchitecture { capability: String, arch: String },

    /// `capability` is empty when the string was parsed outside a resolution
    #[error("{capability}: cannot parse a major version from {input:?}")]
    VersionParseFailure {
        capability: String,
        input: String,
        /// Family of the install step that ran before the probe
        family: Option<String>,
        /// Step that reported success before the probe
        step: Option<String>,
    },

    #[error("{capability}: found major version {found}, need at least {required}")]
    VersionTooLow {
        capability: String,
        found: u32,
        required: u32,
        family: Option<String>,
        step: Option<String>,
    },

    #[error("{capability}: failed to stage portable install: {message}")]
    FallbackInstallFailed { capability: String, message: String },
}

impl ResolveError {
    /// Capability the error was raised for, if any
    #[must_use]
    pub fn capability(&self) -> Option<&str> {
        match self {
            Self::UnsupportedFamily { capability, .. }
            | Self::PackageManagerInstallFailed { capability, .. }
            | Self::DownloadFailed { capability, .. }
            | Self::EmptyArchive { capability, .. }
            | Self::UnidentifiableArchiveLayout { capability, .. }
            | Self::UnsupportedArchitecture { capability, .. }
            | Self::VersionTooLow { capability, .. }
            | Self::FallbackInstallFailed { capability, .. } => Some(capability),
            Self::VersionParseFailure { capability, .. } => {
                Some(capability.as_str()).filter(|name| !name.is_empty())
            }
        }
    }

    /// Package family that was attempted, for package-manager failures
    #[must_use]
    pub fn family(&self) -> Option<&str> {
        match self {
            Self::UnsupportedFamily { family, .. }
            | Self::PackageManagerInstallFailed { family, .. } => Some(family),
            Self::VersionParseFailure { family, .. } | Self::VersionTooLow { family, .. } => {
                family.as_deref()
            }
            _ => None,
        }
    }

    /// Kind of remediation step that produced the error
    ///
    /// `None` means no step ran (or the error is not tied to a step).
    #[must_use]
    pub fn step_kind(&self) -> Option<&str> {
        match self {
            Self::PackageManagerInstallFailed { .. } => Some(STEP_PACKAGE_MANAGER),
            Self::DownloadFailed { .. }
            | Self::EmptyArchive { .. }
            | Self::UnidentifiableArchiveLayout { .. }
            | Self::FallbackInstallFailed { .. } => Some(STEP_PORTABLE_DOWNLOAD),
            Self::VersionParseFailure { step, .. } | Self::VersionTooLow { step, .. } => {
                step.as_deref()
            }
            Self::UnsupportedFamily { .. } | Self::UnsupportedArchitecture { .. } => None,
        }
    }

    /// Attach the step that ran before a failing version probe
    ///
    /// Other variants already carry their step and are returned unchanged.
    #[must_use]
    pub fn after_step(self, step_family: Option<&str>, step_kind: &str) -> Self {
        match self {
            Self::VersionParseFailure {
                capability, input, ..
            } => Self::VersionParseFailure {
                capability,
                input,
                family: step_family.map(str::to_string),
                step: Some(step_kind.to_string()),
            },
            Self::VersionTooLow {
                capability,
                found,
                required,
                ..
            } => Self::VersionTooLow {
                capability,
                found,
                required,
                family: step_family.map(str::to_string),
                step: Some(step_kind.to_string()),
            },
            other => other,
        }
    }
}

impl UserFacingError for ResolveError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::UnsupportedFamily { .. } => {
                Some("Install the command with your distribution's package manager and retry.")
            }
            Self::PackageManagerInstallFailed { .. } => {
                Some("Check that the package manager works and that you can use sudo.")
            }
            Self::DownloadFailed { .. } | Self::EmptyArchive { .. } => {
                Some("Check your network connection and retry.")
            }
            Self::UnsupportedArchitecture { .. } => {
                Some("Install a Java 17+ runtime manually for this machine.")
            }
            Self::VersionTooLow { .. } => {
                Some("Remove the old runtime or put a newer one first on PATH.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::DownloadFailed { .. } | Self::EmptyArchive { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::UnsupportedFamily { .. } => "resolve.unsupported_family",
            Self::PackageManagerInstallFailed { .. } => "resolve.package_manager_install_failed",
            Self::DownloadFailed { .. } => "resolve.download_failed",
            Self::EmptyArchive { .. } => "resolve.empty_archive",
            Self::UnidentifiableArchiveLayout { .. } => "resolve.unidentifiable_archive_layout",
            Self::UnsupportedArchitecture { .. } => "resolve.unsupported_architecture",
            Self::VersionParseFailure { .. } => "resolve.version_parse_failure",
            Self::VersionTooLow { .. } => "resolve.version_too_low",
            Self::FallbackInstallFailed { .. } => "resolve.fallback_install_failed",
        };
        Some(code)
    }
}
