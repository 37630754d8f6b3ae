//! Remediation plans and resolution outcomes

use std::path::PathBuf;

use pbo_errors::{ResolveError, STEP_PACKAGE_MANAGER, STEP_PORTABLE_DOWNLOAD};
use serde::{Deserialize, Serialize};

use crate::arch::FallbackArch;
use crate::family::PackageFamily;

/// One action that may make a capability available
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemediationStep {
    PackageManagerInstall {
        family: PackageFamily,
        package: String,
    },
    PortableDownloadInstall {
        url: String,
        extract_dir: PathBuf,
        arch: FallbackArch,
    },
}

impl RemediationStep {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PackageManagerInstall { .. } => STEP_PACKAGE_MANAGER,
            Self::PortableDownloadInstall { .. } => STEP_PORTABLE_DOWNLOAD,
        }
    }
}

impl std::fmt::Display for RemediationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PackageManagerInstall { family, package } => {
                write!(f, "install {package} with {family}")
            }
            Self::PortableDownloadInstall {
                url, extract_dir, ..
            } => write!(f, "download {url} into {}", extract_dir.display()),
        }
    }
}

/// Ordered remediation steps for one requirement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemediationPlan {
    pub steps: Vec<RemediationStep>,
    /// Why a defined fallback could not be planned
    ///
    /// Reported only once every earlier step has been exhausted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_blocked: Option<ResolveError>,
}

impl RemediationPlan {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

/// A capability that is available after resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Satisfied {
    pub capability: String,
    /// Resolved command path
    pub path: PathBuf,
    /// Detected major version, when the requirement checks one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_version: Option<u32>,
    /// Steps that ran before the probe succeeded
    pub steps: Vec<RemediationStep>,
}

impl Satisfied {
    /// Whether the capability was already present
    #[must_use]
    pub fn was_present(&self) -> bool {
        self.steps.is_empty()
    }
}
