//! Capability requirements consumed by the resolver

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::arch::FallbackArch;
use crate::family::PackageFamily;
use crate::version::VersionRequirement;

/// Package names to try for one family, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageCandidates {
    pub primary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate: Option<String>,
}

impl PackageCandidates {
    pub fn single(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            alternate: None,
        }
    }

    pub fn with_alternate(primary: impl Into<String>, alternate: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            alternate: Some(alternate.into()),
        }
    }

    /// Primary name followed by the alternate, if any
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.alternate.as_deref())
    }
}

/// Self-contained runtime archive installed outside the package manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortableFallback {
    /// URL with `{version}` and `{arch}` placeholders
    pub url_template: String,
    /// Runtime version substituted for `{version}`
    pub version: u32,
    /// Binary path relative to the archive's top-level directory
    pub binary: String,
}

impl PortableFallback {
    #[must_use]
    pub fn url_for(&self, arch: FallbackArch) -> String {
        self.url_template
            .replace("{version}", &self.version.to_string())
            .replace("{arch}", arch.as_str())
    }
}

/// A command that must be runnable before installation can proceed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityRequirement {
    /// Human label used in errors and events
    pub name: String,
    /// Command looked up on the search path
    pub probe_command: String,
    /// Package names per family; a missing entry means unsupported there
    pub packages: BTreeMap<PackageFamily, PackageCandidates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<VersionRequirement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<PortableFallback>,
}

impl CapabilityRequirement {
    /// Requirement whose probe command and package name are both `command`
    /// on every known family
    pub fn command(command: impl Into<String>) -> Self {
        let command = command.into();
        let packages = PackageFamily::KNOWN
            .iter()
            .map(|family| (*family, PackageCandidates::single(command.clone())))
            .collect();
        Self {
            name: command.clone(),
            probe_command: command,
            packages,
            min_version: None,
            fallback: None,
        }
    }

    pub fn new(name: impl Into<String>, probe_command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            probe_command: probe_command.into(),
            packages: BTreeMap::new(),
            min_version: None,
            fallback: None,
        }
    }

    #[must_use]
    pub fn with_package(mut self, family: PackageFamily, candidates: PackageCandidates) -> Self {
        self.packages.insert(family, candidates);
        self
    }

    #[must_use]
    pub fn with_min_version(mut self, requirement: VersionRequirement) -> Self {
        self.min_version = Some(requirement);
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: PortableFallback) -> Self {
        self.fallback = Some(fallback);
        self
    }

    #[must_use]
    pub fn packages_for(&self, family: PackageFamily) -> Option<&PackageCandidates> {
        self.packages.get(&family)
    }
}
