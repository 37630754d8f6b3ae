#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the pbo installer
//!
//! This crate provides the platform identity, package family table,
//! capability requirements and remediation plans shared by the resolver,
//! the installer and the CLI.

pub mod arch;
pub mod family;
pub mod identity;
pub mod plan;
pub mod requirement;
pub mod version;

// Re-export commonly used types
pub use arch::{current_machine, FallbackArch};
pub use family::{classify_family, PackageFamily, FAMILY_TABLE};
pub use identity::PlatformIdentity;
pub use plan::{RemediationPlan, RemediationStep, Satisfied};
pub use requirement::{CapabilityRequirement, PackageCandidates, PortableFallback};
pub use version::{extract_version_string, parse_major_version, VersionRequirement};

use serde::{Deserialize, Serialize};

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    #[default]
    Auto,
    Never,
}

// Implement clap::ValueEnum for ColorChoice
impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}
