//! Machine architecture names used by portable runtime downloads

use pbo_errors::ResolveError;
use serde::{Deserialize, Serialize};

/// Architectures for which a portable runtime is published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackArch {
    X64,
    Aarch64,
}

impl FallbackArch {
    /// Map a machine name (as printed by `uname -m`) to the download name
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::UnsupportedArchitecture` for anything other
    /// than `x86_64` or `aarch64`.
    pub fn from_machine(capability: &str, machine: &str) -> Result<Self, ResolveError> {
        match machine.trim() {
            "x86_64" | "amd64" => Ok(Self::X64),
            "aarch64" | "arm64" => Ok(Self::Aarch64),
            other => Err(ResolveError::UnsupportedArchitecture {
                capability: capability.to_string(),
                arch: other.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X64 => "x64",
            Self::Aarch64 => "aarch64",
        }
    }
}

impl std::fmt::Display for FallbackArch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine name of the running build target
#[must_use]
pub fn current_machine() -> &'static str {
    std::env::consts::ARCH
}
