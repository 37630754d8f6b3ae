//! Capability probing
//!
//! A probe never trusts an installer's exit status: it looks the command up
//! on the search path and, when the requirement has a minimum version, runs
//! it and parses the reported major version.

use pbo_errors::{Error, PlatformError, ResolveError};
use pbo_platform::{PlatformContext, ProcessOperations};
use pbo_types::{extract_version_string, parse_major_version, CapabilityRequirement};
use std::path::{Path, PathBuf};

/// Result of probing one capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Satisfied {
        path: PathBuf,
        major_version: Option<u32>,
    },
    /// Not on the search path
    Missing,
    /// Present, but older than required
    TooLow {
        path: PathBuf,
        found: u32,
        required: u32,
    },
    /// Present, but its version output could not be understood
    Unparseable { path: PathBuf, input: String },
}

impl ProbeOutcome {
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied { .. })
    }

    /// Path of the command, if it was found at all
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Satisfied { path, .. }
            | Self::TooLow { path, .. }
            | Self::Unparseable { path, .. } => Some(path),
            Self::Missing => None,
        }
    }

    /// Version error for a command that exists but is insufficient
    #[must_use]
    pub fn version_error(&self, capability: &str) -> Option<ResolveError> {
        match self {
            Self::TooLow {
                found, required, ..
            } => Some(ResolveError::VersionTooLow {
                capability: capability.to_string(),
                found: *found,
                required: *required,
                family: None,
                step: None,
            }),
            Self::Unparseable { input, .. } => Some(ResolveError::VersionParseFailure {
                capability: capability.to_string(),
                input: input.clone(),
                family: None,
                step: None,
            }),
            Self::Satisfied { .. } | Self::Missing => None,
        }
    }

    /// Short human description
    #[must_use]
    pub fn describe(&self, command: &str) -> String {
        match self {
            Self::Satisfied {
                path,
                major_version: Some(major),
            } => format!("{} (major {major})", path.display()),
            Self::Satisfied { path, .. } => path.display().to_string(),
            Self::Missing => format!("{command} not found"),
            Self::TooLow {
                found, required, ..
            } => format!("{command} is version {found}, need {required}"),
            Self::Unparseable { input, .. } => {
                format!("{command} printed an unrecognized version: {input}")
            }
        }
    }
}

/// Probe `req`, searching `extra_dirs` before `PATH`
///
/// # Errors
///
/// Returns an error only for lookup failures other than "not found".
pub async fn probe(
    ops: &dyn ProcessOperations,
    ctx: &PlatformContext,
    req: &CapabilityRequirement,
    extra_dirs: &[PathBuf],
) -> Result<ProbeOutcome, Error> {
    let path = match ops.which(&req.probe_command, extra_dirs).await {
        Ok(path) => path,
        Err(Error::Platform(PlatformError::CommandNotFound { .. })) => {
            return Ok(ProbeOutcome::Missing)
        }
        Err(e) => return Err(e),
    };

    let Some(min_version) = &req.min_version else {
        return Ok(ProbeOutcome::Satisfied {
            path,
            major_version: None,
        });
    };

    let mut cmd = ops.create_command(&path.to_string_lossy());
    cmd.args(&min_version.args);

    let text = match ops.execute_command(ctx, cmd).await {
        Ok(output) => output.combined_text(),
        // Found but not runnable, e.g. a dangling link into a removed runtime
        Err(Error::Platform(PlatformError::ProcessExecutionFailed { message, .. })) => {
            return Ok(ProbeOutcome::Unparseable {
                path,
                input: message,
            })
        }
        Err(e) => return Err(e),
    };

    let Some(version) = extract_version_string(&text) else {
        return Ok(ProbeOutcome::Unparseable {
            path,
            input: text.lines().next().unwrap_or_default().trim().to_string(),
        });
    };

    Ok(match parse_major_version(version) {
        Ok(major) if min_version.is_satisfied_by(major) => ProbeOutcome::Satisfied {
            path,
            major_version: Some(major),
        },
        Ok(major) => ProbeOutcome::TooLow {
            path,
            found: major,
            required: min_version.min_major,
        },
        Err(_) => ProbeOutcome::Unparseable {
            path,
            input: version.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_error_mapping() {
        let too_low = ProbeOutcome::TooLow {
            path: PathBuf::from("/usr/bin/java"),
            found: 11,
            required: 17,
        };
        assert_eq!(
            too_low.version_error("java"),
            Some(ResolveError::VersionTooLow {
                capability: "java".into(),
                found: 11,
                required: 17,
                family: None,
                step: None,
            })
        );
        assert!(ProbeOutcome::Missing.version_error("java").is_none());
        assert_eq!(ProbeOutcome::Missing.describe("java"), "java not found");
    }
}
