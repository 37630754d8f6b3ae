//! Results of CLI commands, rendered as tables or JSON

use pbo_install::{InstallLayout, InstallReport, UninstallReport};
use pbo_resolver::ResolvePreview;
use pbo_types::{
    CapabilityRequirement, FallbackArch, PackageFamily, PlatformIdentity, RemediationStep,
    Satisfied,
};
use serde::Serialize;
use std::path::PathBuf;

/// Result of one command
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum CommandOutcome {
    Installed(InstallSummary),
    Uninstalled(UninstallReport),
    Ensured(Satisfied),
    Preview(PreviewReport),
    Doctor(DoctorReport),
}

impl CommandOutcome {
    /// Convert to JSON string
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Resolved capabilities that may need `bin_dir` on `PATH`
    pub fn resolved_paths(&self) -> Vec<&std::path::Path> {
        match self {
            Self::Installed(summary) => vec![summary.java.path.as_path()],
            Self::Ensured(satisfied) => vec![satisfied.path.as_path()],
            _ => Vec::new(),
        }
    }
}

/// `pbo install`
#[derive(Debug, Serialize)]
pub struct InstallSummary {
    pub java: Satisfied,
    pub game: InstallReport,
}

/// What a command would do under `--check`
#[derive(Debug, Default, Serialize)]
pub struct PreviewReport {
    pub capabilities: Vec<CapabilityStatus>,
    /// Install destination, for `install`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_target: Option<InstallLayout>,
    /// Existing paths an uninstall would remove
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removals: Vec<PathBuf>,
}

/// Probe result and pending plan for one capability
#[derive(Debug, Serialize)]
pub struct CapabilityStatus {
    pub name: String,
    pub command: String,
    pub family: PackageFamily,
    pub satisfied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub status: String,
    pub steps: Vec<RemediationStep>,
    /// Why the portable fallback cannot run here
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_blocked: Option<String>,
}

impl CapabilityStatus {
    pub fn from_preview(req: &CapabilityRequirement, preview: ResolvePreview) -> Self {
        let ResolvePreview {
            family,
            probe,
            plan,
        } = preview;
        Self {
            name: req.name.clone(),
            command: req.probe_command.clone(),
            family,
            satisfied: probe.is_satisfied(),
            path: probe.path().map(std::path::Path::to_path_buf),
            status: probe.describe(&req.probe_command),
            fallback_blocked: plan.fallback_blocked.map(|err| err.to_string()),
            steps: plan.steps,
        }
    }

    /// Short label for the status column
    pub fn label(&self) -> &'static str {
        match (self.satisfied, self.steps.is_empty()) {
            (true, _) => "ok",
            (false, false) => "fixable",
            (false, true) => "unavailable",
        }
    }
}

/// `pbo doctor`
#[derive(Debug, Serialize)]
pub struct DoctorReport {
    pub identity: PlatformIdentity,
    pub family: PackageFamily,
    pub machine: String,
    /// Portable runtime architecture, when one is published for `machine`
    pub fallback_arch: Option<FallbackArch>,
    pub escalation: Option<String>,
    pub bin_dir: PathBuf,
    pub capabilities: Vec<CapabilityStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbo_resolver::ProbeOutcome;
    use pbo_types::RemediationPlan;

    fn unzip() -> CapabilityRequirement {
        CapabilityRequirement::command("unzip")
    }

    #[test]
    fn test_status_from_missing_probe() {
        let preview = ResolvePreview {
            family: PackageFamily::Apt,
            probe: ProbeOutcome::Missing,
            plan: RemediationPlan {
                steps: vec![RemediationStep::PackageManagerInstall {
                    family: PackageFamily::Apt,
                    package: "unzip".to_string(),
                }],
                fallback_blocked: None,
            },
        };
        let status = CapabilityStatus::from_preview(&unzip(), preview);
        assert!(!status.satisfied);
        assert_eq!(status.label(), "fixable");
        assert_eq!(status.status, "unzip not found");
        assert!(status.path.is_none());
    }

    #[test]
    fn test_status_unavailable_without_steps() {
        let preview = ResolvePreview {
            family: PackageFamily::Unknown,
            probe: ProbeOutcome::Missing,
            plan: RemediationPlan::empty(),
        };
        let status = CapabilityStatus::from_preview(&unzip(), preview);
        assert_eq!(status.label(), "unavailable");
    }

    #[test]
    fn test_outcome_json_is_tagged() {
        let outcome = CommandOutcome::Ensured(Satisfied {
            capability: "unzip".to_string(),
            path: PathBuf::from("/usr/bin/unzip"),
            major_version: None,
            steps: Vec::new(),
        });
        let value: serde_json::Value = serde_json::from_str(&outcome.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "ensured");
        assert_eq!(value["data"]["path"], "/usr/bin/unzip");
        assert_eq!(outcome.resolved_paths().len(), 1);
    }
}
