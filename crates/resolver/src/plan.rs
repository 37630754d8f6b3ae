//! Remediation planning

use pbo_types::{
    CapabilityRequirement, FallbackArch, PackageFamily, RemediationPlan, RemediationStep,
};
use std::path::Path;

/// Build the ordered remediation plan for `req` on `family`
///
/// Package-manager steps come first: the primary package and then the
/// alternate, both for the same family. A defined portable fallback follows.
/// When the fallback cannot be planned for `machine`, the reason is kept in
/// `fallback_blocked` instead of a step.
pub fn plan_for(
    req: &CapabilityRequirement,
    family: PackageFamily,
    machine: &str,
    runtime_dir: &Path,
) -> RemediationPlan {
    let mut plan = RemediationPlan::empty();

    if family.is_known() {
        if let Some(candidates) = req.packages_for(family) {
            plan.steps
                .extend(candidates.iter().map(|package| RemediationStep::PackageManagerInstall {
                    family,
                    package: package.to_string(),
                }));
        }
    }

    if let Some(fallback) = &req.fallback {
        match FallbackArch::from_machine(&req.name, machine) {
            Ok(arch) => plan.steps.push(RemediationStep::PortableDownloadInstall {
                url: fallback.url_for(arch),
                extract_dir: runtime_dir.to_path_buf(),
                arch,
            }),
            Err(e) => plan.fallback_blocked = Some(e),
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use pbo_errors::ResolveError;
    use pbo_types::PortableFallback;

    fn java_with_fallback() -> CapabilityRequirement {
        catalog::java(
            17,
            Some(PortableFallback {
                url_template: "https://example.com/{version}/{arch}".into(),
                version: 17,
                binary: "bin/java".into(),
            }),
        )
    }

    #[test]
    fn test_apt_java_plan() {
        let plan = plan_for(
            &java_with_fallback(),
            PackageFamily::Apt,
            "x86_64",
            Path::new("/opt/java"),
        );
        assert_eq!(plan.len(), 3);
        assert_eq!(
            plan.steps[0],
            RemediationStep::PackageManagerInstall {
                family: PackageFamily::Apt,
                package: "openjdk-17-jre".into()
            }
        );
        assert_eq!(
            plan.steps[2],
            RemediationStep::PortableDownloadInstall {
                url: "https://example.com/17/x64".into(),
                extract_dir: "/opt/java".into(),
                arch: FallbackArch::X64,
            }
        );
        assert!(plan.fallback_blocked.is_none());
    }

    #[test]
    fn test_unknown_family_only_fallback() {
        let plan = plan_for(
            &java_with_fallback(),
            PackageFamily::Unknown,
            "aarch64",
            Path::new("/opt/java"),
        );
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.steps[0].kind(), pbo_errors::STEP_PORTABLE_DOWNLOAD);
    }

    #[test]
    fn test_unsupported_arch_blocks_fallback() {
        let plan = plan_for(
            &java_with_fallback(),
            PackageFamily::Dnf,
            "riscv64",
            Path::new("/opt/java"),
        );
        assert_eq!(plan.len(), 2);
        assert!(matches!(
            plan.fallback_blocked,
            Some(ResolveError::UnsupportedArchitecture { ref arch, .. }) if arch == "riscv64"
        ));
    }

    #[test]
    fn test_no_steps_for_unknown_without_fallback() {
        let plan = plan_for(
            &catalog::unzip(),
            PackageFamily::Unknown,
            "x86_64",
            Path::new("/opt/java"),
        );
        assert!(plan.is_empty());
        assert!(plan.fallback_blocked.is_none());
    }
}
