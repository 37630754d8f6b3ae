//! Capability resolver implementation

use pbo_errors::{Error, ResolveError};
use pbo_events::{AppEvent, EventEmitter, EventSender, FailureContext, ResolverEvent};
use pbo_net::NetClient;
use pbo_platform::{PlatformContext, ProcessOperations};
use pbo_types::{
    CapabilityRequirement, PackageFamily, PlatformIdentity, RemediationPlan, RemediationStep,
    Satisfied,
};
use std::path::PathBuf;
use std::sync::Arc;

use crate::fallback::{install_portable, FallbackTarget};
use crate::manager::PackageManager;
use crate::plan::plan_for;
use crate::probe::{probe, ProbeOutcome};

/// Host-specific inputs to resolution
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    /// Directory holding exposed fallback binaries; probed before `PATH`
    pub bin_dir: PathBuf,
    /// Install directory of the portable runtime
    pub runtime_dir: PathBuf,
    /// Machine name, as printed by `uname -m`
    pub machine: String,
    /// Privilege escalation command for package-manager calls
    pub escalation: Option<String>,
    /// Run the family's index refresh before the first install
    pub refresh_index: bool,
}

/// Result of a dry run
#[derive(Debug, Clone)]
pub struct ResolvePreview {
    pub family: PackageFamily,
    pub probe: ProbeOutcome,
    /// Empty when the probe already succeeds
    pub plan: RemediationPlan,
}

/// Capability resolver
///
/// Resolves one requirement at a time: probe, then run the remediation plan
/// step by step, re-probing after each step that reports success.
pub struct Resolver {
    process: Arc<dyn ProcessOperations>,
    net: NetClient,
    tx: EventSender,
    ctx: PlatformContext,
    settings: ResolverSettings,
    manager: PackageManager,
}

impl Resolver {
    pub fn new(
        process: Arc<dyn ProcessOperations>,
        net: NetClient,
        tx: EventSender,
        settings: ResolverSettings,
    ) -> Self {
        let manager = PackageManager::new(settings.escalation.clone(), settings.refresh_index);
        Self {
            process,
            ctx: PlatformContext::new(Some(tx.clone())),
            net,
            tx,
            settings,
            manager,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    fn search_dirs(&self) -> Vec<PathBuf> {
        vec![self.settings.bin_dir.clone()]
    }

    /// Probe a requirement without changing anything
    ///
    /// # Errors
    ///
    /// Returns an error if the command lookup fails for a reason other than
    /// the command being absent.
    pub async fn probe(&self, req: &CapabilityRequirement) -> Result<ProbeOutcome, Error> {
        probe(&*self.process, &self.ctx, req, &self.search_dirs()).await
    }

    /// Compute what `resolve` would do, without running any step
    ///
    /// # Errors
    ///
    /// Returns an error if probing fails.
    pub async fn plan(
        &self,
        req: &CapabilityRequirement,
        identity: &PlatformIdentity,
    ) -> Result<ResolvePreview, Error> {
        let family = PackageFamily::classify(identity);
        let outcome = self.probe(req).await?;
        let plan = if outcome.is_satisfied() {
            RemediationPlan::empty()
        } else {
            plan_for(
                req,
                family,
                &self.settings.machine,
                &self.settings.runtime_dir,
            )
        };
        Ok(ResolvePreview {
            family,
            probe: outcome,
            plan,
        })
    }

    /// Make `req` available on this host
    ///
    /// # Errors
    ///
    /// Returns `Error::Resolve` naming the last attempted step when every
    /// step is exhausted, `UnsupportedFamily` when there is nothing to try,
    /// or a platform error if probing itself fails.
    pub async fn resolve(
        &self,
        req: &CapabilityRequirement,
        identity: &PlatformIdentity,
    ) -> Result<Satisfied, Error> {
        if let ProbeOutcome::Satisfied {
            path,
            major_version,
        } = self.probe(req).await?
        {
            self.emit_resolver(ResolverEvent::AlreadySatisfied {
                capability: req.name.clone(),
                path: path.clone(),
            });
            return Ok(Satisfied {
                capability: req.name.clone(),
                path,
                major_version,
                steps: Vec::new(),
            });
        }

        let family = PackageFamily::classify(identity);
        self.emit_resolver(ResolverEvent::Resolving {
            capability: req.name.clone(),
            family: family.to_string(),
        });

        let plan = plan_for(
            req,
            family,
            &self.settings.machine,
            &self.settings.runtime_dir,
        );

        if plan.is_empty() {
            let err = plan
                .fallback_blocked
                .unwrap_or_else(|| ResolveError::UnsupportedFamily {
                    capability: req.name.clone(),
                    family: family.to_string(),
                });
            return Err(self.fail(req, err));
        }

        self.emit_resolver(ResolverEvent::PlanReady {
            capability: req.name.clone(),
            steps: plan.steps.iter().map(ToString::to_string).collect(),
        });

        let mut executed = Vec::with_capacity(plan.len());
        let mut last_failure = None;

        for step in &plan.steps {
            self.emit_resolver(ResolverEvent::StepStarted {
                capability: req.name.clone(),
                kind: step.kind().to_string(),
                description: step.to_string(),
            });
            executed.push(step.clone());

            if let Err(err) = self.run_step(req, step).await {
                self.emit_resolver(ResolverEvent::StepFailed {
                    capability: req.name.clone(),
                    kind: step.kind().to_string(),
                    failure: FailureContext::from_error(&err),
                });
                last_failure = Some(err);
                continue;
            }

            let outcome = self.probe(req).await?;
            if let ProbeOutcome::Satisfied {
                path,
                major_version,
            } = outcome
            {
                self.emit_resolver(ResolverEvent::Satisfied {
                    capability: req.name.clone(),
                    path: path.clone(),
                    steps_run: executed.len(),
                });
                return Ok(Satisfied {
                    capability: req.name.clone(),
                    path,
                    major_version,
                    steps: executed,
                });
            }

            self.emit_resolver(ResolverEvent::ProbeUnsatisfied {
                capability: req.name.clone(),
                reason: outcome.describe(&req.probe_command),
            });
            last_failure = Some(unsatisfied_after(req, step, &outcome));
        }

        let err = plan
            .fallback_blocked
            .or(last_failure)
            .unwrap_or_else(|| ResolveError::UnsupportedFamily {
                capability: req.name.clone(),
                family: family.to_string(),
            });
        Err(self.fail(req, err))
    }

    async fn run_step(
        &self,
        req: &CapabilityRequirement,
        step: &RemediationStep,
    ) -> Result<(), ResolveError> {
        match step {
            RemediationStep::PackageManagerInstall { family, package } => {
                self.manager
                    .install(&*self.process, &self.ctx, &req.name, *family, package)
                    .await
            }
            RemediationStep::PortableDownloadInstall {
                url, extract_dir, ..
            } => {
                let Some(fallback) = &req.fallback else {
                    return Err(ResolveError::FallbackInstallFailed {
                        capability: req.name.clone(),
                        message: "no portable runtime is defined".to_string(),
                    });
                };
                let target = FallbackTarget {
                    url,
                    extract_dir,
                    bin_dir: &self.settings.bin_dir,
                    link_name: &req.probe_command,
                };
                let link = install_portable(&self.net, &self.tx, &req.name, fallback, &target)
                    .await?;
                self.tx
                    .emit_debug(format!("exposed {} at {}", req.probe_command, link.display()));
                Ok(())
            }
        }
    }

    fn emit_resolver(&self, event: ResolverEvent) {
        self.tx.emit(AppEvent::Resolver(event));
    }

    fn fail(&self, req: &CapabilityRequirement, err: ResolveError) -> Error {
        self.emit_resolver(ResolverEvent::Failed {
            capability: req.name.clone(),
            failure: FailureContext::from_error(&err),
        });
        err.into()
    }
}

/// Error for a step that reported success while the probe still fails
fn unsatisfied_after(
    req: &CapabilityRequirement,
    step: &RemediationStep,
    outcome: &ProbeOutcome,
) -> ResolveError {
    if let Some(err) = outcome.version_error(&req.name) {
        let family = match step {
            RemediationStep::PackageManagerInstall { family, .. } => Some(family.as_str()),
            RemediationStep::PortableDownloadInstall { .. } => None,
        };
        return err.after_step(family, step.kind());
    }
    match step {
        RemediationStep::PackageManagerInstall { family, package } => {
            ResolveError::PackageManagerInstallFailed {
                capability: req.name.clone(),
                family: family.to_string(),
                package: package.clone(),
                message: format!(
                    "install reported success but {} is still not on the search path",
                    req.probe_command
                ),
            }
        }
        RemediationStep::PortableDownloadInstall { .. } => {
            ResolveError::UnidentifiableArchiveLayout {
                capability: req.name.clone(),
                message: format!(
                    "runtime installed but {} could not be run from it",
                    req.probe_command
                ),
            }
        }
    }
}
