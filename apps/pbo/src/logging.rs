//! Structured logging integration for events
//!
//! Every domain event is mirrored into a `tracing` record with structured
//! fields, so `--debug` log files carry the full resolution history.

use pbo_events::{
    AppEvent, DownloadEvent, GeneralEvent, InstallEvent, PlatformEvent, ResolverEvent,
};
use tracing::{debug, error, info, trace, warn};

/// Log an `AppEvent` using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(event: &AppEvent) {
    let source = event.event_source();
    let source = source.as_str();

    match event {
        AppEvent::Resolver(resolver_event) => match resolver_event {
            ResolverEvent::Resolving { capability, family } => {
                info!(source, capability = %capability, family = %family, "Resolving capability");
            }
            ResolverEvent::AlreadySatisfied { capability, path } => {
                info!(
                    source,
                    capability = %capability,
                    path = %path.display(),
                    "Capability already satisfied"
                );
            }
            ResolverEvent::PlanReady { capability, steps } => {
                info!(
                    source,
                    capability = %capability,
                    step_count = steps.len(),
                    steps = ?steps,
                    "Remediation plan ready"
                );
            }
            ResolverEvent::StepStarted {
                capability,
                kind,
                description,
            } => {
                info!(
                    source,
                    capability = %capability,
                    kind = %kind,
                    description = %description,
                    "Remediation step started"
                );
            }
            ResolverEvent::StepFailed {
                capability,
                kind,
                failure,
            } => {
                warn!(
                    source,
                    capability = %capability,
                    kind = %kind,
                    code = ?failure.code,
                    message = %failure.message,
                    retryable = failure.retryable,
                    "Remediation step failed"
                );
            }
            ResolverEvent::ProbeUnsatisfied { capability, reason } => {
                warn!(
                    source,
                    capability = %capability,
                    reason = %reason,
                    "Probe still unsatisfied after step"
                );
            }
            ResolverEvent::Satisfied {
                capability,
                path,
                steps_run,
            } => {
                info!(
                    source,
                    capability = %capability,
                    path = %path.display(),
                    steps_run = steps_run,
                    "Capability satisfied"
                );
            }
            ResolverEvent::Failed {
                capability,
                failure,
            } => {
                error!(
                    source,
                    capability = %capability,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Capability resolution failed"
                );
            }
        },

        AppEvent::Download(download_event) => match download_event {
            DownloadEvent::Started { url, total_size } => {
                info!(source, url = %url, total_size = ?total_size, "Download started");
            }
            DownloadEvent::Progress {
                url,
                downloaded,
                total,
            } => {
                trace!(source, url = %url, downloaded = downloaded, total = ?total, "Download progress");
            }
            DownloadEvent::Completed {
                url,
                final_size,
                duration_ms,
            } => {
                info!(
                    source,
                    url = %url,
                    final_size = final_size,
                    duration_ms = duration_ms,
                    "Download completed"
                );
            }
            DownloadEvent::Failed { url, failure } => {
                error!(
                    source,
                    url = %url,
                    code = ?failure.code,
                    message = %failure.message,
                    retryable = failure.retryable,
                    "Download failed"
                );
            }
        },

        AppEvent::Install(install_event) => match install_event {
            InstallEvent::Started { install_dir } => {
                info!(source, install_dir = %install_dir.display(), "Game installation started");
            }
            InstallEvent::Extracted { entries } => {
                debug!(source, entries = entries, "Game archive extracted");
            }
            InstallEvent::WindowsFilesStripped { count } => {
                debug!(source, count = count, "Windows executables removed");
            }
            InstallEvent::LauncherWritten { path } => {
                debug!(source, path = %path.display(), "Launcher written");
            }
            InstallEvent::DesktopEntryWritten { path } => {
                debug!(source, path = %path.display(), "Desktop entry written");
            }
            InstallEvent::CacheRefreshSkipped { tool, reason } => {
                warn!(source, tool = %tool, reason = %reason, "Desktop cache refresh skipped");
            }
            InstallEvent::Completed { install_dir } => {
                info!(source, install_dir = %install_dir.display(), "Game installation completed");
            }
            InstallEvent::Failed { failure } => {
                error!(
                    source,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Game installation failed"
                );
            }
            InstallEvent::Removed { path } => {
                info!(source, path = %path.display(), "Path removed");
            }
            InstallEvent::UninstallCompleted { removed } => {
                info!(source, removed = removed, "Uninstall completed");
            }
        },

        AppEvent::Platform(platform_event) => match platform_event {
            PlatformEvent::CommandStarted { command } => {
                debug!(source, command = %command, "Command started");
            }
            PlatformEvent::CommandCompleted {
                command,
                exit_code,
                duration_ms,
            } => {
                debug!(
                    source,
                    command = %command,
                    exit_code = ?exit_code,
                    duration_ms = duration_ms,
                    "Command completed"
                );
            }
            PlatformEvent::CommandFailed { command, failure } => {
                error!(
                    source,
                    command = %command,
                    message = %failure.message,
                    "Command could not be started"
                );
            }
        },

        AppEvent::General(general_event) => match general_event {
            GeneralEvent::Warning { message } => {
                warn!(source, "{message}");
            }
            GeneralEvent::DebugLog { message } => {
                debug!(source, "{message}");
            }
        },
    }
}
