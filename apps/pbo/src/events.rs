//! Event handling and progress display

use crate::logging::log_event_with_tracing;
use console::{Style, Term};
use pbo_events::{
    AppEvent, DownloadEvent, FailureContext, GeneralEvent, InstallEvent, PlatformEvent,
    ResolverEvent,
};
use std::collections::HashMap;

/// Progress is reported in steps of this many percent
const PROGRESS_STEP: u64 = 25;

/// Event handler for progress display and user feedback
pub struct EventHandler {
    term: Term,
    colors_enabled: bool,
    debug_enabled: bool,
    /// Suppress all console output (JSON mode)
    quiet: bool,
    /// Last reported progress bucket by URL
    download_progress: HashMap<String, u64>,
}

impl EventHandler {
    /// Create new event handler
    pub fn new(colors_enabled: bool, debug_enabled: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors_enabled,
            debug_enabled,
            quiet,
            download_progress: HashMap::new(),
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        log_event_with_tracing(&event);
        if self.quiet {
            return;
        }

        match event {
            AppEvent::Resolver(event) => self.handle_resolver_event(event),
            AppEvent::Download(event) => self.handle_download_event(event),
            AppEvent::Install(event) => self.handle_install_event(event),
            AppEvent::General(event) => self.handle_general_event(event),
            AppEvent::Platform(PlatformEvent::CommandStarted { command }) => {
                if self.debug_enabled {
                    self.show_detail(&format!("$ {command}"));
                }
            }
            AppEvent::Platform(_) => {}
        }
    }

    fn handle_resolver_event(&mut self, event: ResolverEvent) {
        match event {
            ResolverEvent::Resolving { capability, family } => {
                self.show_status(&format!("Resolving {capability} ({family})"));
            }
            ResolverEvent::AlreadySatisfied { capability, path } => {
                self.show_detail(&format!("{capability} found at {}", path.display()));
            }
            ResolverEvent::PlanReady { capability, steps } => {
                let noun = if steps.len() == 1 { "step" } else { "steps" };
                self.show_detail(&format!("{capability}: {} {noun} planned", steps.len()));
            }
            ResolverEvent::StepStarted { description, .. } => {
                self.show_status(&format!("  -> {description}"));
            }
            ResolverEvent::StepFailed { kind, failure, .. } => {
                self.show_warning(&format!("  {kind} failed: {}", failure.message));
            }
            ResolverEvent::ProbeUnsatisfied { capability, reason } => {
                self.show_warning(&format!("  {capability} still unavailable: {reason}"));
            }
            ResolverEvent::Satisfied {
                capability, path, ..
            } => {
                self.show_success(&format!("{capability} available at {}", path.display()));
            }
            ResolverEvent::Failed {
                capability,
                failure,
            } => {
                self.show_failure(&format!("Could not provide {capability}"), &failure);
            }
        }
    }

    fn handle_download_event(&mut self, event: DownloadEvent) {
        match event {
            DownloadEvent::Started { url, total_size } => {
                let filename = url.rsplit('/').next().unwrap_or(&url);
                match total_size {
                    Some(size) => {
                        self.show_status(&format!("Downloading {filename} ({})", format_size(size)));
                    }
                    None => self.show_status(&format!("Downloading {filename}")),
                }
                self.download_progress.insert(url, 0);
            }
            DownloadEvent::Progress {
                url,
                downloaded,
                total: Some(total),
            } if total > 0 => {
                let bucket = (downloaded.saturating_mul(100) / total) / PROGRESS_STEP;
                let last = self.download_progress.entry(url).or_insert(0);
                if bucket > *last && bucket * PROGRESS_STEP < 100 {
                    *last = bucket;
                    self.show_detail(&format!("  {}%", bucket * PROGRESS_STEP));
                }
            }
            DownloadEvent::Progress { .. } => {}
            DownloadEvent::Completed {
                url,
                final_size,
                duration_ms,
            } => {
                self.download_progress.remove(&url);
                self.show_detail(&format!(
                    "  Downloaded {} in {duration_ms}ms",
                    format_size(final_size)
                ));
            }
            DownloadEvent::Failed { url, failure } => {
                self.download_progress.remove(&url);
                self.show_failure(&format!("Download of {url} failed"), &failure);
            }
        }
    }

    fn handle_install_event(&mut self, event: InstallEvent) {
        match event {
            InstallEvent::Started { install_dir } => {
                self.show_status(&format!("Installing game into {}", install_dir.display()));
            }
            InstallEvent::Extracted { entries } => {
                self.show_detail(&format!("  Extracted {entries} files"));
            }
            InstallEvent::WindowsFilesStripped { count } => {
                if count > 0 {
                    self.show_detail(&format!("  Removed {count} Windows executables"));
                }
            }
            InstallEvent::LauncherWritten { path } | InstallEvent::DesktopEntryWritten { path } => {
                self.show_detail(&format!("  Wrote {}", path.display()));
            }
            InstallEvent::CacheRefreshSkipped { tool, reason } => {
                self.show_warning(&format!("  Skipped {tool}: {reason}"));
            }
            InstallEvent::Completed { install_dir } => {
                self.show_success(&format!("Installed into {}", install_dir.display()));
            }
            InstallEvent::Failed { failure } => {
                self.show_failure("Installation failed", &failure);
            }
            InstallEvent::Removed { path } => {
                self.show_detail(&format!("  Removed {}", path.display()));
            }
            InstallEvent::UninstallCompleted { removed } => {
                if removed == 0 {
                    self.show_status("Nothing to remove");
                } else {
                    self.show_success(&format!("Removed {removed} paths"));
                }
            }
        }
    }

    fn handle_general_event(&mut self, event: GeneralEvent) {
        match event {
            GeneralEvent::Warning { message } => self.show_warning(&message),
            GeneralEvent::DebugLog { message } => {
                if self.debug_enabled {
                    self.show_detail(&message);
                }
            }
        }
    }

    fn style(&self, style: Style, message: &str) -> String {
        if self.colors_enabled {
            style.apply_to(message).to_string()
        } else {
            message.to_string()
        }
    }

    fn write(&self, line: &str) {
        // stderr may be closed; nothing sensible to do about it
        let _ = self.term.write_line(line);
    }

    fn show_status(&self, message: &str) {
        self.write(message);
    }

    fn show_detail(&self, message: &str) {
        self.write(&self.style(Style::new().dim(), message));
    }

    fn show_success(&self, message: &str) {
        self.write(&self.style(Style::new().green().bold(), message));
    }

    fn show_warning(&self, message: &str) {
        self.write(&self.style(Style::new().yellow(), message));
    }

    fn show_error(&self, message: &str) {
        self.write(&self.style(Style::new().red().bold(), message));
    }

    fn show_failure(&self, headline: &str, failure: &FailureContext) {
        self.show_error(&format!("{headline}: {}", failure.message));
        if let Some(hint) = &failure.hint {
            self.show_detail(&format!("  Hint: {hint}"));
        }
    }
}

/// Human readable byte count
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes;
    let mut unit = 0;
    while size >= 1024 && unit < UNITS.len() - 1 {
        size /= 1024;
        unit += 1;
    }
    format!("{size} {}", UNITS[unit])
}
