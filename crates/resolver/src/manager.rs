//! Native package-manager execution
//!
//! Package-manager output is never parsed; only the exit status matters.
//! Whether the install actually helped is decided by the next probe.

use pbo_errors::{Error, ResolveError};
use pbo_platform::{PlatformCommand, PlatformContext, ProcessOperations};
use pbo_types::PackageFamily;
use std::collections::BTreeSet;
use std::sync::Mutex;

/// Runs refresh and install commands with an optional escalation prefix
pub struct PackageManager {
    escalation: Option<String>,
    refresh_index: bool,
    /// Families whose index was refreshed during this run
    refreshed: Mutex<BTreeSet<PackageFamily>>,
}

impl PackageManager {
    pub fn new(escalation: Option<String>, refresh_index: bool) -> Self {
        Self {
            escalation,
            refresh_index,
            refreshed: Mutex::new(BTreeSet::new()),
        }
    }

    fn command(&self, manager: &str, args: &[String]) -> PlatformCommand {
        let mut cmd = PlatformCommand::privileged(manager, self.escalation.as_deref());
        cmd.args(args);
        cmd
    }

    fn needs_refresh(&self, family: PackageFamily) -> bool {
        self.refresh_index
            && family.refresh_args().is_some()
            && self
                .refreshed
                .lock()
                .map(|done| !done.contains(&family))
                .unwrap_or(true)
    }

    fn mark_refreshed(&self, family: PackageFamily) {
        if let Ok(mut done) = self.refreshed.lock() {
            done.insert(family);
        }
    }

    /// Install `package` for `capability`, refreshing the index first when
    /// the family needs it and it has not been refreshed yet
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::PackageManagerInstallFailed` when the refresh
    /// or the install exits non-zero or cannot be started, and
    /// `ResolveError::UnsupportedFamily` for the unknown family.
    pub async fn install(
        &self,
        ops: &dyn ProcessOperations,
        ctx: &PlatformContext,
        capability: &str,
        family: PackageFamily,
        package: &str,
    ) -> Result<(), ResolveError> {
        let failed = |message: String| ResolveError::PackageManagerInstallFailed {
            capability: capability.to_string(),
            family: family.to_string(),
            package: package.to_string(),
            message,
        };

        let Some(manager) = family.manager() else {
            return Err(ResolveError::UnsupportedFamily {
                capability: capability.to_string(),
                family: family.to_string(),
            });
        };

        if self.needs_refresh(family) {
            let args: Vec<String> = family
                .refresh_args()
                .unwrap_or_default()
                .iter()
                .map(|arg| (*arg).to_string())
                .collect();
            let cmd = self.command(manager, &args);
            let description = cmd.descriptor().to_string();
            run(ops, ctx, cmd)
                .await
                .map_err(|message| failed(format!("`{description}` failed: {message}")))?;
            self.mark_refreshed(family);
        }

        let cmd = self.command(manager, &family.install_args(package));
        let description = cmd.descriptor().to_string();
        run(ops, ctx, cmd)
            .await
            .map_err(|message| failed(format!("`{description}` failed: {message}")))
    }
}

async fn run(
    ops: &dyn ProcessOperations,
    ctx: &PlatformContext,
    cmd: PlatformCommand,
) -> Result<(), String> {
    match ops.execute_command(ctx, cmd).await {
        Ok(output) if output.success() => Ok(()),
        Ok(output) => Err(output.failure_summary()),
        Err(e) => Err(error_message(&e)),
    }
}

fn error_message(error: &Error) -> String {
    use pbo_errors::UserFacingError;
    error.user_message().into_owned()
}
