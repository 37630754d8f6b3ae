//! Linux process operations implementation
//!
//! Commands run through `tokio::process`, with started/completed/failed
//! events emitted around every invocation.

use async_trait::async_trait;
use pbo_errors::{Error, PlatformError};
use pbo_events::{AppEvent, FailureContext, PlatformEvent, ProcessCommandDescriptor};
use std::convert::TryFrom;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::process::Command;

use crate::core::PlatformContext;
use crate::process::{CommandOutput, PlatformCommand, ProcessOperations};

/// Linux implementation of process operations
pub struct LinuxProcessOperations;

impl LinuxProcessOperations {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LinuxProcessOperations {
    fn default() -> Self {
        Self::new()
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn emit_process_started(ctx: &PlatformContext, descriptor: &ProcessCommandDescriptor) {
    ctx.emit_event(AppEvent::Platform(PlatformEvent::CommandStarted {
        command: descriptor.clone(),
    }));
}

fn emit_process_completed(
    ctx: &PlatformContext,
    descriptor: &ProcessCommandDescriptor,
    output: &CommandOutput,
    duration: Duration,
) {
    ctx.emit_event(AppEvent::Platform(PlatformEvent::CommandCompleted {
        command: descriptor.clone(),
        exit_code: output.status.code(),
        duration_ms: duration_to_millis(duration),
    }));
}

fn emit_process_failed(
    ctx: &PlatformContext,
    descriptor: &ProcessCommandDescriptor,
    error: &PlatformError,
) {
    ctx.emit_event(AppEvent::Platform(PlatformEvent::CommandFailed {
        command: descriptor.clone(),
        failure: FailureContext::from_error(error),
    }));
}

/// `extra_dirs` followed by every `PATH` entry
fn search_path(extra_dirs: &[PathBuf]) -> Option<OsString> {
    let path_var = std::env::var_os("PATH").unwrap_or_default();
    let dirs = extra_dirs
        .iter()
        .cloned()
        .chain(std::env::split_paths(&path_var))
        .collect::<Vec<_>>();
    std::env::join_paths(dirs).ok()
}

#[async_trait]
impl ProcessOperations for LinuxProcessOperations {
    async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, Error> {
        let start = Instant::now();
        let descriptor = cmd.descriptor();

        emit_process_started(ctx, &descriptor);

        let result: Result<CommandOutput, PlatformError> = async {
            let mut command = Command::new(cmd.program());
            command.args(cmd.get_args());

            // Cancellation drops this future; the child must not outlive it
            command.kill_on_drop(true);

            let output =
                command
                    .output()
                    .await
                    .map_err(|e| PlatformError::ProcessExecutionFailed {
                        command: descriptor.to_string(),
                        message: e.to_string(),
                    })?;

            Ok(CommandOutput {
                status: output.status,
                stdout: output.stdout,
                stderr: output.stderr,
            })
        }
        .await;

        match &result {
            Ok(output) => emit_process_completed(ctx, &descriptor, output, start.elapsed()),
            Err(e) => emit_process_failed(ctx, &descriptor, e),
        }

        result.map_err(Error::from)
    }

    async fn which(&self, program: &str, extra_dirs: &[PathBuf]) -> Result<PathBuf, Error> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        which::which_in(program, search_path(extra_dirs), Path::new(&cwd)).map_err(|_| {
            Error::from(PlatformError::CommandNotFound {
                command: program.to_string(),
            })
        })
    }
}
