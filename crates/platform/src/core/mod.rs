//! Core platform abstractions and context management

use pbo_events::{AppEvent, EventEmitter, EventSender};
use std::sync::Arc;

use crate::implementations::linux::LinuxProcessOperations;
use crate::process::{CommandOutput, PlatformCommand, ProcessOperations};

/// Context for platform operations, providing event emission
#[derive(Clone, Default)]
pub struct PlatformContext {
    event_sender: Option<EventSender>,
}

impl PlatformContext {
    /// Create a new platform context with event emission capabilities
    pub fn new(event_sender: Option<EventSender>) -> Self {
        Self { event_sender }
    }

    /// Emit a platform event if event sender is available
    pub fn emit_event(&self, event: AppEvent) {
        self.emit(event);
    }
}

impl EventEmitter for PlatformContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

/// Main platform abstraction providing access to all platform operations
#[derive(Clone)]
pub struct Platform {
    process_ops: Arc<dyn ProcessOperations>,
}

impl Platform {
    /// Create a new platform instance with the specified implementation
    pub fn new(process_ops: Arc<dyn ProcessOperations>) -> Self {
        Self { process_ops }
    }

    /// Get the current platform (Linux)
    pub fn current() -> Self {
        Self::new(Arc::new(LinuxProcessOperations::new()))
    }

    /// Access process operations
    pub fn process(&self) -> &dyn ProcessOperations {
        &*self.process_ops
    }

    /// Convenience method: Execute a command and get output
    pub async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, pbo_errors::Error> {
        self.process().execute_command(ctx, cmd).await
    }

    /// Convenience method: Create a new command builder
    pub fn command(&self, program: &str) -> PlatformCommand {
        self.process().create_command(program)
    }

    /// Convenience method: Locate an executable
    pub async fn which(
        &self,
        program: &str,
        extra_dirs: &[std::path::PathBuf],
    ) -> Result<std::path::PathBuf, pbo_errors::Error> {
        self.process().which(program, extra_dirs).await
    }
}
