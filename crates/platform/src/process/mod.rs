//! Process execution operations

use async_trait::async_trait;
use pbo_errors::Error;
use pbo_events::ProcessCommandDescriptor;
use std::path::PathBuf;
use std::process::ExitStatus;

use crate::core::PlatformContext;

/// Platform-specific command builder and execution
#[derive(Debug, Clone)]
pub struct PlatformCommand {
    program: String,
    args: Vec<String>,
}

impl PlatformCommand {
    /// Create a new platform command
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    /// Create a command that runs `program` through an escalation helper
    ///
    /// With `escalation = Some("sudo")` this builds `sudo <program> ...`.
    pub fn privileged(program: &str, escalation: Option<&str>) -> Self {
        match escalation {
            Some(helper) => {
                let mut cmd = Self::new(helper);
                cmd.arg(program);
                cmd
            }
            None => Self::new(program),
        }
    }

    /// Add an argument to the command
    pub fn arg<S: AsRef<str>>(&mut self, arg: S) -> &mut Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments to the command
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Get the program name
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Get the arguments
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Describe the command for events and error messages
    pub fn descriptor(&self) -> ProcessCommandDescriptor {
        ProcessCommandDescriptor {
            program: self.program.clone(),
            args: self.args.clone(),
        }
    }
}

/// Output from command execution
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Stdout followed by stderr, lossily decoded
    ///
    /// `java -version` writes to stderr, most tools to stdout.
    pub fn combined_text(&self) -> String {
        let mut text = String::from_utf8_lossy(&self.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&self.stderr));
        text
    }

    /// Last non-empty stderr line, or the exit status
    pub fn failure_summary(&self) -> String {
        String::from_utf8_lossy(&self.stderr)
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map_or_else(|| self.status.to_string(), str::to_string)
    }
}

/// Trait for process execution operations
#[async_trait]
pub trait ProcessOperations: Send + Sync {
    /// Execute a command and return the output
    ///
    /// A non-zero exit status is returned as output, not as an error; only
    /// a failure to spawn the process is an error.
    async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, Error>;

    /// Create a new command builder
    fn create_command(&self, program: &str) -> PlatformCommand {
        PlatformCommand::new(program)
    }

    /// Find the path to an executable
    ///
    /// `extra_dirs` are searched before `PATH`.
    async fn which(&self, program: &str, extra_dirs: &[PathBuf]) -> Result<PathBuf, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privileged_command() {
        let mut cmd = PlatformCommand::privileged("apt-get", Some("sudo"));
        cmd.args(["install", "-y", "unzip"]);
        assert_eq!(cmd.program(), "sudo");
        assert_eq!(cmd.get_args(), ["apt-get", "install", "-y", "unzip"]);

        let cmd = PlatformCommand::privileged("apk", None);
        assert_eq!(cmd.program(), "apk");
        assert!(cmd.get_args().is_empty());
    }

    #[test]
    fn test_descriptor_display() {
        let mut cmd = PlatformCommand::new("zypper");
        cmd.args(["--non-interactive", "refresh"]);
        assert_eq!(cmd.descriptor().to_string(), "zypper --non-interactive refresh");
    }
}
