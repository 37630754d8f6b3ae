use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Descriptor for an external command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessCommandDescriptor {
    pub program: String,
    pub args: Vec<String>,
}

impl std::fmt::Display for ProcessCommandDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// External process execution events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlatformEvent {
    CommandStarted {
        command: ProcessCommandDescriptor,
    },

    CommandCompleted {
        command: ProcessCommandDescriptor,
        exit_code: Option<i32>,
        duration_ms: u64,
    },

    /// The process could not be spawned
    CommandFailed {
        command: ProcessCommandDescriptor,
        failure: FailureContext,
    },
}
