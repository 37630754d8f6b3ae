use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;

/// Capability resolution events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolverEvent {
    /// Probe failed up front; remediation is about to be planned
    Resolving { capability: String, family: String },

    /// Probe succeeded before any step ran
    AlreadySatisfied { capability: String, path: PathBuf },

    /// Remediation plan computed
    PlanReady { capability: String, steps: Vec<String> },

    /// A remediation step is about to run
    StepStarted {
        capability: String,
        kind: String,
        description: String,
    },

    /// A remediation step reported failure
    StepFailed {
        capability: String,
        kind: String,
        failure: FailureContext,
    },

    /// The step ran but the probe still fails
    ProbeUnsatisfied { capability: String, reason: String },

    /// The capability is available after remediation
    Satisfied {
        capability: String,
        path: PathBuf,
        steps_run: usize,
    },

    /// Every step was exhausted
    Failed {
        capability: String,
        failure: FailureContext,
    },
}
