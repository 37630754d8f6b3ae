use serde::{Deserialize, Serialize};

use crate::EventSource;
use pbo_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code, when the error defines one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod download;
pub mod general;
pub mod install;
pub mod platform;
pub mod resolver;

pub use download::*;
pub use general::*;
pub use install::*;
pub use platform::*;
pub use resolver::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// Capability resolution (probe, plan, remediation steps)
    Resolver(ResolverEvent),

    /// HTTP downloads
    Download(DownloadEvent),

    /// Game installation and removal
    Install(InstallEvent),

    /// External process execution
    Platform(PlatformEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Resolver(_) => EventSource::RESOLVER,
            Self::Download(_) => EventSource::DOWNLOAD,
            Self::Install(_) => EventSource::INSTALL,
            Self::Platform(_) => EventSource::PLATFORM,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::Resolver(ResolverEvent::Failed { .. })
            | Self::Download(DownloadEvent::Failed { .. })
            | Self::Install(InstallEvent::Failed { .. })
            | Self::Platform(PlatformEvent::CommandFailed { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Resolver(
                ResolverEvent::StepFailed { .. } | ResolverEvent::ProbeUnsatisfied { .. },
            )
            | Self::Install(InstallEvent::CacheRefreshSkipped { .. }) => Level::WARN,

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Download(DownloadEvent::Progress { .. })
            | Self::Platform(_) => Level::DEBUG,

            _ => Level::INFO,
        }
    }
}
