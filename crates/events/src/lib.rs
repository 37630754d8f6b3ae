#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in pbo
//!
//! Library crates never print. They report progress, warnings and failures
//! as domain events over an unbounded channel; the CLI renders them and
//! mirrors them into `tracing`.

pub mod meta;
pub use meta::EventSource;

pub mod events;
pub use events::{
    AppEvent, DownloadEvent, FailureContext, GeneralEvent, InstallEvent, PlatformEvent,
    ProcessCommandDescriptor, ResolverEvent,
};

use tokio::sync::mpsc::UnboundedSender;

/// Type alias for event sender using the `AppEvent` system
pub type EventSender = UnboundedSender<AppEvent>;

/// Type alias for event receiver using the `AppEvent` system
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<AppEvent>;

/// Create a new event channel with the `AppEvent` system
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout pbo
///
/// This trait provides a single, consistent API for emitting events regardless of
/// whether you have a raw `EventSender` or a struct that contains one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(event);
        }
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit a download started event
    fn emit_download_started(&self, url: impl Into<String>, total_size: Option<u64>) {
        self.emit(AppEvent::Download(DownloadEvent::Started {
            url: url.into(),
            total_size,
        }));
    }

    /// Emit a download completed event
    fn emit_download_completed(&self, url: impl Into<String>, final_size: u64, duration_ms: u64) {
        self.emit(AppEvent::Download(DownloadEvent::Completed {
            url: url.into(),
            final_size,
            duration_ms,
        }));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
/// This allows `EventSender` to be used directly where `EventEmitter` is expected
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

/// Emitter that discards everything, for callers without a consumer
impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}
