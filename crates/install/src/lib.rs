#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Game installation for pbo
//!
//! Downloads the game archive, strips the Windows executables, writes a
//! launcher and a desktop entry, and moves the whole tree into place in one
//! rename. Uninstall removes the same paths.

#[macro_use]
mod macros;
mod context;
mod desktop;
mod installer;
mod result;
mod tree;

pub use context::{InstallContext, InstallLayout, UninstallContext};
pub use desktop::FALLBACK_ICON;
pub use installer::{uninstall_targets, Installer};
pub use result::{InstallReport, UninstallReport};
pub use tree::WINDOWS_EXTENSIONS;

// Re-export EventSender for use by macros and contexts
pub use pbo_events::EventSender;
