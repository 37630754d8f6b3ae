#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Platform abstraction layer for Linux hosts
//!
//! This crate provides:
//! - Process execution with event emission and error handling
//! - Executable lookup over `PATH` plus caller-supplied directories
//! - os-release discovery
//! - Rename-based directory replacement and binary links

pub mod core;
pub mod fs;
pub mod implementations;
pub mod os_release;
pub mod process;

pub use core::{Platform, PlatformContext};
pub use implementations::linux::LinuxProcessOperations;
pub use os_release::load_identity;

/// Re-export commonly used types
pub use process::{CommandOutput, PlatformCommand, ProcessOperations};
