//! Linux platform implementation

pub mod process;

pub use process::LinuxProcessOperations;
