#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Capability resolution for pbo
//!
//! Makes a command available on the host: probe it, and when it is missing
//! or too old, install it through the native package manager or, for Java,
//! a portable runtime download. Every step is followed by a fresh probe and
//! the first success ends resolution.

mod archive;
pub mod catalog;
mod fallback;
mod manager;
mod plan;
mod probe;
mod resolver;

pub use catalog::Catalog;
pub use plan::plan_for;
pub use probe::ProbeOutcome;
pub use resolver::{ResolvePreview, Resolver, ResolverSettings};

pub use pbo_types::{classify_family, parse_major_version};
