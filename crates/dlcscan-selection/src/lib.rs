//! Checkable selection model shared between discovery and its consumers.
//!
//! One [`SelectionEntry`] exists per application id. Discovery never writes
//! entries directly; it publishes [`SelectionDelta`]s that a single consumer
//! applies through [`SelectionRegistry::upsert`].

mod entry;
mod launcher;
mod registry;

pub use entry::*;
pub use launcher::*;
pub use registry::*;
