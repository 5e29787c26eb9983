//! Filesystem side of discovery: Steam libraries, app manifests, Steamworks
//! integration directories and the cached app-info metadata.

mod blocklist;
mod cache;
mod components;
mod config;
mod library;
mod manifest;
mod metadata;

pub use blocklist::*;
pub use cache::*;
pub use components::*;
pub use config::*;
pub use library::*;
pub use manifest::*;
pub use metadata::*;
