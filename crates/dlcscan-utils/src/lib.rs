//! Shared utilities for the dlcscan workspace.

pub mod cancel;
pub mod profiling;

pub use cancel::CancelToken;
pub use profiling::SpanTimer;
