//! Concurrent discovery of Steam applications and their DLC.
//!
//! [`Discovery`] locates libraries, reads manifests, fans out one worker per
//! application and one nested worker per DLC, and feeds the results into a
//! [`SelectionRegistry`](dlcscan_selection::SelectionRegistry).

mod discovery;
mod options;
mod progress;

pub use discovery::*;
pub use options::*;
pub use progress::*;

pub use dlcscan_selection as selection;
pub use dlcscan_steam as steam;
pub use dlcscan_utils::CancelToken;
