//! Terminal mode controller.
//!
//! Line-discipline snapshots, raw mode session guard, and window size state.

mod mode;
mod raw_mode;
mod size;

pub use mode::*;
pub use raw_mode::*;
pub use size::*;

pub(crate) use size::refresh_from_signal;
