//! Raw-mode terminal control for Unix.
//!
//! Capture and restore the terminal's line discipline, switch it into raw
//! input mode, keep SIGINT from killing the process, and track the window
//! size as SIGWINCH reports changes.
//!
//! ```no_run
//! use termio::RawModeGuard;
//!
//! fn main() -> termio::Result<()> {
//!     let _guard = RawModeGuard::enter()?;
//!     let size = termio::current_dimensions();
//!     print!("{}x{}\r\n", size.cols, size.rows);
//!     Ok(())
//! } // original mode restored here
//! ```

#![cfg(unix)]

mod error;
mod signals;
mod terminal;

pub use error::{Result, TermioError};
pub use signals::{install_signal_handlers, interrupt_count, interrupted};
pub use terminal::*;
