//! Error kinds for terminal control.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TermioError {
    /// The terminal query or mode-set syscall failed (not a tty, permission
    /// denied, device gone).
    #[error("terminal unavailable: {op} failed: {source}")]
    TerminalUnavailable {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// Installing a signal disposition failed.
    #[error("failed to register {signal} handler: {source}")]
    SignalRegistrationFailed {
        signal: &'static str,
        #[source]
        source: io::Error,
    },

    /// A raw-mode session is already pending restoration.
    #[error("a raw mode session is already active")]
    RawModeActive,
}

impl TermioError {
    /// Build a `TerminalUnavailable` from the current `errno`.
    pub(crate) fn unavailable(op: &'static str) -> Self {
        Self::TerminalUnavailable {
            op,
            source: io::Error::last_os_error(),
        }
    }

    /// True for the query/mode-set failure kind.
    pub fn is_terminal_unavailable(&self) -> bool {
        matches!(self, Self::TerminalUnavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, TermioError>;
