//! Raw mode RAII guard.

use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd, RawFd};
use std::sync::atomic::{AtomicBool, Ordering};

use super::{
    TerminalMode, apply_raw_mode_to, capture_mode, refresh_dimensions_of, resize_source,
    restore_mode_to, set_resize_source,
};
use crate::error::{Result, TermioError};
use crate::signals;

/// Set while a guard holds a snapshot pending restoration.
static SESSION_ACTIVE: AtomicBool = AtomicBool::new(false);

/// What [`RawModeGuard`] does on entry besides switching modes.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Install the SIGINT/SIGWINCH handlers before touching the terminal.
    pub install_signal_handlers: bool,
    /// Record the terminal's window size on entry and point the resize
    /// handler at the session's terminal until it is restored.
    pub refresh_dimensions: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            install_signal_handlers: true,
            refresh_dimensions: true,
        }
    }
}

/// Guard that restores the original terminal mode when dropped.
///
/// Holds a duplicate of the terminal descriptor so restoration targets the
/// device the snapshot came from. Only one guard may be live at a time.
pub struct RawModeGuard {
    tty: OwnedFd,
    saved: TerminalMode,
    active: TerminalMode,
    /// Resize source in effect before the session took it over.
    previous_source: Option<RawFd>,
    state: Restore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Restore {
    Pending,
    Done,
    /// errno of the failed `tcsetattr`.
    Failed(i32),
}

impl RawModeGuard {
    /// Enter raw mode on stdin with default options.
    pub fn enter() -> Result<Self> {
        Self::enter_with(&SessionOptions::default())
    }

    pub fn enter_with(options: &SessionOptions) -> Result<Self> {
        // SAFETY: borrowed only long enough to dup it.
        let stdin = unsafe { BorrowedFd::borrow_raw(libc::STDIN_FILENO) };
        Self::enter_on(stdin, options)
    }

    /// Enter raw mode on an arbitrary terminal descriptor.
    pub fn enter_on(fd: BorrowedFd<'_>, options: &SessionOptions) -> Result<Self> {
        if options.install_signal_handlers {
            signals::install_signal_handlers()?;
        }

        if SESSION_ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(TermioError::RawModeActive);
        }

        match Self::switch(fd) {
            Ok(mut guard) => {
                if options.refresh_dimensions {
                    guard.previous_source = Some(resize_source());
                    set_resize_source(guard.tty.as_raw_fd());
                    match refresh_dimensions_of(guard.tty.as_fd()) {
                        Ok(dims) => {
                            tracing::debug!(cols = dims.cols, rows = dims.rows, "initial size")
                        }
                        Err(err) => tracing::debug!(%err, "initial size unavailable"),
                    }
                }
                tracing::debug!(mode = ?guard.active, "entered raw mode");
                Ok(guard)
            }
            Err(err) => {
                SESSION_ACTIVE.store(false, Ordering::Release);
                Err(err)
            }
        }
    }

    fn switch(fd: BorrowedFd<'_>) -> Result<Self> {
        let saved = capture_mode(fd)?;
        let tty = fd
            .try_clone_to_owned()
            .map_err(|source| TermioError::TerminalUnavailable { op: "dup", source })?;
        let active = apply_raw_mode_to(tty.as_fd(), &saved)?;
        Ok(Self {
            tty,
            saved,
            active,
            previous_source: None,
            state: Restore::Pending,
        })
    }

    /// Mode captured before raw mode was applied.
    pub fn saved_mode(&self) -> &TerminalMode {
        &self.saved
    }

    /// Mode installed by the guard.
    pub fn active_mode(&self) -> &TerminalMode {
        &self.active
    }

    /// Restore the saved mode now (also happens on drop).
    ///
    /// Only the first call touches the terminal; later calls repeat its
    /// outcome, so a failed restore keeps reporting the same error. The
    /// session slot and the resize source are released either way.
    pub fn restore(&mut self) -> Result<()> {
        match self.state {
            Restore::Done => return Ok(()),
            Restore::Failed(code) => return Err(restore_error(code)),
            Restore::Pending => {}
        }

        let result = restore_mode_to(self.tty.as_fd(), &self.saved);
        self.state = match &result {
            Ok(()) => Restore::Done,
            Err(TermioError::TerminalUnavailable { source, .. }) => {
                Restore::Failed(source.raw_os_error().unwrap_or(libc::EIO))
            }
            Err(_) => Restore::Failed(libc::EIO),
        };
        if let Some(fd) = self.previous_source.take() {
            set_resize_source(fd);
        }
        SESSION_ACTIVE.store(false, Ordering::Release);
        result
    }
}

fn restore_error(code: i32) -> TermioError {
    TermioError::TerminalUnavailable {
        op: "tcsetattr",
        source: io::Error::from_raw_os_error(code),
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.state != Restore::Pending {
            return;
        }
        match self.restore() {
            Ok(()) => tracing::debug!("restored terminal mode"),
            Err(err) => tracing::warn!(%err, "failed to restore terminal mode"),
        }
    }
}

impl std::fmt::Debug for RawModeGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawModeGuard")
            .field("saved", &self.saved)
            .field("state", &self.state)
            .finish()
    }
}
