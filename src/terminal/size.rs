//! Terminal window size, shared with the SIGWINCH handler.
//!
//! The two dimensions live in independent atomics. A reader may observe a new
//! column count paired with an old row count; callers that need a consistent
//! pair should use [`query_dimensions`] instead.

use std::mem::MaybeUninit;
use std::os::fd::{AsRawFd, BorrowedFd, RawFd};
use std::sync::atomic::{AtomicI32, AtomicU16, Ordering};

use crate::error::{Result, TermioError};

static COLS: AtomicU16 = AtomicU16::new(0);
static ROWS: AtomicU16 = AtomicU16::new(0);

/// Descriptor the resize handler queries.
static RESIZE_FD: AtomicI32 = AtomicI32::new(libc::STDOUT_FILENO);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct TerminalDimensions {
    pub cols: u16,
    pub rows: u16,
}

impl TerminalDimensions {
    /// Nothing recorded yet.
    pub const UNKNOWN: Self = Self { cols: 0, rows: 0 };

    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    pub fn is_known(&self) -> bool {
        *self != Self::UNKNOWN
    }
}

impl From<TerminalDimensions> for (u16, u16) {
    fn from(d: TerminalDimensions) -> Self {
        (d.cols, d.rows)
    }
}

// ============================================================================
// Shared state
// ============================================================================

/// Last size recorded by the resize handler or an explicit refresh.
///
/// Returns [`TerminalDimensions::UNKNOWN`] until one of those has run.
pub fn current_dimensions() -> TerminalDimensions {
    TerminalDimensions {
        cols: COLS.load(Ordering::Relaxed),
        rows: ROWS.load(Ordering::Relaxed),
    }
}

fn store(dims: TerminalDimensions) {
    COLS.store(dims.cols, Ordering::Relaxed);
    ROWS.store(dims.rows, Ordering::Relaxed);
}

/// Query the size of stdout now and record it.
///
/// SIGWINCH only reports later changes, so call this once at startup.
pub fn refresh_dimensions_now() -> Result<TerminalDimensions> {
    // SAFETY: borrowed only for the duration of one ioctl.
    refresh_dimensions_of(unsafe { BorrowedFd::borrow_raw(libc::STDOUT_FILENO) })
}

/// Query the size of `fd` and record it. Shared state is untouched on error.
pub fn refresh_dimensions_of(fd: BorrowedFd<'_>) -> Result<TerminalDimensions> {
    let dims = query_dimensions(fd)?;
    store(dims);
    Ok(dims)
}

/// Query the size of `fd` without recording it.
pub fn query_dimensions(fd: BorrowedFd<'_>) -> Result<TerminalDimensions> {
    let ws = winsize(fd.as_raw_fd()).ok_or_else(|| TermioError::unavailable("TIOCGWINSZ"))?;
    Ok(TerminalDimensions::new(ws.ws_col, ws.ws_row))
}

// ============================================================================
// Resize handler support
// ============================================================================

/// Point the resize handler at `fd` (stdout by default).
///
/// The caller keeps `fd` open; if it is closed the handler's query fails and
/// the recorded size simply stops changing.
pub fn set_resize_source(fd: RawFd) {
    RESIZE_FD.store(fd, Ordering::Relaxed);
}

/// Descriptor the resize handler currently queries.
pub fn resize_source() -> RawFd {
    RESIZE_FD.load(Ordering::Relaxed)
}

/// Body of the SIGWINCH handler. Async-signal-safe: one ioctl, two stores.
pub(crate) fn refresh_from_signal() {
    if let Some(ws) = winsize(RESIZE_FD.load(Ordering::Relaxed)) {
        store(TerminalDimensions::new(ws.ws_col, ws.ws_row));
    }
}

#[inline]
fn winsize(fd: RawFd) -> Option<libc::winsize> {
    let mut ws = MaybeUninit::<libc::winsize>::uninit();
    // SAFETY: TIOCGWINSZ writes a full winsize on success.
    let rc = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, ws.as_mut_ptr()) };
    if rc != 0 {
        return None;
    }
    Some(unsafe { ws.assume_init() })
}
