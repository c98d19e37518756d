//! Line-discipline snapshots: capture, raw mode, restore.

use std::fmt;
use std::mem::MaybeUninit;
use std::os::fd::{AsRawFd, BorrowedFd};

use crate::error::{Result, TermioError};

/// Snapshot of a terminal's termios settings at one point in time.
///
/// Opaque beyond the echo/canonical flags this crate manipulates. Only
/// meaningful as an argument to [`restore_mode`] or [`apply_raw_mode`].
#[derive(Clone)]
pub struct TerminalMode {
    termios: libc::termios,
}

impl TerminalMode {
    /// Local echo is on.
    pub fn echo(&self) -> bool {
        self.termios.c_lflag & libc::ECHO != 0
    }

    /// Line-buffered (canonical) input is on.
    pub fn canonical(&self) -> bool {
        self.termios.c_lflag & libc::ICANON != 0
    }

    /// Ctrl-C and friends generate signals.
    pub fn signals_enabled(&self) -> bool {
        self.termios.c_lflag & libc::ISIG != 0
    }

    /// Copy of `self` with canonical input and local echo switched off.
    /// Everything else, ISIG included, is left alone.
    pub fn to_raw(&self) -> TerminalMode {
        let mut termios = self.termios;
        termios.c_lflag &= !(libc::ICANON | libc::ECHO);
        TerminalMode { termios }
    }

    pub(crate) fn from_termios(termios: libc::termios) -> Self {
        Self { termios }
    }
}

impl PartialEq for TerminalMode {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (&self.termios, &other.termios);
        a.c_iflag == b.c_iflag
            && a.c_oflag == b.c_oflag
            && a.c_cflag == b.c_cflag
            && a.c_lflag == b.c_lflag
            && a.c_cc == b.c_cc
    }
}

impl Eq for TerminalMode {}

impl fmt::Debug for TerminalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalMode")
            .field("echo", &self.echo())
            .field("canonical", &self.canonical())
            .field("isig", &self.signals_enabled())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Controlling terminal (stdin)
// ============================================================================

fn stdin_fd() -> BorrowedFd<'static> {
    // SAFETY: fd 0 is reserved for stdin for the life of the process; if it
    // was closed the termios calls simply fail with EBADF.
    unsafe { BorrowedFd::borrow_raw(libc::STDIN_FILENO) }
}

/// Capture the controlling terminal's current mode (stdin).
pub fn capture_current_mode() -> Result<TerminalMode> {
    capture_mode(stdin_fd())
}

/// Switch the controlling terminal into raw mode derived from `base`.
pub fn apply_raw_mode(base: &TerminalMode) -> Result<TerminalMode> {
    apply_raw_mode_to(stdin_fd(), base)
}

/// Put the controlling terminal back into `saved`.
pub fn restore_mode(saved: &TerminalMode) -> Result<()> {
    restore_mode_to(stdin_fd(), saved)
}

// ============================================================================
// Arbitrary terminal fd
// ============================================================================

/// Read the termios settings of `fd`.
pub fn capture_mode(fd: BorrowedFd<'_>) -> Result<TerminalMode> {
    let mut termios = MaybeUninit::<libc::termios>::uninit();
    // SAFETY: tcgetattr fully initializes the struct when it returns 0.
    let rc = unsafe { libc::tcgetattr(fd.as_raw_fd(), termios.as_mut_ptr()) };
    if rc != 0 {
        return Err(TermioError::unavailable("tcgetattr"));
    }
    Ok(TerminalMode::from_termios(unsafe { termios.assume_init() }))
}

/// Install the raw variant of `base` on `fd` with a single `tcsetattr`.
///
/// Returns the configuration actually installed. On error the terminal is
/// left as it was.
pub fn apply_raw_mode_to(fd: BorrowedFd<'_>, base: &TerminalMode) -> Result<TerminalMode> {
    let raw = base.to_raw();
    set_mode(fd, &raw)?;
    Ok(raw)
}

/// Re-apply a previously captured mode to `fd`.
pub fn restore_mode_to(fd: BorrowedFd<'_>, saved: &TerminalMode) -> Result<()> {
    set_mode(fd, saved)
}

fn set_mode(fd: BorrowedFd<'_>, mode: &TerminalMode) -> Result<()> {
    // SAFETY: the termios struct is a valid, fully initialized snapshot.
    let rc = unsafe { libc::tcsetattr(fd.as_raw_fd(), libc::TCSANOW, &mode.termios) };
    if rc != 0 {
        return Err(TermioError::unavailable("tcsetattr"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cooked() -> TerminalMode {
        // SAFETY: termios is plain old data; all-zero is a valid bit pattern.
        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        termios.c_lflag = libc::ICANON | libc::ECHO | libc::ISIG | libc::IEXTEN;
        termios.c_iflag = libc::ICRNL | libc::IXON;
        termios.c_oflag = libc::OPOST | libc::ONLCR;
        termios.c_cc[libc::VMIN] = 1;
        TerminalMode::from_termios(termios)
    }

    #[test]
    fn raw_clears_only_echo_and_canonical() {
        let base = cooked();
        let raw = base.to_raw();

        assert!(!raw.echo());
        assert!(!raw.canonical());
        assert!(raw.signals_enabled());
        assert_eq!(raw.termios.c_lflag, libc::ISIG | libc::IEXTEN);
        assert_eq!(raw.termios.c_iflag, base.termios.c_iflag);
        assert_eq!(raw.termios.c_oflag, base.termios.c_oflag);
        assert_eq!(raw.termios.c_cc, base.termios.c_cc);
    }

    #[test]
    fn raw_leaves_base_untouched() {
        let base = cooked();
        let _ = base.to_raw();
        assert!(base.echo());
        assert!(base.canonical());
    }

    #[test]
    fn equality_tracks_flags() {
        let base = cooked();
        assert_eq!(base, base.clone());
        assert_ne!(base, base.to_raw());
        assert_eq!(base.to_raw(), base.to_raw().to_raw());
    }

    #[test]
    fn debug_shows_flags() {
        let text = format!("{:?}", cooked().to_raw());
        assert!(text.contains("echo: false"));
        assert!(text.contains("canonical: false"));
    }
}
