//! stdin and stdout pointed at a regular file, as with `prog < file > log`.
//! Swaps process-wide descriptors, so everything runs in one test.

mod common;

use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

use common::Pty;
use termio::{
    RawModeGuard, SessionOptions, TerminalDimensions, apply_raw_mode, capture_current_mode,
    capture_mode, current_dimensions, refresh_dimensions_now, refresh_dimensions_of,
    restore_mode,
};

/// Puts `file` over fds 0 and 1 until dropped.
struct Redirect {
    stdin: OwnedFd,
    stdout: OwnedFd,
}

impl Redirect {
    fn to(file: &std::fs::File) -> Self {
        let (stdin, stdout) = unsafe {
            let stdin = libc::dup(libc::STDIN_FILENO);
            let stdout = libc::dup(libc::STDOUT_FILENO);
            assert!(stdin >= 0 && stdout >= 0);
            (OwnedFd::from_raw_fd(stdin), OwnedFd::from_raw_fd(stdout))
        };
        unsafe {
            assert!(libc::dup2(file.as_raw_fd(), libc::STDIN_FILENO) >= 0);
            assert!(libc::dup2(file.as_raw_fd(), libc::STDOUT_FILENO) >= 0);
        }
        Redirect { stdin, stdout }
    }
}

impl Drop for Redirect {
    fn drop(&mut self) {
        unsafe {
            libc::dup2(self.stdin.as_raw_fd(), libc::STDIN_FILENO);
            libc::dup2(self.stdout.as_raw_fd(), libc::STDOUT_FILENO);
        }
    }
}

#[test]
fn non_terminal_stdio() {
    let pty = Pty::open(80, 24);
    let base = capture_mode(pty.tty()).unwrap();
    refresh_dimensions_of(pty.tty()).unwrap();
    let known = TerminalDimensions::new(80, 24);

    let file = tempfile::tempfile().unwrap();
    let (capture, apply, restore, refresh, guard) = {
        let _redirect = Redirect::to(&file);
        (
            capture_current_mode().map(|_| ()),
            apply_raw_mode(&base).map(|_| ()),
            restore_mode(&base),
            refresh_dimensions_now().map(|_| ()),
            RawModeGuard::enter_with(&SessionOptions {
                install_signal_handlers: false,
                refresh_dimensions: true,
            })
            .map(|_| ()),
        )
    };

    assert!(capture.unwrap_err().is_terminal_unavailable());
    assert!(apply.unwrap_err().is_terminal_unavailable());
    assert!(restore.unwrap_err().is_terminal_unavailable());
    assert!(refresh.unwrap_err().is_terminal_unavailable());
    assert!(guard.unwrap_err().is_terminal_unavailable());

    // no wrong size was recorded
    assert_eq!(current_dimensions(), known);
    // the pty we took the base mode from is untouched
    assert_eq!(capture_mode(pty.tty()).unwrap(), base);
}
