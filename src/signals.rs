//! Signal dispositions: SIGINT no-op and SIGWINCH size refresh.
//!
//! Installed once and left in place for the life of the process.

use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::{Result, TermioError};
use crate::terminal;

static INSTALLED: Mutex<bool> = Mutex::new(false);

static INTERRUPTS: AtomicUsize = AtomicUsize::new(0);
static INTERRUPT_PENDING: AtomicBool = AtomicBool::new(false);

/// SIGINT handler - swallow the signal so the host loop decides what to do.
extern "C" fn handle_sigint(_: libc::c_int) {
    INTERRUPTS.fetch_add(1, Ordering::Relaxed);
    INTERRUPT_PENDING.store(true, Ordering::Relaxed);
}

/// SIGWINCH handler - re-read the window size into the shared atomics.
extern "C" fn handle_sigwinch(_: libc::c_int) {
    let saved = errno::errno();
    terminal::refresh_from_signal();
    errno::set_errno(saved);
}

/// Install the SIGINT and SIGWINCH handlers.
///
/// Only the first successful call does anything; later calls return `Ok(())`.
/// A program that gets an error here should not go on to enter raw mode.
pub fn install_signal_handlers() -> Result<()> {
    let mut installed = INSTALLED.lock().unwrap_or_else(|e| e.into_inner());
    if *installed {
        return Ok(());
    }

    // No SA_RESTART on SIGINT: a blocked read returns EINTR so the caller can
    // check `interrupted()`.
    install(
        libc::SIGINT,
        "SIGINT",
        handle_sigint as *const () as libc::sighandler_t,
        0,
    )?;
    install(
        libc::SIGWINCH,
        "SIGWINCH",
        handle_sigwinch as *const () as libc::sighandler_t,
        libc::SA_RESTART,
    )?;

    *installed = true;
    tracing::debug!("signal handlers installed");
    Ok(())
}

fn install(
    signal: libc::c_int,
    name: &'static str,
    handler: libc::sighandler_t,
    flags: libc::c_int,
) -> Result<()> {
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = handler;
        action.sa_flags = flags;
        libc::sigemptyset(&mut action.sa_mask);
        if libc::sigaction(signal, &action, std::ptr::null_mut()) != 0 {
            return Err(TermioError::SignalRegistrationFailed {
                signal: name,
                source: io::Error::last_os_error(),
            });
        }
    }
    Ok(())
}

/// Returns true if SIGINT arrived since the last call, clearing the flag.
pub fn interrupted() -> bool {
    INTERRUPT_PENDING.swap(false, Ordering::Relaxed)
}

/// Total SIGINTs absorbed since the handlers were installed.
pub fn interrupt_count() -> usize {
    INTERRUPTS.load(Ordering::Relaxed)
}
