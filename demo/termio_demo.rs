//! termio demo - minimal host program for the raw mode session.
//!
//! Usage:
//!   ./termio-demo                      # press keys, resize the window, q to quit
//!   RUST_LOG=termio=debug ./termio-demo 2>trace.log
//!
//! Ctrl-C does not kill the process; the loop notices it and exits cleanly.

use std::io::{self, Write};
use std::process::ExitCode;

use termio::{RawModeGuard, TerminalDimensions, current_dimensions, interrupted};
use tracing_subscriber::EnvFilter;

const POLL_MS: libc::c_int = 200;

fn main() -> ExitCode {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("termio=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    // Signal registration failure is fatal here, before any raw interaction.
    let guard = match RawModeGuard::enter() {
        Ok(g) => g,
        Err(err) => {
            tracing::error!(%err, "cannot start raw mode session");
            eprintln!("termio-demo: {err}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = run();
    drop(guard);

    match outcome {
        Ok(reason) => {
            println!("{reason}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("termio-demo: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> io::Result<&'static str> {
    let mut out = io::stdout();
    let mut shown = TerminalDimensions::UNKNOWN;
    write!(out, "press keys (q quits, Ctrl-C interrupts)\r\n")?;

    loop {
        if interrupted() {
            return Ok("interrupted");
        }

        let dims = current_dimensions();
        if dims != shown {
            write!(out, "size {}x{}\r\n", dims.cols, dims.rows)?;
            shown = dims;
        }
        out.flush()?;

        if !stdin_ready()? {
            continue;
        }

        let mut buf = [0u8; 64];
        let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if n == 0 {
            return Ok("end of input");
        }

        for &byte in &buf[..n as usize] {
            if byte == b'q' {
                return Ok("bye");
            }
            write!(out, "key 0x{byte:02x}\r\n")?;
        }
    }
}

/// Wait up to `POLL_MS` for input. EINTR counts as "nothing ready".
fn stdin_ready() -> io::Result<bool> {
    let mut fds = [libc::pollfd {
        fd: libc::STDIN_FILENO,
        events: libc::POLLIN,
        revents: 0,
    }];
    let rc = unsafe { libc::poll(fds.as_mut_ptr(), 1, POLL_MS) };
    if rc < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(false);
        }
        return Err(err);
    }
    Ok(rc > 0 && fds[0].revents & libc::POLLIN != 0)
}
