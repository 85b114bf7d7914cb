//! Signal handling for graceful shutdown (§4.8, §6).
//!
//! `SIGINT`/`SIGTERM` request shutdown; `SIGPIPE` is ignored so a client
//! closing its socket mid-write never kills the process. A signal handler
//! may only call async-signal-safe functions, so the handler itself does
//! nothing but an atomic store; the supervisor's poll loop observes the
//! flag and propagates it into `state::ShutdownFlag`.

use std::sync::atomic::{AtomicBool, Ordering};

static SIGNALED: AtomicBool = AtomicBool::new(false);

extern "C" fn request_shutdown(_signum: libc::c_int) {
    SIGNALED.store(true, Ordering::Release);
}

/// Installs the interrupt/terminate handlers and ignores `SIGPIPE`. Must be
/// called once during supervisor startup, before any socket I/O begins.
pub fn install() {
    // SAFETY: `request_shutdown` only performs an atomic store, which is
    // async-signal-safe; `libc::signal` is called with valid signal
    // numbers and a valid function pointer.
    unsafe {
        libc::signal(libc::SIGINT, request_shutdown as usize);
        libc::signal(libc::SIGTERM, request_shutdown as usize);
        libc::signal(libc::SIGPIPE, libc::SIG_IGN);
    }
}

/// Whether a shutdown-requesting signal has arrived since [`install`] was
/// called.
pub fn was_signaled() -> bool {
    SIGNALED.load(Ordering::Acquire)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raising_sigterm_after_install_sets_the_flag() {
        install();
        // SAFETY: raising a signal this process has just installed a
        // handler for is the documented way to exercise it in-process.
        unsafe {
            libc::raise(libc::SIGTERM);
        }
        assert!(was_signaled());
    }
}
