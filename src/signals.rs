//! Interrupt handling for the wrapper process itself.
//!
//! In raw mode Ctrl-C reaches the child as byte 0x03 through the pty, so
//! these handlers only matter for signals delivered to the wrapper (kill
//! from another terminal, session teardown). The handler clears the
//! forwarding loop's running flag; the loop observes it within one poll
//! interval and the ordinary teardown path restores the terminal and reaps
//! the child. No message is printed for the signal itself.

use std::os::raw::c_int;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use tracing::debug;

static ROUTED_FLAG: OnceLock<Arc<AtomicBool>> = OnceLock::new();

extern "C" fn termination_handler(_: c_int) {
    // Only an atomic store here: anything more is not async-signal-safe.
    if let Some(flag) = ROUTED_FLAG.get() {
        flag.store(false, Ordering::SeqCst);
    }
}

/// Route SIGINT and SIGTERM to `flag`, the forwarding loop's running flag.
///
/// Effective once per process; a second call keeps the first flag (there is
/// only one session per process lifetime).
pub fn route_termination_to(flag: Arc<AtomicBool>) {
    let _ = ROUTED_FLAG.set(flag);

    let action = SigAction::new(
        SigHandler::Handler(termination_handler),
        SaFlags::empty(),
        SigSet::empty(),
    );
    for sig in [Signal::SIGINT, Signal::SIGTERM] {
        // Safety: the handler performs a single atomic store.
        if let Err(e) = unsafe { sigaction(sig, &action) } {
            debug!("failed to install handler for {sig:?}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::raise;

    // Sole test touching the process-wide handler registration; loop exit
    // on a cleared flag is covered by the forwarder's cancellation test.
    #[test]
    fn termination_signal_clears_routed_flag() {
        let flag = Arc::new(AtomicBool::new(true));
        route_termination_to(Arc::clone(&flag));

        // raise() delivers to the calling thread before returning.
        raise(Signal::SIGTERM).unwrap();
        assert!(!flag.load(Ordering::SeqCst));

        // A repeated signal is tolerated.
        raise(Signal::SIGTERM).unwrap();
        assert!(!flag.load(Ordering::SeqCst));
    }
}
