//! Session orchestration: save terminal, spawn, forward, reap, restore.

use std::io;
use std::time::Duration;

use tracing::{debug, info};

use crate::command::Invocation;
use crate::error::Error;
use crate::pty::{self, IoForwarder, PtySession};
use crate::signals;
use crate::term::TerminalGuard;

/// Run one interactive pty session and return the child's exit code.
///
/// The terminal guard is acquired before anything else so that every later
/// exit path, including a panic in the forwarding loop, restores the
/// terminal through the guard's drop. Raw mode is entered only after the
/// child is spawned: a spawn failure never leaves the terminal raw. The
/// guard is restored explicitly before returning, so diagnostics printed by
/// the caller land on a sane terminal.
pub fn run_session(invocation: &Invocation, poll_interval: Duration) -> Result<i32, Error> {
    let mut guard = TerminalGuard::acquire()?;

    let PtySession {
        master: _master,
        mut child,
        reader,
        writer,
    } = PtySession::spawn(invocation)?;

    guard.enter_raw()?;

    let forwarder = IoForwarder::new(poll_interval);
    // A SIGINT/SIGTERM aimed at the wrapper ends the loop cooperatively so
    // teardown still restores the terminal and reaps the child.
    signals::route_termination_to(forwarder.cancel_flag());
    let mut stdout = io::stdout();
    forwarder.run(Box::new(io::stdin()), &mut stdout, reader, writer);
    debug!("forwarding loop ended");

    // The loop ending usually means the child already exited; terminate
    // covers the error paths where it has not.
    pty::terminate(&mut child);
    let code = pty::wait_child(&mut child);

    guard.restore();
    info!(code, "session finished");
    Ok(code)
    // master drops here: closed exactly once, after the child is reaped.
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::tty::IsTty;

    #[test]
    fn refuses_to_run_without_terminal() {
        // Only meaningful when the harness detaches stdin from a tty.
        if std::io::stdin().is_tty() {
            return;
        }
        let invocation = Invocation::Argv(vec!["true".into()]);
        assert!(matches!(
            run_session(&invocation, Duration::from_millis(100)),
            Err(Error::TerminalAccess)
        ));
    }
}
