//! Child reaping and defensive termination.

use portable_pty::Child;
use tracing::debug;

/// Reported when the child's real status cannot be recovered.
const FALLBACK_EXIT_CODE: i32 = 1;

/// Block until the child exits and translate its status into a process
/// exit code. An unreapable child (already collected) yields the fallback
/// code: no meaningful status can be recovered.
///
/// Callers reach this only after the forwarding loop has observed pty
/// closure or termination was forced, so the wait returns promptly.
pub fn wait_child(child: &mut Box<dyn Child + Send + Sync>) -> i32 {
    match child.wait() {
        Ok(status) => status.exit_code() as i32,
        Err(e) => {
            debug!("wait on child failed: {e}");
            FALLBACK_EXIT_CODE
        }
    }
}

/// Ensure the child is not left running once the forwarding loop has ended.
///
/// The loop ending on pty closure normally means the child already exited;
/// on error paths the child may still be alive and is signalled here.
/// Signalling a child that already exited is tolerated, so interleaved
/// teardown paths may call this more than once.
pub fn terminate(child: &mut Box<dyn Child + Send + Sync>) {
    match child.try_wait() {
        Ok(Some(_)) => {} // already exited
        Ok(None) | Err(_) => {
            if let Err(e) = child.kill() {
                debug!("terminating child failed: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Invocation;
    use crate::pty::PtySession;
    use std::io::Read;
    use std::thread;
    use std::time::{Duration, Instant};

    fn spawn_sh(script: &str) -> PtySession {
        let invocation = Invocation::Argv(vec!["/bin/sh".into(), "-c".into(), script.into()]);
        PtySession::spawn(&invocation).unwrap()
    }

    fn drain(reader: Box<dyn Read + Send>) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            let mut reader = reader;
            let mut buf = [0u8; 4096];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) | Err(_) => return,
                    Ok(_) => {}
                }
            }
        })
    }

    #[test]
    fn wait_translates_exit_code() {
        let PtySession {
            master: _master,
            mut child,
            reader,
            writer: _writer,
        } = spawn_sh("exit 5");
        let drained = drain(reader);
        assert_eq!(wait_child(&mut child), 5);
        let _ = drained.join();
    }

    #[test]
    fn terminate_stops_long_running_child() {
        let PtySession {
            master: _master,
            mut child,
            reader,
            writer: _writer,
        } = spawn_sh("sleep 30");
        let drained = drain(reader);

        let start = Instant::now();
        terminate(&mut child);
        let code = wait_child(&mut child);

        assert!(start.elapsed() < Duration::from_secs(5), "kill did not take effect");
        assert_ne!(code, 0, "killed child must not report success");
        let _ = drained.join();
    }

    #[test]
    fn terminate_after_exit_is_harmless() {
        let PtySession {
            master: _master,
            mut child,
            reader,
            writer: _writer,
        } = spawn_sh("exit 0");
        let drained = drain(reader);

        // Let the child finish before the first terminate.
        let deadline = Instant::now() + Duration::from_secs(5);
        while child.try_wait().unwrap().is_none() {
            assert!(Instant::now() < deadline, "child did not exit");
            thread::sleep(Duration::from_millis(20));
        }

        terminate(&mut child);
        terminate(&mut child);
        assert_eq!(wait_child(&mut child), 0);
        let _ = drained.join();
    }
}
