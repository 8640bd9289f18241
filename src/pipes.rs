//! No-pty fallback: plain piped execution with the same polling strategy.
//!
//! Spawns the command attached to ordinary pipes, relays its stdout and
//! stderr verbatim to the wrapper's streams, and returns its exit code.
//! No terminal line discipline is touched, so this mode works without a
//! controlling terminal, at the cost of the child seeing pipes instead of
//! a tty.

use std::io::{self, Write};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use tracing::debug;

use crate::command::{default_shell, Invocation};
use crate::error::Error;
use crate::pty::spawn_pump;

enum StreamEvent {
    Stdout(Vec<u8>),
    Stderr(Vec<u8>),
    StdoutClosed,
    StderrClosed,
}

/// Run `invocation` attached to pipes and return its exit code.
pub fn run_piped(invocation: &Invocation, poll_interval: Duration) -> Result<i32, Error> {
    let mut child = spawn_piped(invocation)?;
    relay_streams(
        &mut child,
        &mut io::stdout(),
        &mut io::stderr(),
        poll_interval,
    )
}

fn spawn_piped(invocation: &Invocation) -> Result<Child, Error> {
    let mut cmd = match invocation {
        Invocation::Argv(words) => {
            let mut cmd = Command::new(&words[0]);
            cmd.args(&words[1..]);
            cmd
        }
        Invocation::Shell(raw) => {
            let mut cmd = Command::new(default_shell());
            cmd.arg("-c").arg(raw);
            cmd
        }
    };

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::Spawn(e.to_string()))
}

/// Pump the child's stdout/stderr into `out`/`err` until both streams close,
/// then reap the child. A sink write failure forces termination so no
/// orphan is left behind.
fn relay_streams(
    child: &mut Child,
    out: &mut dyn Write,
    err: &mut dyn Write,
    poll_interval: Duration,
) -> Result<i32, Error> {
    let child_stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::Spawn("child stdout pipe missing".into()))?;
    let child_stderr = child
        .stderr
        .take()
        .ok_or_else(|| Error::Spawn("child stderr pipe missing".into()))?;

    let (tx, rx) = mpsc::channel();
    spawn_pump(
        "stdout-pump",
        Box::new(child_stdout),
        tx.clone(),
        StreamEvent::Stdout,
        StreamEvent::StdoutClosed,
    );
    spawn_pump(
        "stderr-pump",
        Box::new(child_stderr),
        tx,
        StreamEvent::Stderr,
        StreamEvent::StderrClosed,
    );

    let mut open_streams = 2;
    let mut sink_failed = false;
    while open_streams > 0 {
        match rx.recv_timeout(poll_interval) {
            Ok(StreamEvent::Stdout(data)) => {
                if out.write_all(&data).and_then(|()| out.flush()).is_err() {
                    sink_failed = true;
                    break;
                }
            }
            Ok(StreamEvent::Stderr(data)) => {
                if err.write_all(&data).and_then(|()| err.flush()).is_err() {
                    sink_failed = true;
                    break;
                }
            }
            Ok(StreamEvent::StdoutClosed) | Ok(StreamEvent::StderrClosed) => open_streams -= 1,
            // Bounded wait keeps the loop responsive with no traffic.
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    if sink_failed {
        debug!("output sink failed, terminating child");
        let _ = child.kill();
    }

    let code = match child.wait() {
        Ok(status) => status.code().unwrap_or(1),
        Err(e) => {
            debug!("wait on piped child failed: {e}");
            1
        }
    };
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    const POLL: Duration = Duration::from_millis(20);

    fn sh(script: &str) -> Invocation {
        Invocation::Argv(vec!["/bin/sh".into(), "-c".into(), script.into()])
    }

    fn run_captured(invocation: &Invocation) -> (Vec<u8>, Vec<u8>, i32) {
        let mut child = spawn_piped(invocation).unwrap();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = relay_streams(&mut child, &mut out, &mut err, POLL).unwrap();
        (out, err, code)
    }

    #[test]
    fn collects_same_stdout_as_direct_execution() {
        let script = "printf 'one\\ntwo\\nthree\\n'";
        let (out, _err, code) = run_captured(&sh(script));

        let direct = Command::new("/bin/sh").arg("-c").arg(script).output().unwrap();
        assert_eq!(out, direct.stdout);
        assert_eq!(code, 0);
    }

    #[test]
    fn propagates_exit_code() {
        let (_out, _err, code) = run_captured(&sh("exit 42"));
        assert_eq!(code, 42);
    }

    #[test]
    fn routes_stderr_separately() {
        let (out, err, code) = run_captured(&sh("echo visible; echo hidden >&2"));
        assert_eq!(out, b"visible\n");
        assert_eq!(err, b"hidden\n");
        assert_eq!(code, 0);
    }

    #[test]
    fn binary_output_passes_through_unmodified() {
        let (out, _err, _code) =
            run_captured(&sh("printf '\\000\\001\\377'"));
        assert_eq!(out, vec![0x00, 0x01, 0xFF]);
    }

    #[test]
    fn nonexistent_binary_is_a_spawn_error() {
        let invocation = Invocation::Argv(vec!["/definitely/not/a/real/binary".into()]);
        assert!(matches!(
            spawn_piped(&invocation),
            Err(Error::Spawn(_))
        ));
    }
}
