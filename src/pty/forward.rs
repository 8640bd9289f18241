//! Duplex byte forwarding between the real terminal and the pty master.
//!
//! Each direction gets a dedicated pump thread, because pty reads block.
//! Both pumps feed a single channel that the control loop drains with a
//! bounded timeout, so the loop stays responsive to pty closure and to
//! cooperative cancellation even when no traffic flows. Bytes are relayed
//! verbatim in both directions; order within a direction is preserved by
//! the per-direction pump and the FIFO channel.

use std::io::{ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, trace};

/// Upper bound on bytes moved per read in either direction.
const CHUNK_SIZE: usize = 8192;

/// One event on the forwarding channel.
enum PumpEvent {
    /// Bytes from the wrapper's stdin, bound for the pty.
    Input(Vec<u8>),
    /// Bytes from the pty master, bound for the wrapper's stdout.
    Output(Vec<u8>),
    /// EOF or fatal read error on stdin.
    InputClosed,
    /// EOF or fatal read error on the pty master: the child's terminal
    /// session has ended.
    OutputClosed,
}

/// Spawn a detached pump thread relaying `reader` chunks onto `tx`.
///
/// Sends `closed` when the reader reaches EOF or fails; interrupted reads
/// are retried. The thread also exits once the receiving side hangs up.
pub(crate) fn spawn_pump<T, F>(name: &str, mut reader: Box<dyn Read + Send>, tx: Sender<T>, data: F, closed: T)
where
    T: Send + 'static,
    F: Fn(Vec<u8>) -> T + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let mut buf = [0u8; CHUNK_SIZE];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.send(data(buf[..n].to_vec())).is_err() {
                            return;
                        }
                    }
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
            let _ = tx.send(closed);
        })
        .expect("failed to spawn pump thread");
}

/// Relays bytes between the real terminal and the pty master until the pty
/// closes, a sink write fails, or the session is cancelled.
pub struct IoForwarder {
    running: Arc<AtomicBool>,
    poll_interval: Duration,
}

impl IoForwarder {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            poll_interval,
        }
    }

    /// Shared cancellation flag. Storing `false` ends `run` within one poll
    /// interval.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Run the duplex relay.
    ///
    /// `input` and `output` are the wrapper's side of the session (stdin and
    /// stdout in production); `pty_reader` and `pty_writer` are the master
    /// side. Returns when the pty signals EOF, the cancellation flag clears,
    /// or a write to either sink fails. Read/write errors never escape: they
    /// end the loop and teardown continues.
    pub fn run(
        &self,
        input: Box<dyn Read + Send>,
        output: &mut dyn Write,
        pty_reader: Box<dyn Read + Send>,
        mut pty_writer: Box<dyn Write + Send>,
    ) {
        let (tx, rx) = mpsc::channel();
        spawn_pump("stdin-pump", input, tx.clone(), PumpEvent::Input, PumpEvent::InputClosed);
        spawn_pump("pty-pump", pty_reader, tx, PumpEvent::Output, PumpEvent::OutputClosed);

        while self.running.load(Ordering::SeqCst) {
            match rx.recv_timeout(self.poll_interval) {
                Ok(PumpEvent::Output(data)) => {
                    // Interactive children need low latency: flush per chunk.
                    if output.write_all(&data).and_then(|()| output.flush()).is_err() {
                        debug!("stdout write failed, ending forwarding loop");
                        break;
                    }
                }
                Ok(PumpEvent::Input(data)) => {
                    if pty_writer.write_all(&data).and_then(|()| pty_writer.flush()).is_err() {
                        debug!("pty write failed, ending forwarding loop");
                        break;
                    }
                }
                Ok(PumpEvent::OutputClosed) => {
                    debug!("pty closed, child terminal session ended");
                    break;
                }
                Ok(PumpEvent::InputClosed) => {
                    // Keep relaying child output after our stdin ends.
                    trace!("stdin closed");
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.running.store(false, Ordering::SeqCst);
    }
}
