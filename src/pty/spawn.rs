//! Pty allocation and child process attachment.

use std::io::{Read, Write};

use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use tracing::debug;

use crate::command::{default_shell, Invocation};
use crate::error::Error;

/// Dimensions used when the real terminal size cannot be read.
const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// A live pty with the wrapped child attached to its slave side.
///
/// The parent owns only the master side; the slave is dropped right after
/// spawn so that master reads see EOF once the child's terminal session
/// ends. Dropping the session closes the master exactly once.
pub struct PtySession {
    #[allow(dead_code)] // held so the master fd outlives the forwarding loop
    pub master: Box<dyn MasterPty + Send>,
    pub child: Box<dyn Child + Send + Sync>,
    pub reader: Box<dyn Read + Send>,
    pub writer: Box<dyn Write + Send>,
}

impl PtySession {
    /// Allocate a pty sized to the invoking terminal and spawn `invocation`
    /// with the slave side as its controlling terminal.
    ///
    /// After this returns the child may already have exited (for example a
    /// shell one-liner that fails immediately); callers must tolerate
    /// immediate EOF on the reader.
    pub fn spawn(invocation: &Invocation) -> Result<Self, Error> {
        let (cols, rows) = crossterm::terminal::size().unwrap_or(FALLBACK_SIZE);

        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| Error::PtyAllocation(e.to_string()))?;

        let mut cmd = match invocation {
            Invocation::Argv(words) => {
                let mut cmd = CommandBuilder::new(&words[0]);
                cmd.args(&words[1..]);
                cmd
            }
            Invocation::Shell(raw) => {
                let mut cmd = CommandBuilder::new(default_shell());
                cmd.arg("-c");
                cmd.arg(raw);
                cmd
            }
        };

        if let Ok(cwd) = std::env::current_dir() {
            cmd.cwd(&cwd);
        }

        // Advertise color-terminal capability to the child.
        cmd.env("TERM", "xterm-256color");
        cmd.env("COLORTERM", "truecolor");
        cmd.env_remove("NO_COLOR");

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| Error::Spawn(e.to_string()))?;

        // The parent must not keep the slave open, or master reads would
        // never return EOF after the child exits.
        drop(pair.slave);

        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| Error::PtyAllocation(e.to_string()))?;
        let writer = pair
            .master
            .take_writer()
            .map_err(|e| Error::PtyAllocation(e.to_string()))?;

        debug!(pid = ?child.process_id(), cols, rows, "spawned child under pty");

        Ok(Self {
            master: pair.master,
            child,
            reader,
            writer,
        })
    }
}
