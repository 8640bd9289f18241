//! Error taxonomy for wrapper sessions.

use thiserror::Error;

/// Failures the wrapper can report to the user.
///
/// Everything here maps to exit code 1; a child that ran at all reports its
/// own exit code through the session instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("standard input is not a terminal (re-run with --no-pty for non-interactive use)")]
    TerminalAccess,

    #[error("failed to allocate pseudo-terminal: {0}")]
    PtyAllocation(String),

    #[error("failed to spawn child process: {0}")]
    Spawn(String),

    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}
