//! shellbot - run interactive commands under a pseudo-terminal.
//!
//! Wraps an arbitrary command so it believes it owns a real controlling
//! terminal: a pty is allocated, the child is attached to its slave side,
//! and bytes are relayed verbatim between the invoking terminal and the
//! master side until the child exits. The wrapper's exit code is the
//! child's. `--no-pty` falls back to plain pipes for non-interactive
//! commands or contexts without a terminal.

mod cli;
mod command;
mod error;
mod pipes;
mod pty;
mod session;
mod signals;
mod term;

use std::process;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::command::Invocation;

fn main() {
    // Logs go to stderr and stay silent unless RUST_LOG is set: stdout
    // belongs to the wrapped command, byte for byte.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = match cli::parse_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let invocation = Invocation::parse(&config.command);
    debug!(?invocation, use_pty = config.use_pty, "parsed command");

    let result = if config.use_pty {
        session::run_session(&invocation, config.poll_interval)
    } else {
        pipes::run_piped(&invocation, config.poll_interval)
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            // The session restores the terminal before returning, so this
            // diagnostic prints onto a sane terminal.
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
