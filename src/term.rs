//! Terminal mode save/restore for the controlling terminal.

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::tty::IsTty;

use crate::error::Error;

/// Scoped raw-mode handle for the real terminal.
///
/// Acquiring the guard verifies that stdin is a terminal; entering raw mode
/// is a separate step, so a spawn failure between the two never leaves the
/// terminal raw. `restore` is idempotent, and `Drop` calls it as a backstop,
/// so the saved attributes come back on every exit path including panics.
pub struct TerminalGuard {
    raw: bool,
    restored: bool,
}

impl TerminalGuard {
    /// Verify the wrapper is attached to a real terminal.
    pub fn acquire() -> Result<Self, Error> {
        if !std::io::stdin().is_tty() {
            return Err(Error::TerminalAccess);
        }
        Ok(Self {
            raw: false,
            restored: false,
        })
    }

    /// Switch the terminal to raw mode so every byte, including control
    /// characters like Ctrl-C, reaches the forwarding loop unmodified.
    pub fn enter_raw(&mut self) -> Result<(), Error> {
        enable_raw_mode()?;
        self.raw = true;
        Ok(())
    }

    /// Reapply the saved attributes. Returns whether this call performed
    /// the restore; false when raw mode was never entered or restore
    /// already ran.
    pub fn restore(&mut self) -> bool {
        if self.raw && !self.restored {
            let _ = disable_raw_mode();
            self.restored = true;
            return true;
        }
        false
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        self.restore();
    }
}
