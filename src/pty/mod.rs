//! Pseudo-terminal session plumbing.
//!
//! - `spawn`: pty pair allocation and child attachment
//! - `forward`: the duplex byte relay between the real terminal and the master
//! - `supervisor`: child wait/terminate and exit-code extraction

mod forward;
mod spawn;
mod supervisor;

pub use forward::IoForwarder;
pub(crate) use forward::spawn_pump;
pub use spawn::PtySession;
pub use supervisor::{terminate, wait_child};
