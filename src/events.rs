//! Backend push events.
//!
//! The backend fires these independently of any outstanding request. The
//! controller drains its inbound channel on each scheduler tick and
//! mutates its own fields; there is no acknowledgement and no
//! cancellation.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

pub const PUSH_CHANNEL_CAPACITY: usize = 64;

/// Periodic aggregate statistics pushed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Statistics {
    pub players: u64,
    pub servers: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PushEvent {
    GameRunning(bool),
    ModRunning(bool),
    Statistics(Statistics),
    /// The backend wants a user decision before continuing an install;
    /// answered through `receive_install_decision`.
    InstallConfirmationRequired,
}

pub fn push_channel() -> (mpsc::Sender<PushEvent>, mpsc::Receiver<PushEvent>) {
    mpsc::channel(PUSH_CHANNEL_CAPACITY)
}
