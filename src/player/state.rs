//! Explicit player state

use serde::{Deserialize, Serialize};

use crate::profile::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    /// Not started, or reset by a repeat
    Idle,
    /// A timed or immediate step is live
    Playing,
    /// Suspended on a tap-gated step
    WaitingForTap,
    /// All phases exhausted; waiting for repeat or finish
    Finished,
    /// The host left the card mid-sequence
    Cancelled,
    /// `finish()` was called; terminal
    Closed,
}

impl std::fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerStatus::Idle => write!(f, "idle"),
            PlayerStatus::Playing => write!(f, "playing"),
            PlayerStatus::WaitingForTap => write!(f, "waiting-for-tap"),
            PlayerStatus::Finished => write!(f, "finished"),
            PlayerStatus::Cancelled => write!(f, "cancelled"),
            PlayerStatus::Closed => write!(f, "closed"),
        }
    }
}

/// `{phase, step_index, epoch}` plus status. Every step entry, restart and
/// cancellation bumps `epoch`; timers from an older epoch are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub status: PlayerStatus,
    pub phase: Phase,
    pub step_index: usize,
    pub epoch: u64,
}

impl PlayerState {
    pub fn new() -> Self {
        Self {
            status: PlayerStatus::Idle,
            phase: Phase::Intro,
            step_index: 0,
            epoch: 0,
        }
    }

    /// Whether a step is live (timers and taps are meaningful)
    pub fn is_active(&self) -> bool {
        matches!(self.status, PlayerStatus::Playing | PlayerStatus::WaitingForTap)
    }

    pub(crate) fn bump_epoch(&mut self) -> u64 {
        self.epoch = self.epoch.wrapping_add(1);
        self.epoch
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new()
    }
}
