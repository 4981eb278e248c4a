//! Rescue configuration, phases and per-user state.

use hideout_protocol::Team;
use serde::{Deserialize, Serialize};

/// Timing and tuning for a rescue match.
///
/// Counts are in seconds of the countdown; a second is
/// `ticks_per_second` room updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescueConfig {
    /// Countdown value a new room starts from.
    pub countdown_start: i32,
    /// Upper bound of the announced lobby countdown.
    pub ready_ceiling: i32,
    /// Countdown value at which the match begins.
    pub game_threshold: i32,
    /// Countdown value at which the lobby lead-in sound plays.
    pub lead_in_at: i32,
    pub ticks_per_second: u32,
    /// Per-axis distance to a portal that counts as camping.
    pub camp_radius: i32,
    pub camp_warn_min: u32,
    /// A camping counter above this ejects the user to their base.
    pub camp_warn_max: u32,
    /// One red user per this many blue users, plus one.
    pub red_ratio: usize,
    /// Evaluate win conditions during the match. Off by default: rooms
    /// then only end when they empty.
    pub win_conditions: bool,
}

impl Default for RescueConfig {
    fn default() -> Self {
        Self {
            countdown_start: 230,
            ready_ceiling: 230,
            game_threshold: 200,
            lead_in_at: 210,
            ticks_per_second: 10,
            camp_radius: 2,
            camp_warn_min: 3,
            camp_warn_max: 5,
            red_ratio: 5,
            win_conditions: false,
        }
    }
}

/// Rescue match phase. `Result` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Ready,
    Game,
    Result,
}

/// What the rescue mode tracks for each user in the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescueState {
    pub team: Team,
    /// Phase-local scratch value, reset on join.
    pub hiding: u8,
    pub hp: u32,
    pub spawn: u32,
    /// Consecutive seconds spent near a portal; never negative.
    pub camping: u32,
    pub captured: bool,
    /// Set for everyone present when the match result is declared.
    pub result: bool,
}

impl Default for RescueState {
    fn default() -> Self {
        Self {
            team: Team::Blue,
            hiding: 0,
            hp: 100,
            spawn: 10,
            camping: 0,
            captured: false,
            result: false,
        }
    }
}
