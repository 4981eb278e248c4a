//! Room configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration shared by every room a registry creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Maximum occupancy. Matchmaking stops offering a room once it is
    /// reached; `join` itself does not re-check it.
    pub max_users: usize,

    /// Interval of the room's update loop. Mode timers are expressed in
    /// ticks of this interval.
    pub tick_interval: Duration,

    /// Capacity of the room actor's command channel.
    pub channel_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_users: 30,
            tick_interval: Duration::from_millis(100),
            channel_size: 64,
        }
    }
}
