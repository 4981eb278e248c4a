//! Error types for the room layer.
//!
//! Game rules never fail loudly: a hit on a teammate or a walk into a wall
//! is a silent no-op. These errors only cover membership bookkeeping and
//! talking to a room actor that is gone.

use hideout_protocol::{RoomId, UserId};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist (never created, or already torn down).
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The user is already in this room.
    #[error("user {0} already in room {1}")]
    AlreadyInRoom(UserId, RoomId),

    /// The user is not in this room.
    #[error("user {0} not in room {1}")]
    NotInRoom(UserId, RoomId),

    /// The user is not in any room known to the registry.
    #[error("user {0} is not in any room")]
    NoRoom(UserId),

    /// The room's command channel is closed: its loop has exited.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
