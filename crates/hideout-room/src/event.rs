//! World events: map-located triggers such as doors, switches or chests.
//!
//! Their concrete behaviour belongs to map scripts outside the core. The
//! room only needs to know where they are, whether they block movement,
//! how to activate them, and how to advance them once per tick.

use hideout_protocol::{EventId, MapId, Notice, Recipient};

use crate::User;

/// A trigger placed on a map inside a room.
pub trait WorldEvent: Send + 'static {
    fn id(&self) -> EventId;

    /// Map and cell the event occupies.
    fn location(&self) -> (MapId, i32, i32);

    /// Whether the event blocks movement onto its cell.
    fn collider(&self) -> bool {
        false
    }

    /// Runs the event for `actor`. Notices pushed to `outbox` are delivered
    /// by the room afterwards. Returns `true` if the event handled the
    /// interaction and no further event should be tried.
    fn activate(&mut self, actor: &User, outbox: &mut Vec<(Recipient, Notice)>) -> bool;

    /// Per-tick maintenance. Default: nothing.
    fn update(&mut self) {}
}
