//! The room's record of a connected user.

use hideout_protocol::{Appearance, Facing, GameObject, MapId, Notice, UserId};
use tokio::sync::mpsc;

/// Channel for delivering notices to a user's connection handler.
///
/// Unbounded on purpose: a slow client must never stall the room loop.
pub type UserSender = mpsc::UnboundedSender<Notice>;

/// A user inside a room: identity, position and an outbound channel.
///
/// The session layer owns the connection and keeps the receiving half of
/// the channel. Mode-specific state (team, capture flags...) lives in the
/// game mode, keyed by [`UserId`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub map: MapId,
    pub x: i32,
    pub y: i32,
    pub facing: Facing,
    pub appearance: Appearance,
    sender: UserSender,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>, sender: UserSender) -> Self {
        Self {
            id,
            name: name.into(),
            map: MapId(0),
            x: 0,
            y: 0,
            facing: Facing::default(),
            appearance: Appearance::default(),
            sender,
        }
    }

    /// Places the user before they enter a room.
    pub fn at(mut self, map: MapId, x: i32, y: i32) -> Self {
        self.map = map;
        self.x = x;
        self.y = y;
        self
    }

    pub fn facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    /// Queues a notice for this user. Silently dropped if the connection
    /// is gone.
    pub fn send(&self, notice: Notice) {
        let _ = self.sender.send(notice);
    }

    pub fn is_at(&self, x: i32, y: i32) -> bool {
        self.x == x && self.y == y
    }

    /// The cell this user faces.
    pub fn ahead(&self) -> (i32, i32) {
        self.facing.ahead(self.x, self.y)
    }

    /// Snapshot for a viewer; `hidden` is that viewer's concealment flag.
    pub fn game_object(&self, hidden: bool) -> GameObject {
        GameObject {
            id: self.id,
            name: self.name.clone(),
            map: self.map,
            x: self.x,
            y: self.y,
            facing: self.facing,
            appearance: self.appearance,
            hidden,
        }
    }
}
