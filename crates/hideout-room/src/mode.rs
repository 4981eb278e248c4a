//! The `GameMode` trait: the rules plugged into a room.
//!
//! A room owns exactly one mode. The room handles membership, movement and
//! fan-out; the mode decides what joining, leaving, hitting and the passage
//! of time mean. Every hook receives the room's [`RoomCore`] by reference
//! so the mode can move users, change appearances, send notices and stop
//! the room.

use std::any::Any;
use std::fmt;

use hideout_protocol::UserId;
use serde::{Deserialize, Serialize};

use crate::RoomCore;
use crate::rescue::{MapType, RescueConfig, RescueMode};

/// Game rules for one room.
///
/// Hooks run on the room's task, one at a time, so implementations keep
/// plain owned state. Per-user state belongs in the mode, keyed by
/// [`UserId`].
pub trait GameMode: Send + 'static {
    /// Called after the user has been added to the room and its place.
    fn join(&mut self, room: &mut RoomCore, user: UserId);

    /// Called before the user is removed, while they are still present.
    fn leave(&mut self, room: &mut RoomCore, user: UserId);

    /// Sends `user` the world events visible from where they stand.
    fn draw_events(&self, _room: &RoomCore, _user: UserId) {}

    /// Exchanges presence between `user` and the others on their map.
    fn draw_users(&self, room: &RoomCore, user: UserId);

    /// Resolves `attacker` hitting `target`.
    ///
    /// Returns `true` when the interaction is handled and the resolver
    /// should look no further.
    fn hit(&mut self, room: &mut RoomCore, attacker: UserId, target: UserId) -> bool;

    /// Item usage. Default: ignored.
    fn use_item(&mut self, _room: &mut RoomCore, _user: UserId) {}

    /// Called once per room tick, after every place has been updated.
    fn update(&mut self, room: &mut RoomCore);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// What kind of room to create, and with it which mode to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    Rescue(MapType),
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rescue(map) => write!(f, "rescue/{map:?}"),
        }
    }
}

/// Builds the mode for a freshly created room.
pub trait ModeFactory: Send + Sync + 'static {
    fn build(&self, room_type: RoomType) -> Box<dyn GameMode>;
}

impl<F> ModeFactory for F
where
    F: Fn(RoomType) -> Box<dyn GameMode> + Send + Sync + 'static,
{
    fn build(&self, room_type: RoomType) -> Box<dyn GameMode> {
        self(room_type)
    }
}

/// The stock factory: one arm per [`RoomType`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Modes {
    pub rescue: RescueConfig,
}

impl ModeFactory for Modes {
    fn build(&self, room_type: RoomType) -> Box<dyn GameMode> {
        match room_type {
            RoomType::Rescue(map) => Box::new(RescueMode::new(map, self.rescue.clone())),
        }
    }
}
