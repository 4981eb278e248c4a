//! Core types shared by rooms, modes and the session layer.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a connected user.
///
/// Assigned by the session layer; the room core only uses it as a key.
/// Serialized as the bare integer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// A unique identifier for a room (one match instance).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

/// Identifier of a map in the static level data. Inside a room each map id
/// gets at most one place.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MapId(pub u32);

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M-{}", self.0)
    }
}

/// Identifier of a world event (door, chest, switch...) inside a room.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Facing
// ---------------------------------------------------------------------------

/// The direction a user looks at, as a unit step.
///
/// The vertical axis is inverted relative to the grid: facing `UP` is
/// `(0, 1)` and the cell ahead of `(x, y)` is `(x, y - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Facing {
    pub x: i32,
    pub y: i32,
}

impl Facing {
    pub const UP: Self = Self { x: 0, y: 1 };
    pub const DOWN: Self = Self { x: 0, y: -1 };
    pub const LEFT: Self = Self { x: -1, y: 0 };
    pub const RIGHT: Self = Self { x: 1, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell one step ahead of `(x, y)` along this facing.
    pub const fn ahead(self, x: i32, y: i32) -> (i32, i32) {
        (x + self.x, y - self.y)
    }
}

impl Default for Facing {
    fn default() -> Self {
        Self::DOWN
    }
}

// ---------------------------------------------------------------------------
// Teams and appearance
// ---------------------------------------------------------------------------

/// The two sides of a team-based mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Red,
    Blue,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => write!(f, "Red"),
            Self::Blue => write!(f, "Blue"),
        }
    }
}

/// Which graphic set the client should draw for a user. The concrete
/// sprite per character is chosen client-side.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum Appearance {
    #[default]
    Neutral,
    Blue,
    Red,
}

impl From<Team> for Appearance {
    fn from(team: Team) -> Self {
        match team {
            Team::Red => Self::Red,
            Team::Blue => Self::Blue,
        }
    }
}

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

/// Everything a client needs to spawn or refresh a user on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameObject {
    pub id: UserId,
    pub name: String,
    pub map: MapId,
    pub x: i32,
    pub y: i32,
    pub facing: Facing,
    pub appearance: Appearance,
    /// Whether the viewer receiving this object should render it concealed.
    pub hidden: bool,
}

/// A notification from a room to one of its occupants.
///
/// `#[serde(tag = "type")]` gives `{ "type": "PlaySound", "name": "Eat" }`
/// on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notice {
    /// Centered announcement text.
    Notice { text: String },
    /// Side-panel information text (warnings, hints).
    Inform { text: String },
    PlaySound { name: String },
    CreateGameObject { object: GameObject },
    RemoveGameObject { id: UserId },
    MoveGameObject { id: UserId, x: i32, y: i32, facing: Facing },
    SetAppearance { id: UserId, appearance: Appearance },
    UpdateRoomUserCount { count: usize },
    MatchResult { winner: Team },
}

impl Notice {
    pub fn notice(text: impl Into<String>) -> Self {
        Self::Notice { text: text.into() }
    }

    pub fn inform(text: impl Into<String>) -> Self {
        Self::Inform { text: text.into() }
    }

    pub fn sound(name: impl Into<String>) -> Self {
        Self::PlaySound { name: name.into() }
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who should receive a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every user in the room.
    All,
    /// One user.
    User(UserId),
    /// Every user in the room except one.
    AllExcept(UserId),
    /// Every user located on one map.
    Place(MapId),
    /// Every user on one map except one.
    PlaceExcept(MapId, UserId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_ahead_horizontal() {
        assert_eq!(Facing::RIGHT.ahead(4, 4), (5, 4));
        assert_eq!(Facing::LEFT.ahead(4, 4), (3, 4));
    }

    #[test]
    fn test_facing_ahead_vertical_is_inverted() {
        assert_eq!(Facing::UP.ahead(4, 4), (4, 3));
        assert_eq!(Facing::DOWN.ahead(4, 4), (4, 5));
    }

    #[test]
    fn test_identity_display() {
        assert_eq!(UserId(3).to_string(), "U-3");
        assert_eq!(RoomId(9).to_string(), "R-9");
        assert_eq!(MapId(29).to_string(), "M-29");
        assert_eq!(EventId(1).to_string(), "E-1");
    }

    #[test]
    fn test_appearance_from_team() {
        assert_eq!(Appearance::from(Team::Red), Appearance::Red);
        assert_eq!(Appearance::from(Team::Blue), Appearance::Blue);
        assert_eq!(Appearance::default(), Appearance::Neutral);
    }
}
