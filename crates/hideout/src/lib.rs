//! # Hideout
//!
//! Server-authoritative room core for real-time capture games.
//!
//! Hideout owns what happens inside a match: rooms and matchmaking, places
//! (one per map inside a room), a 100 ms update loop per room, and the game
//! mode that decides teams, captures and results. Transport, static map
//! authoring and persistence live outside and talk to the core through
//! [`hideout_room::RoomRegistry`], [`hideout_room::MapProvider`] and the
//! per-user notice channels.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use hideout::prelude::*;
//!
//! # async fn run() -> Result<(), HideoutError> {
//! let maps = StaticMaps::new().with_map(GameMap::new(MapId(2), 30, 30));
//! let registry = RoomRegistry::new(RoomConfig::default(), Arc::new(maps), Modes::default());
//!
//! let (tx, mut notices) = tokio::sync::mpsc::unbounded_channel();
//! let user = User::new(UserId(1), "alice", tx);
//! let room = registry.join(user, RoomType::Rescue(MapType::Asylum)).await?;
//! room.walk(UserId(1), Facing::LEFT).await?;
//!
//! while let Some(notice) = notices.recv().await {
//!     let bytes = JsonCodec.encode(&notice)?;
//!     // hand `bytes` to the connection
//! #   drop(bytes);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
pub mod telemetry;

pub use error::HideoutError;

pub use hideout_protocol as protocol;
pub use hideout_room as room;
pub use hideout_tick as tick;

/// Everything a server embedding Hideout usually needs.
pub mod prelude {
    pub use crate::HideoutError;
    pub use hideout_protocol::{
        Appearance, Codec, EventId, Facing, GameObject, JsonCodec, MapId, Notice, ProtocolError,
        Recipient, RoomId, Team, UserId,
    };
    pub use hideout_room::rescue::{Phase, RescueState};
    pub use hideout_room::{
        GameMap, GameMode, MapProvider, MapType, ModeFactory, Modes, Place, Portal, RescueConfig,
        RescueMode, Room, RoomConfig, RoomCore, RoomError, RoomHandle, RoomInfo, RoomRegistry,
        RoomType, StaticMaps, User, UserSender, WorldEvent,
    };
    pub use hideout_tick::{TickConfig, TickScheduler};
}
