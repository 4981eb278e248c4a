//! Rooms for Hideout.
//!
//! A room is a match instance: a set of users partitioned into places (one
//! per map), a game mode deciding the rules, and a 100 ms update loop. Each
//! room runs as an isolated Tokio task (actor model); the registry creates
//! rooms and matches users to them.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates rooms, finds joinable ones, tracks who is where
//! - [`RoomHandle`]: sends commands to a running room actor
//! - [`Room`] and [`RoomCore`]: the synchronous room and the state its mode sees
//! - [`GameMode`]: the trait game modes implement; [`RescueMode`] is the stock one
//! - [`MapProvider`]: read-only static map data
//! - [`WorldEvent`]: map-located triggers

mod actor;
mod config;
mod error;
mod event;
mod interaction;
mod map;
mod mode;
mod place;
mod registry;
mod room;
mod room_core;
mod user;

pub mod rescue;

pub use actor::RoomHandle;
pub use config::RoomConfig;
pub use error::RoomError;
pub use event::WorldEvent;
pub use map::{GameMap, MapProvider, Portal, StaticMaps};
pub use mode::{GameMode, ModeFactory, Modes, RoomType};
pub use place::Place;
pub use registry::RoomRegistry;
pub use rescue::{MapType, RescueConfig, RescueMode};
pub use room::{Room, RoomInfo};
pub use room_core::RoomCore;
pub use user::{User, UserSender};
