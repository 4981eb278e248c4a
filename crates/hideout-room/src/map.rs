//! Static map data, as seen by the room core.
//!
//! Level data (passability grids, portal tables) is authored elsewhere. The
//! core only queries it through [`MapProvider`] and never mutates it.
//! [`StaticMaps`] is a small in-memory provider used by tests and the demo.

use std::collections::{HashMap, HashSet};

use hideout_protocol::{Facing, MapId};

/// A map transition: stepping on `(x, y)` moves the user to the
/// destination map and cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Portal {
    pub x: i32,
    pub y: i32,
    pub next_map: MapId,
    pub next_x: i32,
    pub next_y: i32,
    pub next_facing: Facing,
    /// Played to everyone on the source map when the portal is used.
    pub sound: Option<String>,
}

/// Read-only access to static level data.
pub trait MapProvider: Send + Sync + 'static {
    /// Can an actor facing `facing` stand on `(x, y)` of `map`?
    fn passable(&self, map: MapId, x: i32, y: i32, facing: Facing) -> bool;

    /// The portal whose source cell is `(x, y)` on `map`, if any.
    fn portal(&self, map: MapId, x: i32, y: i32) -> Option<&Portal>;

    /// Whether any portal of `map` lies within `range` cells of `(x, y)`.
    fn near_portal(&self, map: MapId, x: i32, y: i32, range: i32) -> bool;
}

/// One rectangular map with blocked cells and portals.
#[derive(Debug, Clone)]
pub struct GameMap {
    pub id: MapId,
    pub width: i32,
    pub height: i32,
    blocked: HashSet<(i32, i32)>,
    portals: Vec<Portal>,
}

impl GameMap {
    pub fn new(id: MapId, width: i32, height: i32) -> Self {
        Self {
            id,
            width,
            height,
            blocked: HashSet::new(),
            portals: Vec::new(),
        }
    }

    pub fn with_wall(mut self, x: i32, y: i32) -> Self {
        self.blocked.insert((x, y));
        self
    }

    pub fn with_portal(mut self, portal: Portal) -> Self {
        self.portals.push(portal);
        self
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        (0..self.width).contains(&x) && (0..self.height).contains(&y)
    }

    /// Range is measured per axis (a square around the cell).
    fn near_portal(&self, x: i32, y: i32, range: i32) -> bool {
        self.portals
            .iter()
            .any(|p| (p.x - x).abs() <= range && (p.y - y).abs() <= range)
    }
}

/// An in-memory [`MapProvider`]. Unknown maps are impassable and have no
/// portals.
#[derive(Debug, Clone, Default)]
pub struct StaticMaps {
    maps: HashMap<MapId, GameMap>,
}

impl StaticMaps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_map(mut self, map: GameMap) -> Self {
        self.maps.insert(map.id, map);
        self
    }

    pub fn get(&self, id: MapId) -> Option<&GameMap> {
        self.maps.get(&id)
    }
}

impl MapProvider for StaticMaps {
    fn passable(&self, map: MapId, x: i32, y: i32, _facing: Facing) -> bool {
        self.maps
            .get(&map)
            .is_some_and(|m| m.in_bounds(x, y) && !m.blocked.contains(&(x, y)))
    }

    fn portal(&self, map: MapId, x: i32, y: i32) -> Option<&Portal> {
        self.maps
            .get(&map)?
            .portals
            .iter()
            .find(|p| p.x == x && p.y == y)
    }

    fn near_portal(&self, map: MapId, x: i32, y: i32, range: i32) -> bool {
        self.maps
            .get(&map)
            .is_some_and(|m| m.near_portal(x, y, range))
    }
}
