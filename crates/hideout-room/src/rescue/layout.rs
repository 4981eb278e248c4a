//! Base and prison locations for each rescue map.

use hideout_protocol::{MapId, Team};
use serde::{Deserialize, Serialize};

/// The maps a rescue room can be played on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapType {
    Asylum,
    Tatami,
    Gon,
    Laboratory,
    School,
    Mine,
    Island,
    Mansion,
    Desert,
}

impl MapType {
    pub const ALL: [MapType; 9] = [
        MapType::Asylum,
        MapType::Tatami,
        MapType::Gon,
        MapType::Laboratory,
        MapType::School,
        MapType::Mine,
        MapType::Island,
        MapType::Mansion,
        MapType::Desert,
    ];

    pub fn layout(self) -> RescueLayout {
        let (red, blue, prison) = match self {
            MapType::Asylum => ((29, 9, 19), (2, 8, 13), (13, 11, 15)),
            MapType::Tatami => ((54, 10, 5), (42, 9, 7), (57, 21, 6)),
            MapType::Gon => ((75, 20, 26), (60, 16, 11), (74, 14, 12)),
            MapType::Laboratory => ((86, 9, 11), (99, 10, 8), (96, 7, 30)),
            MapType::School => ((115, 13, 9), (149, 14, 8), (122, 6, 12)),
            MapType::Mine => ((172, 6, 8), (154, 9, 8), (169, 13, 6)),
            MapType::Island => ((189, 7, 7), (199, 10, 8), (191, 11, 7)),
            MapType::Mansion => ((226, 10, 9), (238, 17, 8), (217, 25, 7)),
            MapType::Desert => ((244, 9, 11), (249, 7, 17), (255, 20, 17)),
        };
        RescueLayout {
            red_base: Spot::from(red),
            blue_base: Spot::from(blue),
            prison: Spot::from(prison),
        }
    }
}

/// A cell on a specific map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spot {
    pub map: MapId,
    pub x: i32,
    pub y: i32,
}

impl From<(u32, i32, i32)> for Spot {
    fn from((map, x, y): (u32, i32, i32)) -> Self {
        Self { map: MapId(map), x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RescueLayout {
    pub red_base: Spot,
    pub blue_base: Spot,
    pub prison: Spot,
}

impl RescueLayout {
    pub fn base(&self, team: Team) -> Spot {
        match team {
            Team::Red => self.red_base,
            Team::Blue => self.blue_base,
        }
    }
}
