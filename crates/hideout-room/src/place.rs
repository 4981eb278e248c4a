//! A place: the users and events on one map inside a room.
//!
//! Places are the unit of mutual visibility and interaction. The room
//! creates them lazily the first time a map id is touched and keeps them
//! until the room itself goes away.

use std::collections::{BTreeMap, BTreeSet};

use hideout_protocol::{EventId, MapId, UserId};

use crate::WorldEvent;

pub struct Place {
    map: MapId,
    users: BTreeSet<UserId>,
    events: BTreeMap<EventId, Box<dyn WorldEvent>>,
}

impl Place {
    pub fn new(map: MapId) -> Self {
        Self {
            map,
            users: BTreeSet::new(),
            events: BTreeMap::new(),
        }
    }

    pub fn map(&self) -> MapId {
        self.map
    }

    pub fn add_user(&mut self, user: UserId) {
        self.users.insert(user);
    }

    pub fn remove_user(&mut self, user: UserId) -> bool {
        self.users.remove(&user)
    }

    pub fn contains_user(&self, user: UserId) -> bool {
        self.users.contains(&user)
    }

    /// Users on this map, ordered by id.
    pub fn users(&self) -> impl Iterator<Item = UserId> + '_ {
        self.users.iter().copied()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn add_event(&mut self, event: Box<dyn WorldEvent>) {
        self.events.insert(event.id(), event);
    }

    pub fn remove_event(&mut self, id: EventId) -> Option<Box<dyn WorldEvent>> {
        self.events.remove(&id)
    }

    /// Events on this map, ordered by id.
    pub fn events(&self) -> impl Iterator<Item = &dyn WorldEvent> + '_ {
        self.events.values().map(|e| e.as_ref())
    }

    pub(crate) fn events_mut(
        &mut self,
    ) -> impl Iterator<Item = &mut Box<dyn WorldEvent>> + '_ {
        self.events.values_mut()
    }

    /// Per-tick maintenance local to this map.
    pub fn update(&mut self) {
        for event in self.events.values_mut() {
            event.update();
        }
    }
}

impl std::fmt::Debug for Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Place")
            .field("map", &self.map)
            .field("users", &self.users)
            .field("events", &self.events.keys().collect::<Vec<_>>())
            .finish()
    }
}
