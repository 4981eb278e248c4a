//! Room state shared between the room and its game mode.
//!
//! [`RoomCore`] holds everything except the mode itself: users, places,
//! events, flags and the map provider. Game modes receive it by mutable
//! reference, which replaces a back-pointer from the mode to its room.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use hideout_protocol::{
    Appearance, EventId, Facing, MapId, Notice, Recipient, RoomId, UserId,
};

use crate::{MapProvider, Place, RoomType, User, WorldEvent};

pub struct RoomCore {
    pub(crate) id: RoomId,
    pub(crate) room_type: RoomType,
    pub(crate) max_users: usize,
    /// Shared with every `RoomHandle`, so callers can observe teardown
    /// without a round trip to the actor.
    pub(crate) running: Arc<AtomicBool>,
    pub(crate) locked: bool,
    pub(crate) places: HashMap<MapId, Place>,
    pub(crate) users: HashMap<UserId, User>,
    pub(crate) event_places: HashMap<EventId, MapId>,
    pub(crate) maps: Arc<dyn MapProvider>,
    /// Users whose view must be redrawn once the current operation ends.
    pub(crate) redraws: Vec<UserId>,
}

impl RoomCore {
    pub fn new(
        id: RoomId,
        room_type: RoomType,
        max_users: usize,
        maps: Arc<dyn MapProvider>,
    ) -> Self {
        Self {
            id,
            room_type,
            max_users,
            running: Arc::new(AtomicBool::new(true)),
            locked: false,
            places: HashMap::new(),
            users: HashMap::new(),
            event_places: HashMap::new(),
            maps,
            redraws: Vec::new(),
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn room_type(&self) -> RoomType {
        self.room_type
    }

    pub fn max_users(&self) -> usize {
        self.max_users
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Closes the room to matchmaking. There is no unlock.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Requests teardown. The room clears its collections when the current
    /// operation finishes and its loop exits on the next cycle.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
    }

    /// Occupancy below capacity and not locked.
    pub fn check_joinable(&self) -> bool {
        self.users.len() < self.max_users && !self.locked
    }

    pub fn maps(&self) -> &dyn MapProvider {
        self.maps.as_ref()
    }

    // -----------------------------------------------------------------------
    // Users and places
    // -----------------------------------------------------------------------

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn user_mut(&mut self, id: UserId) -> Option<&mut User> {
        self.users.get_mut(&id)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> + '_ {
        self.users.values()
    }

    /// All user ids, sorted.
    pub fn user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.users.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn place(&self, map: MapId) -> Option<&Place> {
        self.places.get(&map)
    }

    /// The place for `map`, created on first access.
    pub fn place_mut(&mut self, map: MapId) -> &mut Place {
        self.places.entry(map).or_insert_with(|| Place::new(map))
    }

    /// Ids of the users on `map`, sorted.
    pub fn users_in(&self, map: MapId) -> Vec<UserId> {
        self.places
            .get(&map)
            .map(|p| p.users().collect())
            .unwrap_or_default()
    }

    pub(crate) fn insert_user(&mut self, user: User) {
        let (id, map) = (user.id, user.map);
        self.users.insert(id, user);
        self.place_mut(map).add_user(id);
    }

    pub(crate) fn remove_user(&mut self, id: UserId) -> Option<User> {
        let user = self.users.remove(&id)?;
        self.place_mut(user.map).remove_user(id);
        Some(user)
    }

    /// Every user sits in exactly one place, and that place is keyed by
    /// the user's recorded map. Every id in a place belongs to a user.
    pub fn membership_consistent(&self) -> bool {
        let users_placed = self.users.values().all(|user| {
            let holders: Vec<MapId> = self
                .places
                .iter()
                .filter(|(_, place)| place.contains_user(user.id))
                .map(|(map, _)| *map)
                .collect();
            holders == [user.map]
        });
        let places_known = self
            .places
            .values()
            .all(|place| place.users().all(|id| self.users.contains_key(&id)));
        users_placed && places_known
    }

    // -----------------------------------------------------------------------
    // World events
    // -----------------------------------------------------------------------

    pub fn add_event(&mut self, event: Box<dyn WorldEvent>) {
        let (map, _, _) = event.location();
        self.event_places.insert(event.id(), map);
        self.place_mut(map).add_event(event);
    }

    pub fn remove_event(&mut self, id: EventId) -> Option<Box<dyn WorldEvent>> {
        let map = self.event_places.remove(&id)?;
        self.place_mut(map).remove_event(id)
    }

    /// Can something stand on `(x, y)`? With `collider` set, colliding
    /// events on that cell block it as well.
    pub fn passable(&self, map: MapId, x: i32, y: i32, facing: Facing, collider: bool) -> bool {
        if collider {
            let blocked = self.places.get(&map).is_some_and(|place| {
                place.events().any(|e| {
                    let (_, ex, ey) = e.location();
                    e.collider() && ex == x && ey == y
                })
            });
            if blocked {
                return false;
            }
        }
        self.maps.passable(map, x, y, facing)
    }

    // -----------------------------------------------------------------------
    // Movement
    // -----------------------------------------------------------------------

    /// Moves a user to another cell, possibly on another map, and queues a
    /// redraw of their view. Unknown users are ignored.
    pub fn teleport(&mut self, id: UserId, map: MapId, x: i32, y: i32, facing: Facing) {
        let Some(user) = self.users.get_mut(&id) else {
            return;
        };
        let from = user.map;
        user.map = map;
        user.x = x;
        user.y = y;
        user.facing = facing;

        self.place_mut(from).remove_user(id);
        self.place_mut(map).add_user(id);
        if from != map {
            self.publish_to_place(from, Notice::RemoveGameObject { id });
        }
        self.redraws.push(id);
    }

    /// [`teleport`](Self::teleport) keeping the user's current facing.
    pub fn relocate(&mut self, id: UserId, map: MapId, x: i32, y: i32) {
        if let Some(facing) = self.users.get(&id).map(|u| u.facing) {
            self.teleport(id, map, x, y, facing);
        }
    }

    /// Uses the portal under the user, if there is one.
    pub fn portal(&mut self, id: UserId) {
        let Some(user) = self.users.get(&id) else {
            return;
        };
        let source = user.map;
        let Some(portal) = self.maps.portal(source, user.x, user.y).cloned() else {
            return;
        };

        tracing::debug!(
            room_id = %self.id,
            user_id = %id,
            from = %source,
            to = %portal.next_map,
            "portal used"
        );
        self.teleport(
            id,
            portal.next_map,
            portal.next_x,
            portal.next_y,
            portal.next_facing,
        );
        if let Some(sound) = portal.sound {
            self.publish_to_place(source, Notice::sound(sound));
        }
    }

    /// Changes how a user is drawn and tells everyone on their map.
    pub fn set_appearance(&mut self, id: UserId, appearance: Appearance) {
        let Some(user) = self.users.get_mut(&id) else {
            return;
        };
        user.appearance = appearance;
        let map = user.map;
        self.publish_to_place(map, Notice::SetAppearance { id, appearance });
    }

    // -----------------------------------------------------------------------
    // Fan-out
    // -----------------------------------------------------------------------

    /// Delivers a notice. Fire-and-forget: no ordering between recipients
    /// and no acknowledgement.
    pub fn dispatch(&self, recipient: Recipient, notice: Notice) {
        match recipient {
            Recipient::All => {
                for user in self.users.values() {
                    user.send(notice.clone());
                }
            }
            Recipient::User(id) => {
                if let Some(user) = self.users.get(&id) {
                    user.send(notice);
                }
            }
            Recipient::AllExcept(excluded) => {
                for user in self.users.values().filter(|u| u.id != excluded) {
                    user.send(notice.clone());
                }
            }
            Recipient::Place(map) => self.send_on_map(map, None, &notice),
            Recipient::PlaceExcept(map, excluded) => {
                self.send_on_map(map, Some(excluded), &notice)
            }
        }
    }

    fn send_on_map(&self, map: MapId, excluded: Option<UserId>, notice: &Notice) {
        let Some(place) = self.places.get(&map) else {
            return;
        };
        for id in place.users().filter(|id| Some(*id) != excluded) {
            if let Some(user) = self.users.get(&id) {
                user.send(notice.clone());
            }
        }
    }

    pub fn publish(&self, notice: Notice) {
        self.dispatch(Recipient::All, notice);
    }

    pub fn publish_to_place(&self, map: MapId, notice: Notice) {
        self.dispatch(Recipient::Place(map), notice);
    }

    pub fn send_to(&self, id: UserId, notice: Notice) {
        self.dispatch(Recipient::User(id), notice);
    }

    pub fn broadcast_except(&self, id: UserId, notice: Notice) {
        self.dispatch(Recipient::AllExcept(id), notice);
    }

    /// Everyone on `id`'s map except `id`.
    pub fn broadcast_to_place_except(&self, id: UserId, notice: Notice) {
        if let Some(map) = self.users.get(&id).map(|u| u.map) {
            self.dispatch(Recipient::PlaceExcept(map, id), notice);
        }
    }

    // -----------------------------------------------------------------------
    // Loop plumbing
    // -----------------------------------------------------------------------

    pub(crate) fn take_redraws(&mut self) -> Vec<UserId> {
        std::mem::take(&mut self.redraws)
    }

    pub(crate) fn update_places(&mut self) {
        for place in self.places.values_mut() {
            place.update();
        }
    }

    pub(crate) fn clear(&mut self) {
        self.places.clear();
        self.users.clear();
        self.event_places.clear();
        self.redraws.clear();
    }
}
