//! Room registry: creates rooms, matches users to them, tracks membership.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hideout_protocol::{RoomId, UserId};
use tokio::sync::Mutex;

use crate::actor::spawn_room;
use crate::{MapProvider, ModeFactory, RoomConfig, RoomError, RoomHandle, RoomType, User};

/// Counter for generating unique room IDs.
static NEXT_ROOM_ID: AtomicU64 = AtomicU64::new(1);

/// The registry's shared bookkeeping. Room actors reach it through a weak
/// link to report joinability and teardown.
#[derive(Default)]
pub(crate) struct Registry {
    rooms: HashMap<RoomId, RoomHandle>,
    /// Open rooms per type, lowest id first.
    joinable: HashMap<RoomType, BTreeSet<RoomId>>,
    /// A user is in at most one room at a time.
    user_rooms: HashMap<UserId, RoomId>,
}

impl Registry {
    pub(crate) fn set_joinable(&mut self, room_id: RoomId, room_type: RoomType, joinable: bool) {
        if !self.rooms.contains_key(&room_id) {
            return;
        }
        let open = self.joinable.entry(room_type).or_default();
        if joinable {
            open.insert(room_id);
        } else {
            open.remove(&room_id);
        }
    }

    pub(crate) fn deregister(&mut self, room_id: RoomId) -> Option<RoomHandle> {
        let handle = self.rooms.remove(&room_id)?;
        if let Some(open) = self.joinable.get_mut(&handle.room_type()) {
            open.remove(&room_id);
        }
        self.user_rooms.retain(|_, rid| *rid != room_id);
        tracing::info!(%room_id, "room deregistered");
        Some(handle)
    }
}

/// Entry point for room operations from the session layer.
///
/// Cheap to clone; clones share the same rooms.
#[derive(Clone)]
pub struct RoomRegistry {
    state: Arc<Mutex<Registry>>,
    config: RoomConfig,
    maps: Arc<dyn MapProvider>,
    modes: Arc<dyn ModeFactory>,
}

impl RoomRegistry {
    pub fn new(config: RoomConfig, maps: Arc<dyn MapProvider>, modes: impl ModeFactory) -> Self {
        Self {
            state: Arc::new(Mutex::new(Registry::default())),
            config,
            maps,
            modes: Arc::new(modes),
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Creates a room of `room_type`. Always succeeds.
    pub async fn create(&self, room_type: RoomType) -> RoomHandle {
        let mut state = self.state.lock().await;
        self.spawn(&mut state, room_type)
    }

    fn spawn(&self, state: &mut Registry, room_type: RoomType) -> RoomHandle {
        let room_id = RoomId(NEXT_ROOM_ID.fetch_add(1, Ordering::Relaxed));
        let mode = self.modes.build(room_type);
        let handle = spawn_room(
            room_id,
            room_type,
            &self.config,
            Arc::clone(&self.maps),
            mode,
            Arc::downgrade(&self.state),
        );
        state.rooms.insert(room_id, handle.clone());
        state.joinable.entry(room_type).or_default().insert(room_id);
        tracing::info!(%room_id, %room_type, "room created");
        handle
    }

    /// The open room of `room_type` with the lowest id, or a new one.
    pub async fn find_joinable(&self, room_type: RoomType) -> RoomHandle {
        let mut state = self.state.lock().await;
        let open = state
            .joinable
            .get(&room_type)
            .and_then(|ids| ids.first())
            .and_then(|id| state.rooms.get(id))
            .cloned();
        match open {
            Some(handle) => handle,
            None => self.spawn(&mut state, room_type),
        }
    }

    /// Matchmaking: puts `user` into a joinable room of `room_type`.
    pub async fn join(&self, user: User, room_type: RoomType) -> Result<RoomHandle, RoomError> {
        let user_id = user.id;
        if let Some(current) = self.room_of(user_id).await {
            return Err(RoomError::AlreadyInRoom(user_id, current));
        }

        // A room can stop between lookup and join; drop it and look again.
        loop {
            let handle = self.find_joinable(room_type).await;
            match handle.join(user.clone()).await {
                Err(RoomError::Unavailable(room_id)) => {
                    self.state.lock().await.deregister(room_id);
                }
                result => {
                    result?;
                    let room_id = handle.room_id();
                    let mut state = self.state.lock().await;
                    // A room that ended during the join has already deregistered.
                    if state.rooms.contains_key(&room_id) {
                        state.user_rooms.insert(user_id, room_id);
                    }
                    return Ok(handle);
                }
            }
        }
    }

    /// Removes a user from whatever room they are in.
    pub async fn leave(&self, user_id: UserId) -> Result<(), RoomError> {
        let handle = {
            let mut state = self.state.lock().await;
            let room_id = state
                .user_rooms
                .get(&user_id)
                .copied()
                .ok_or(RoomError::NoRoom(user_id))?;
            match state.rooms.get(&room_id).cloned() {
                Some(handle) => handle,
                None => {
                    state.user_rooms.remove(&user_id);
                    return Err(RoomError::NotFound(room_id));
                }
            }
        };

        let result = handle.leave(user_id).await;
        self.state.lock().await.user_rooms.remove(&user_id);
        result
    }

    pub async fn get(&self, room_id: RoomId) -> Option<RoomHandle> {
        self.state.lock().await.rooms.get(&room_id).cloned()
    }

    pub async fn room_of(&self, user_id: UserId) -> Option<RoomId> {
        self.state.lock().await.user_rooms.get(&user_id).copied()
    }

    pub async fn room_count(&self) -> usize {
        self.state.lock().await.rooms.len()
    }

    /// All registered room ids, sorted.
    pub async fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self.state.lock().await.rooms.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Deregisters a room and asks it to stop.
    pub async fn destroy(&self, room_id: RoomId) -> Result<(), RoomError> {
        let handle = self
            .state
            .lock()
            .await
            .deregister(room_id)
            .ok_or(RoomError::NotFound(room_id))?;
        let _ = handle.shutdown().await;
        Ok(())
    }
}
