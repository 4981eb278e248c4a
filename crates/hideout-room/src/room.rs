//! A room: its state plus the game mode that governs it.
//!
//! `Room` is plain synchronous code. The actor in `actor.rs` owns one and
//! serializes every command and tick onto it, so nothing here needs locks.

use std::sync::Arc;

use hideout_protocol::{Facing, MapId, Notice, RoomId, UserId};

use crate::{GameMode, MapProvider, RoomConfig, RoomCore, RoomError, RoomType, User};

/// A snapshot of room metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub room_type: RoomType,
    pub user_count: usize,
    pub max_users: usize,
    pub locked: bool,
    pub running: bool,
}

pub struct Room {
    core: RoomCore,
    mode: Box<dyn GameMode>,
    torn_down: bool,
}

impl Room {
    pub fn new(
        id: RoomId,
        room_type: RoomType,
        config: &RoomConfig,
        maps: Arc<dyn MapProvider>,
        mode: Box<dyn GameMode>,
    ) -> Self {
        Self {
            core: RoomCore::new(id, room_type, config.max_users, maps),
            mode,
            torn_down: false,
        }
    }

    pub fn id(&self) -> RoomId {
        self.core.id
    }

    pub fn core(&self) -> &RoomCore {
        &self.core
    }

    pub fn mode(&self) -> &dyn GameMode {
        self.mode.as_ref()
    }

    /// The mode, downcast to its concrete type.
    pub fn mode_as<M: GameMode>(&self) -> Option<&M> {
        self.mode.as_any().downcast_ref::<M>()
    }

    pub fn mode_as_mut<M: GameMode>(&mut self) -> Option<&mut M> {
        self.mode.as_any_mut().downcast_mut::<M>()
    }

    /// Both halves at once, for driving the mode by hand.
    pub fn split_mut(&mut self) -> (&mut RoomCore, &mut dyn GameMode) {
        (&mut self.core, self.mode.as_mut())
    }

    pub fn is_running(&self) -> bool {
        self.core.is_running()
    }

    pub fn check_joinable(&self) -> bool {
        self.core.check_joinable()
    }

    pub fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.core.id,
            room_type: self.core.room_type,
            user_count: self.core.user_count(),
            max_users: self.core.max_users,
            locked: self.core.locked,
            running: self.core.is_running(),
        }
    }

    /// Adds a user. Capacity is not re-checked here; matchmaking owns that.
    pub fn join(&mut self, user: User) -> Result<(), RoomError> {
        let id = user.id;
        if self.core.users.contains_key(&id) {
            return Err(RoomError::AlreadyInRoom(id, self.core.id));
        }

        self.core.insert_user(user);
        self.mode.join(&mut self.core, id);
        self.publish_count();
        tracing::info!(
            room_id = %self.core.id,
            user_id = %id,
            users = self.core.user_count(),
            "user joined"
        );

        self.settle();
        Ok(())
    }

    /// Removes a user and tears the room down once it is empty.
    pub fn leave(&mut self, id: UserId) -> Result<User, RoomError> {
        if !self.core.users.contains_key(&id) {
            return Err(RoomError::NotInRoom(id, self.core.id));
        }

        self.mode.leave(&mut self.core, id);
        let user = self
            .core
            .remove_user(id)
            .ok_or(RoomError::NotInRoom(id, self.core.id))?;
        self.core
            .publish_to_place(user.map, Notice::RemoveGameObject { id });
        self.publish_count();
        tracing::info!(
            room_id = %self.core.id,
            user_id = %id,
            users = self.core.user_count(),
            "user left"
        );

        if self.core.users.is_empty() {
            self.core.stop();
        }
        self.settle();
        Ok(user)
    }

    pub fn teleport(&mut self, id: UserId, map: MapId, x: i32, y: i32, facing: Facing) {
        self.core.teleport(id, map, x, y, facing);
        self.settle();
    }

    pub fn portal(&mut self, id: UserId) {
        self.core.portal(id);
        self.settle();
    }

    /// Turns the user, steps forward if the cell ahead is free, and uses a
    /// portal if they landed on one.
    pub fn walk(&mut self, id: UserId, facing: Facing) {
        let Some(user) = self.core.users.get_mut(&id) else {
            return;
        };
        user.facing = facing;
        let map = user.map;
        let (nx, ny) = user.ahead();

        let stepped = self.core.passable(map, nx, ny, facing, true);
        let Some(user) = self.core.users.get_mut(&id) else {
            return;
        };
        if stepped {
            user.x = nx;
            user.y = ny;
        }
        let (x, y) = (user.x, user.y);

        self.core
            .broadcast_to_place_except(id, Notice::MoveGameObject { id, x, y, facing });
        if stepped {
            self.core.portal(id);
        }
        self.settle();
    }

    pub fn use_item(&mut self, id: UserId) {
        if !self.core.users.contains_key(&id) {
            return;
        }
        self.mode.use_item(&mut self.core, id);
        self.settle();
    }

    /// Redraws what `id` sees: world events first, then other users.
    pub fn draw(&self, id: UserId) {
        self.mode.draw_events(&self.core, id);
        self.mode.draw_users(&self.core, id);
    }

    /// One tick of the room loop.
    pub fn update(&mut self) {
        if !self.core.is_running() {
            return;
        }
        self.core.update_places();
        self.mode.update(&mut self.core);
        self.settle();
    }

    /// Stops the room; it is torn down before this returns.
    pub fn shutdown(&mut self) {
        self.core.stop();
        self.settle();
    }

    fn publish_count(&self) {
        self.core.publish(Notice::UpdateRoomUserCount {
            count: self.core.user_count(),
        });
    }

    /// Runs queued redraws and, once the room has stopped, tears it down.
    pub(crate) fn settle(&mut self) {
        loop {
            let redraws = self.core.take_redraws();
            if redraws.is_empty() {
                break;
            }
            for id in redraws {
                if self.core.users.contains_key(&id) {
                    self.draw(id);
                }
            }
        }

        if !self.core.is_running() && !self.torn_down {
            self.torn_down = true;
            self.core.clear();
            tracing::info!(room_id = %self.core.id, "room torn down");
        }
    }
}
