//! Room actor: an isolated Tokio task that owns one [`Room`].
//!
//! The outside world talks to it through a [`RoomHandle`]. Commands and
//! ticks are serialized by a single `select!`, so the room has exactly one
//! writer. After each command or tick the actor reports joinability to the
//! registry, and deregisters once the room has stopped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use hideout_protocol::{Facing, MapId, RoomId, UserId};
use hideout_tick::{TickConfig, TickScheduler};
use tokio::sync::{Mutex, mpsc, oneshot};

use crate::registry::Registry;
use crate::{GameMode, MapProvider, Room, RoomConfig, RoomError, RoomInfo, RoomType, User};

type Inspection = Box<dyn FnOnce(&Room) + Send>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    Join {
        user: User,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Leave {
        user_id: UserId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Walk {
        user_id: UserId,
        facing: Facing,
    },
    Portal {
        user_id: UserId,
    },
    Teleport {
        user_id: UserId,
        map: MapId,
        x: i32,
        y: i32,
        facing: Facing,
    },
    Hit {
        user_id: UserId,
    },
    UseItem {
        user_id: UserId,
    },
    /// Run a read-only closure against the room on its own task.
    Inspect(Inspection),
    Shutdown,
}

/// Handle to a running room actor.
///
/// Cheap to clone. The registry holds one per room; the session layer
/// keeps one per connected user.
#[derive(Clone, Debug)]
pub struct RoomHandle {
    room_id: RoomId,
    room_type: RoomType,
    sender: mpsc::Sender<RoomCommand>,
    running: Arc<AtomicBool>,
}

impl RoomHandle {
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    pub fn room_type(&self) -> RoomType {
        self.room_type
    }

    /// False once the room has stopped. Readable without a round trip.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    pub async fn join(&self, user: User) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            user,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?
    }

    pub async fn leave(&self, user_id: UserId) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Leave {
            user_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?
    }

    /// Fire-and-forget, like every gameplay command below.
    pub async fn walk(&self, user_id: UserId, facing: Facing) -> Result<(), RoomError> {
        self.send(RoomCommand::Walk { user_id, facing }).await
    }

    pub async fn portal(&self, user_id: UserId) -> Result<(), RoomError> {
        self.send(RoomCommand::Portal { user_id }).await
    }

    pub async fn teleport(
        &self,
        user_id: UserId,
        map: MapId,
        x: i32,
        y: i32,
        facing: Facing,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Teleport {
            user_id,
            map,
            x,
            y,
            facing,
        })
        .await
    }

    pub async fn hit(&self, user_id: UserId) -> Result<(), RoomError> {
        self.send(RoomCommand::Hit { user_id }).await
    }

    pub async fn use_item(&self, user_id: UserId) -> Result<(), RoomError> {
        self.send(RoomCommand::UseItem { user_id }).await
    }

    /// Runs `f` on the room's task and returns its result.
    pub async fn inspect<R, F>(&self, f: F) -> Result<R, RoomError>
    where
        F: FnOnce(&Room) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Inspection = Box::new(move |room| {
            let _ = reply_tx.send(f(room));
        });
        self.send(RoomCommand::Inspect(job)).await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        self.inspect(Room::info).await
    }

    /// Asks the room to stop. It tears down and deregisters itself.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }
}

struct RoomActor {
    room: Room,
    scheduler: TickScheduler,
    receiver: mpsc::Receiver<RoomCommand>,
    registry: Weak<Mutex<Registry>>,
    /// Last joinability reported to the registry.
    joinable: bool,
    deregistered: bool,
}

impl RoomActor {
    async fn run(mut self) {
        let room_id = self.room.id();
        tracing::info!(%room_id, room_type = %self.room.core().room_type(), "room loop started");

        while self.room.is_running() {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => self.handle(cmd).await,
                    None => {
                        tracing::debug!(%room_id, "all handles dropped");
                        self.room.shutdown();
                        self.sync_registry().await;
                    }
                },
                _ = self.scheduler.wait_for_tick() => {
                    self.room.update();
                    self.scheduler.record_tick_end();
                    self.sync_registry().await;
                }
            }
        }

        tracing::info!(
            %room_id,
            ticks = self.scheduler.tick_count(),
            overruns = self.scheduler.stats().total_overruns,
            max_tick_us = self.scheduler.stats().max_tick_time.as_micros() as u64,
            "room loop stopped"
        );
    }

    async fn handle(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join { user, reply } => {
                let result = self.room.join(user);
                self.sync_registry().await;
                let _ = reply.send(result);
            }
            RoomCommand::Leave { user_id, reply } => {
                let result = self.room.leave(user_id).map(|_| ());
                self.sync_registry().await;
                let _ = reply.send(result);
            }
            RoomCommand::Walk { user_id, facing } => {
                self.room.walk(user_id, facing);
                self.sync_registry().await;
            }
            RoomCommand::Portal { user_id } => {
                self.room.portal(user_id);
                self.sync_registry().await;
            }
            RoomCommand::Teleport {
                user_id,
                map,
                x,
                y,
                facing,
            } => {
                self.room.teleport(user_id, map, x, y, facing);
                self.sync_registry().await;
            }
            RoomCommand::Hit { user_id } => {
                self.room.hit(user_id);
                self.sync_registry().await;
            }
            RoomCommand::UseItem { user_id } => {
                self.room.use_item(user_id);
                self.sync_registry().await;
            }
            RoomCommand::Inspect(job) => job(&self.room),
            RoomCommand::Shutdown => {
                tracing::info!(room_id = %self.room.id(), "room shutting down");
                self.room.shutdown();
                self.sync_registry().await;
            }
        }
    }

    /// Mirrors the room's state into the registry. Never called while the
    /// registry awaits this room.
    async fn sync_registry(&mut self) {
        if self.deregistered {
            return;
        }
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let room_id = self.room.id();

        if !self.room.is_running() {
            registry.lock().await.deregister(room_id);
            self.deregistered = true;
            return;
        }

        let joinable = self.room.check_joinable();
        if joinable != self.joinable {
            registry
                .lock()
                .await
                .set_joinable(room_id, self.room.core().room_type(), joinable);
            self.joinable = joinable;
        }
    }
}

/// Spawns a room actor task and returns a handle to it.
///
/// The room starts out joinable; the caller indexes it as such.
pub(crate) fn spawn_room(
    room_id: RoomId,
    room_type: RoomType,
    config: &RoomConfig,
    maps: Arc<dyn MapProvider>,
    mode: Box<dyn GameMode>,
    registry: Weak<Mutex<Registry>>,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.channel_size.max(1));
    let room = Room::new(room_id, room_type, config, maps, mode);
    let running = Arc::clone(&room.core().running);

    let actor = RoomActor {
        room,
        scheduler: TickScheduler::new(TickConfig::with_interval(config.tick_interval)),
        receiver: rx,
        registry,
        joinable: true,
        deregistered: false,
    };
    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        room_type,
        sender: tx,
        running,
    }
}
