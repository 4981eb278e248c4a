//! Integration tests for rooms, places and the registry using a rule-free
//! sandbox mode.

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use hideout_protocol::{EventId, Facing, MapId, Notice, Recipient, RoomId, UserId};
use hideout_room::{
    GameMap, GameMode, MapType, Portal, Room, RoomConfig, RoomCore, RoomError, RoomRegistry,
    RoomType, StaticMaps, User, WorldEvent,
};
use tokio::sync::mpsc;

// =========================================================================
// Sandbox mode: no rules, records what the room asked of it.
// =========================================================================

#[derive(Default)]
struct Sandbox {
    updates: u32,
    lock_after: Option<u32>,
    accept_hits: bool,
    /// Ends the room as soon as anyone joins.
    stop_on_join: bool,
    hits: Vec<(UserId, UserId)>,
}

impl GameMode for Sandbox {
    fn join(&mut self, room: &mut RoomCore, _user: UserId) {
        if self.stop_on_join {
            room.stop();
        }
    }

    fn leave(&mut self, _room: &mut RoomCore, _user: UserId) {}

    fn draw_users(&self, room: &RoomCore, user: UserId) {
        let Some(me) = room.user(user) else {
            return;
        };
        for id in room.users_in(me.map) {
            if let Some(other) = room.user(id).filter(|o| o.id != user) {
                me.send(Notice::CreateGameObject {
                    object: other.game_object(false),
                });
            }
        }
    }

    fn hit(&mut self, _room: &mut RoomCore, attacker: UserId, target: UserId) -> bool {
        self.hits.push((attacker, target));
        self.accept_hits
    }

    fn update(&mut self, room: &mut RoomCore) {
        self.updates += 1;
        if self.lock_after == Some(self.updates) {
            room.lock();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A switch that tells whoever presses it, and counts ticks.
struct Switch {
    id: EventId,
    at: (MapId, i32, i32),
    collider: bool,
    ticks: Arc<AtomicU32>,
}

impl WorldEvent for Switch {
    fn id(&self) -> EventId {
        self.id
    }

    fn location(&self) -> (MapId, i32, i32) {
        self.at
    }

    fn collider(&self) -> bool {
        self.collider
    }

    fn activate(&mut self, actor: &User, outbox: &mut Vec<(Recipient, Notice)>) -> bool {
        outbox.push((Recipient::User(actor.id), Notice::notice("click")));
        true
    }

    fn update(&mut self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }
}

// =========================================================================
// Helpers
// =========================================================================

const TOWN: MapId = MapId(1);
const CELLAR: MapId = MapId(2);
const ROOM_TYPE: RoomType = RoomType::Rescue(MapType::Asylum);

fn world() -> StaticMaps {
    StaticMaps::new()
        .with_map(
            GameMap::new(TOWN, 10, 10)
                .with_wall(5, 1)
                .with_portal(Portal {
                    x: 3,
                    y: 3,
                    next_map: CELLAR,
                    next_x: 1,
                    next_y: 1,
                    next_facing: Facing::DOWN,
                    sound: Some("door".into()),
                }),
        )
        .with_map(GameMap::new(CELLAR, 10, 10))
}

fn room_with(mode: Sandbox) -> Room {
    Room::new(
        RoomId(1),
        ROOM_TYPE,
        &RoomConfig::default(),
        Arc::new(world()),
        Box::new(mode),
    )
}

fn room() -> Room {
    room_with(Sandbox::default())
}

fn user(id: u64, map: MapId, x: i32, y: i32) -> (User, mpsc::UnboundedReceiver<Notice>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (User::new(UserId(id), format!("user-{id}"), tx).at(map, x, y), rx)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<Notice>) -> Vec<Notice> {
    let mut out = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        out.push(notice);
    }
    out
}

fn sandbox(room: &Room) -> &Sandbox {
    room.mode_as::<Sandbox>().expect("sandbox mode")
}

fn registry(max_users: usize, mode: fn() -> Sandbox) -> RoomRegistry {
    let config = RoomConfig {
        max_users,
        ..RoomConfig::default()
    };
    RoomRegistry::new(
        config,
        Arc::new(world()),
        move |_room_type: RoomType| -> Box<dyn GameMode> { Box::new(mode()) },
    )
}

// =========================================================================
// Room
// =========================================================================

#[test]
fn test_join_publishes_count_and_places_user() {
    let mut room = room();
    let (a, mut rx_a) = user(1, TOWN, 1, 1);
    let (b, _rx_b) = user(2, CELLAR, 1, 1);

    room.join(a).unwrap();
    room.join(b).unwrap();

    assert_eq!(
        drain(&mut rx_a),
        vec![
            Notice::UpdateRoomUserCount { count: 1 },
            Notice::UpdateRoomUserCount { count: 2 },
        ]
    );
    assert!(room.core().membership_consistent());
    assert_eq!(room.core().users_in(TOWN), vec![UserId(1)]);
    assert_eq!(room.core().users_in(CELLAR), vec![UserId(2)]);
}

#[test]
fn test_duplicate_join_is_rejected() {
    let mut room = room();
    room.join(user(1, TOWN, 1, 1).0).unwrap();

    let err = room.join(user(1, TOWN, 2, 2).0).unwrap_err();
    assert!(matches!(err, RoomError::AlreadyInRoom(UserId(1), RoomId(1))));
    assert_eq!(room.core().user_count(), 1);
}

#[test]
fn test_leave_unknown_user() {
    let mut room = room();
    let err = room.leave(UserId(9)).unwrap_err();
    assert!(matches!(err, RoomError::NotInRoom(UserId(9), _)));
}

#[test]
fn test_leave_despawns_for_place() {
    let mut room = room();
    let (a, mut rx_a) = user(1, TOWN, 1, 1);
    room.join(a).unwrap();
    room.join(user(2, TOWN, 2, 2).0).unwrap();
    drain(&mut rx_a);

    let left = room.leave(UserId(2)).unwrap();

    assert_eq!(left.id, UserId(2));
    assert_eq!(
        drain(&mut rx_a),
        vec![
            Notice::RemoveGameObject { id: UserId(2) },
            Notice::UpdateRoomUserCount { count: 1 },
        ]
    );
    assert!(room.is_running());
    assert!(room.core().membership_consistent());
}

#[test]
fn test_teleport_moves_between_places_and_redraws() {
    let mut room = room();
    let (a, mut rx_a) = user(1, TOWN, 1, 1);
    let (b, mut rx_b) = user(2, TOWN, 2, 2);
    room.join(a).unwrap();
    room.join(b).unwrap();
    room.join(user(3, CELLAR, 4, 4).0).unwrap();
    drain(&mut rx_a);
    drain(&mut rx_b);

    room.teleport(UserId(1), CELLAR, 6, 7, Facing::LEFT);

    let moved = room.core().user(UserId(1)).unwrap();
    assert_eq!((moved.map, moved.x, moved.y, moved.facing), (CELLAR, 6, 7, Facing::LEFT));
    assert!(!room.core().place(TOWN).unwrap().contains_user(UserId(1)));
    assert!(room.core().place(CELLAR).unwrap().contains_user(UserId(1)));
    assert!(room.core().membership_consistent());

    assert_eq!(drain(&mut rx_b), vec![Notice::RemoveGameObject { id: UserId(1) }]);
    let redraw = drain(&mut rx_a);
    assert_eq!(redraw.len(), 1);
    assert!(matches!(
        &redraw[0],
        Notice::CreateGameObject { object } if object.id == UserId(3)
    ));
}

#[test]
fn test_portal_plays_sound_on_source_map() {
    let mut room = room();
    room.join(user(1, TOWN, 3, 3).0).unwrap();
    let (b, mut rx_b) = user(2, TOWN, 8, 8);
    room.join(b).unwrap();
    drain(&mut rx_b);

    room.portal(UserId(1));

    let moved = room.core().user(UserId(1)).unwrap();
    assert_eq!((moved.map, moved.x, moved.y), (CELLAR, 1, 1));
    assert_eq!(
        drain(&mut rx_b),
        vec![
            Notice::RemoveGameObject { id: UserId(1) },
            Notice::sound("door"),
        ]
    );
}

#[test]
fn test_portal_without_portal_is_noop() {
    let mut room = room();
    room.join(user(1, TOWN, 4, 4).0).unwrap();
    room.portal(UserId(1));
    assert_eq!(room.core().user(UserId(1)).unwrap().map, TOWN);
}

#[test]
fn test_walk_steps_turns_and_blocks() {
    let mut room = room();
    room.join(user(1, TOWN, 2, 1).0).unwrap();
    let (b, mut rx_b) = user(2, TOWN, 8, 8);
    room.join(b).unwrap();
    drain(&mut rx_b);

    room.walk(UserId(1), Facing::RIGHT);
    room.walk(UserId(1), Facing::RIGHT);
    // (5, 1) is a wall.
    room.walk(UserId(1), Facing::RIGHT);

    let walker = room.core().user(UserId(1)).unwrap();
    assert_eq!((walker.x, walker.y, walker.facing), (4, 1, Facing::RIGHT));
    let moved = |x| Notice::MoveGameObject {
        id: UserId(1),
        x,
        y: 1,
        facing: Facing::RIGHT,
    };
    assert_eq!(drain(&mut rx_b), vec![moved(3), moved(4), moved(4)]);
}

#[test]
fn test_walk_blocked_by_colliding_event() {
    let mut room = room();
    room.join(user(1, TOWN, 1, 4).0).unwrap();
    room.split_mut().0.add_event(Box::new(Switch {
        id: EventId(1),
        at: (TOWN, 1, 5),
        collider: true,
        ticks: Arc::default(),
    }));

    room.walk(UserId(1), Facing::DOWN);

    let walker = room.core().user(UserId(1)).unwrap();
    assert_eq!((walker.x, walker.y, walker.facing), (1, 4, Facing::DOWN));
}

#[test]
fn test_walk_onto_portal_uses_it() {
    let mut room = room();
    room.join(user(1, TOWN, 3, 4).0).unwrap();

    room.walk(UserId(1), Facing::UP);

    let walker = room.core().user(UserId(1)).unwrap();
    assert_eq!((walker.map, walker.x, walker.y, walker.facing), (CELLAR, 1, 1, Facing::DOWN));
    assert!(room.core().membership_consistent());
}

#[test]
fn test_hit_stops_at_first_handled_user() {
    let mut room = room_with(Sandbox {
        accept_hits: true,
        ..Sandbox::default()
    });
    room.join(user(1, TOWN, 1, 1).0).unwrap();
    room.join(user(2, TOWN, 2, 1).0).unwrap();
    room.join(user(3, TOWN, 1, 1).0).unwrap();
    room.teleport(UserId(1), TOWN, 1, 1, Facing::RIGHT);

    room.hit(UserId(1));

    assert_eq!(sandbox(&room).hits, vec![(UserId(1), UserId(2))]);
}

#[test]
fn test_hit_falls_through_to_events() {
    let mut room = room();
    let (a, mut rx_a) = user(1, TOWN, 1, 1);
    room.join(a).unwrap();
    room.join(user(2, TOWN, 2, 1).0).unwrap();
    room.join(user(3, TOWN, 1, 1).0).unwrap();
    // Beside the attacker, not ahead of it.
    room.join(user(4, TOWN, 1, 2).0).unwrap();
    room.teleport(UserId(1), TOWN, 1, 1, Facing::RIGHT);
    room.split_mut().0.add_event(Box::new(Switch {
        id: EventId(7),
        at: (TOWN, 2, 1),
        collider: false,
        ticks: Arc::default(),
    }));
    drain(&mut rx_a);

    room.hit(UserId(1));

    assert_eq!(
        sandbox(&room).hits,
        vec![(UserId(1), UserId(2)), (UserId(1), UserId(3))]
    );
    assert_eq!(drain(&mut rx_a), vec![Notice::notice("click")]);
}

#[test]
fn test_hit_from_unknown_user_is_ignored() {
    let mut room = room();
    room.join(user(1, TOWN, 1, 1).0).unwrap();
    room.hit(UserId(42));
    assert!(sandbox(&room).hits.is_empty());
}

#[test]
fn test_update_runs_places_then_mode() {
    let ticks = Arc::new(AtomicU32::new(0));
    let mut room = room();
    room.join(user(1, TOWN, 1, 1).0).unwrap();
    room.split_mut().0.add_event(Box::new(Switch {
        id: EventId(1),
        at: (CELLAR, 3, 3),
        collider: false,
        ticks: Arc::clone(&ticks),
    }));

    for _ in 0..3 {
        room.update();
    }

    assert_eq!(ticks.load(Ordering::Relaxed), 3);
    assert_eq!(sandbox(&room).updates, 3);
}

#[test]
fn test_remove_event() {
    let mut room = room();
    let core = room.split_mut().0;
    core.add_event(Box::new(Switch {
        id: EventId(5),
        at: (CELLAR, 3, 3),
        collider: true,
        ticks: Arc::default(),
    }));
    assert!(!core.passable(CELLAR, 3, 3, Facing::DOWN, true));
    assert!(core.passable(CELLAR, 3, 3, Facing::DOWN, false));

    assert!(core.remove_event(EventId(5)).is_some());
    assert!(core.remove_event(EventId(5)).is_none());
    assert!(core.passable(CELLAR, 3, 3, Facing::DOWN, true));
}

#[test]
fn test_last_leave_tears_down() {
    let mut room = room();
    room.join(user(1, TOWN, 1, 1).0).unwrap();
    room.join(user(2, CELLAR, 1, 1).0).unwrap();

    room.leave(UserId(1)).unwrap();
    assert!(room.is_running());
    room.leave(UserId(2)).unwrap();

    assert!(!room.is_running());
    assert_eq!(room.core().user_count(), 0);
    assert!(room.core().place(TOWN).is_none());
    assert!(room.core().place(CELLAR).is_none());

    // Ticks after teardown do nothing.
    room.update();
    assert_eq!(sandbox(&room).updates, 0);
}

#[test]
fn test_check_joinable_tracks_capacity_and_lock() {
    let mut room = Room::new(
        RoomId(1),
        ROOM_TYPE,
        &RoomConfig {
            max_users: 2,
            ..RoomConfig::default()
        },
        Arc::new(world()),
        Box::new(Sandbox::default()),
    );
    assert!(room.check_joinable());
    room.join(user(1, TOWN, 1, 1).0).unwrap();
    room.join(user(2, TOWN, 1, 1).0).unwrap();
    assert!(!room.check_joinable());

    room.leave(UserId(2)).unwrap();
    assert!(room.check_joinable());
    room.split_mut().0.lock();
    assert!(!room.check_joinable());
    assert!(room.info().locked);
}

// =========================================================================
// Registry
// =========================================================================

#[tokio::test]
async fn test_find_joinable_reuses_open_room() {
    let registry = registry(4, Sandbox::default);

    let first = registry.find_joinable(ROOM_TYPE).await;
    let second = registry.find_joinable(ROOM_TYPE).await;

    assert_eq!(first.room_id(), second.room_id());
    assert_eq!(registry.room_count().await, 1);
}

#[tokio::test]
async fn test_create_returns_unique_ids() {
    let registry = registry(4, Sandbox::default);
    let a = registry.create(ROOM_TYPE).await;
    let b = registry.create(ROOM_TYPE).await;

    assert_ne!(a.room_id(), b.room_id());
    let mut expected = vec![a.room_id(), b.room_id()];
    expected.sort();
    assert_eq!(registry.room_ids().await, expected);
}

#[tokio::test]
async fn test_full_room_is_not_offered() {
    let registry = registry(2, Sandbox::default);

    let a = registry.join(user(1, TOWN, 1, 1).0, ROOM_TYPE).await.unwrap();
    let b = registry.join(user(2, TOWN, 1, 1).0, ROOM_TYPE).await.unwrap();
    let c = registry.join(user(3, TOWN, 1, 1).0, ROOM_TYPE).await.unwrap();

    assert_eq!(a.room_id(), b.room_id());
    assert_ne!(a.room_id(), c.room_id());
    assert_eq!(a.info().await.unwrap().user_count, 2);
    assert_eq!(registry.room_of(UserId(3)).await, Some(c.room_id()));
}

#[tokio::test(start_paused = true)]
async fn test_locked_room_is_not_offered() {
    let registry = registry(10, || Sandbox {
        lock_after: Some(1),
        ..Sandbox::default()
    });
    let first = registry.join(user(1, TOWN, 1, 1).0, ROOM_TYPE).await.unwrap();

    tokio::time::sleep(Duration::from_millis(150)).await;

    assert!(first.info().await.unwrap().locked);
    let next = registry.find_joinable(ROOM_TYPE).await;
    assert_ne!(next.room_id(), first.room_id());
}

#[tokio::test]
async fn test_one_room_at_a_time() {
    let registry = registry(4, Sandbox::default);
    let handle = registry.join(user(1, TOWN, 1, 1).0, ROOM_TYPE).await.unwrap();

    let err = registry
        .join(user(1, TOWN, 1, 1).0, ROOM_TYPE)
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::AlreadyInRoom(UserId(1), id) if id == handle.room_id()));
}

#[tokio::test]
async fn test_leave_not_in_any_room() {
    let registry = registry(4, Sandbox::default);
    let err = registry.leave(UserId(1)).await.unwrap_err();
    assert!(matches!(err, RoomError::NoRoom(UserId(1))));
}

#[tokio::test]
async fn test_last_leave_deregisters_room() {
    let registry = registry(4, Sandbox::default);
    let handle = registry.join(user(1, TOWN, 1, 1).0, ROOM_TYPE).await.unwrap();
    registry.join(user(2, TOWN, 1, 1).0, ROOM_TYPE).await.unwrap();

    registry.leave(UserId(1)).await.unwrap();
    assert_eq!(registry.room_count().await, 1);
    assert_eq!(registry.room_of(UserId(1)).await, None);

    registry.leave(UserId(2)).await.unwrap();
    assert_eq!(registry.room_count().await, 0);
    assert!(!handle.is_running());
    assert!(matches!(
        handle.info().await,
        Err(RoomError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_gameplay_commands_reach_room() {
    let registry = registry(4, || Sandbox {
        accept_hits: true,
        ..Sandbox::default()
    });
    let handle = registry.join(user(1, TOWN, 1, 1).0, ROOM_TYPE).await.unwrap();
    registry.join(user(2, TOWN, 3, 1).0, ROOM_TYPE).await.unwrap();

    handle.walk(UserId(1), Facing::RIGHT).await.unwrap();
    handle.hit(UserId(1)).await.unwrap();

    let hits = handle
        .inspect(|room| room.mode_as::<Sandbox>().map(|s| s.hits.clone()))
        .await
        .unwrap();
    assert_eq!(hits, Some(vec![(UserId(1), UserId(2))]));
}

#[tokio::test]
async fn test_destroy_room() {
    let registry = registry(4, Sandbox::default);
    let handle = registry.join(user(1, TOWN, 1, 1).0, ROOM_TYPE).await.unwrap();

    registry.destroy(handle.room_id()).await.unwrap();

    assert_eq!(registry.room_count().await, 0);
    assert_eq!(registry.room_of(UserId(1)).await, None);
    assert!(registry.get(handle.room_id()).await.is_none());
    assert!(matches!(
        registry.destroy(handle.room_id()).await,
        Err(RoomError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_room_ending_during_join_leaves_no_membership() {
    let registry = registry(4, || Sandbox {
        stop_on_join: true,
        ..Sandbox::default()
    });

    let handle = registry.join(user(1, TOWN, 1, 1).0, ROOM_TYPE).await.unwrap();

    assert!(!handle.is_running());
    assert_eq!(registry.room_count().await, 0);
    assert_eq!(registry.room_of(UserId(1)).await, None);
    assert!(matches!(
        registry.leave(UserId(1)).await,
        Err(RoomError::NoRoom(UserId(1)))
    ));

    // The user is free to match again.
    let again = registry.join(user(1, TOWN, 1, 1).0, ROOM_TYPE).await.unwrap();
    assert_ne!(again.room_id(), handle.room_id());
}
