use std::sync::Arc;
use std::time::Duration;

use hideout::prelude::*;
use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

const BOTS: u64 = 6;
const ROOM_TYPE: RoomType = RoomType::Rescue(MapType::Asylum);

// ---------------------------------------------------------------------------
// World: the Asylum bases, the prison and the yard between them
// ---------------------------------------------------------------------------

fn asylum() -> StaticMaps {
    let yard = MapId(19);
    StaticMaps::new()
        .with_map(
            GameMap::new(MapId(2), 20, 20)
                .with_wall(5, 5)
                .with_wall(6, 5)
                .with_portal(Portal {
                    x: 10,
                    y: 13,
                    next_map: yard,
                    next_x: 9,
                    next_y: 8,
                    next_facing: Facing::DOWN,
                    sound: Some("Door".into()),
                }),
        )
        .with_map(GameMap::new(yard, 20, 20).with_portal(Portal {
            x: 9,
            y: 7,
            next_map: MapId(2),
            next_x: 10,
            next_y: 12,
            next_facing: Facing::UP,
            sound: Some("Door".into()),
        }))
        .with_map(GameMap::new(MapId(13), 20, 20))
        .with_map(GameMap::new(MapId(29), 20, 20))
}

// ---------------------------------------------------------------------------
// Bots
// ---------------------------------------------------------------------------

/// Logs every notice a bot receives, encoded the way a connection would
/// see it.
async fn log_notices(id: UserId, mut notices: mpsc::UnboundedReceiver<Notice>) {
    while let Some(notice) = notices.recv().await {
        match JsonCodec.encode(&notice) {
            Ok(bytes) => tracing::debug!(
                user_id = %id,
                notice = %String::from_utf8_lossy(&bytes),
                "notice"
            ),
            Err(e) => tracing::warn!(user_id = %id, error = %e, "unencodable notice"),
        }
    }
}

fn random_move() -> (Facing, bool) {
    let mut rng = rand::rng();
    let facing = match rng.random_range(0..4) {
        0 => Facing::UP,
        1 => Facing::DOWN,
        2 => Facing::LEFT,
        _ => Facing::RIGHT,
    };
    (facing, rng.random_bool(0.3))
}

async fn run_bot(registry: RoomRegistry, n: u64, rounds: u32) -> Result<(), HideoutError> {
    let id = UserId(n);
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(log_notices(id, rx));

    let room = registry
        .join(User::new(id, format!("bot-{n}"), tx), ROOM_TYPE)
        .await?;
    tracing::info!(user_id = %id, room_id = %room.room_id(), "bot joined");

    let mut ticker = tokio::time::interval(Duration::from_millis(300));
    for _ in 0..rounds {
        ticker.tick().await;
        if !room.is_running() {
            tracing::info!(user_id = %id, "room closed under bot");
            return Ok(());
        }
        let (facing, swing) = random_move();
        room.walk(id, facing).await?;
        if swing {
            room.hit(id).await?;
        }
    }

    registry.leave(id).await?;
    tracing::info!(user_id = %id, "bot left");
    Ok(())
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), HideoutError> {
    hideout::telemetry::init("info,hideout_room=debug");

    let modes = Modes {
        rescue: RescueConfig {
            countdown_start: 205,
            win_conditions: true,
            ..RescueConfig::default()
        },
    };
    let registry = RoomRegistry::new(RoomConfig::default(), Arc::new(asylum()), modes);

    let mut bots = JoinSet::new();
    for n in 1..=BOTS {
        // Staggered lifetimes so rooms see both joins and leaves mid-match.
        bots.spawn(run_bot(registry.clone(), n, 40 + 10 * n as u32));
    }

    while let Some(joined) = bots.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "bot stopped early"),
            Err(e) => tracing::warn!(error = %e, "bot task failed"),
        }
    }

    tracing::info!(rooms = registry.room_count().await, "all bots done");
    Ok(())
}
