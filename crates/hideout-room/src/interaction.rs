//! Facing-based interaction resolution.
//!
//! A hit reaches whatever stands on the actor's own cell or on the cell
//! the actor faces. Users are tried first, in id order; world events are
//! only tried when no user handled the hit.

use hideout_protocol::UserId;

use crate::{Room, RoomCore, User};

/// Whether `(x, y)` is the actor's cell or the one directly ahead.
pub(crate) fn within_reach(actor: &User, x: i32, y: i32) -> bool {
    actor.is_at(x, y) || actor.ahead() == (x, y)
}

impl Room {
    pub fn hit(&mut self, attacker: UserId) {
        let (core, mode) = self.split_mut();
        let Some(actor) = core.users.get(&attacker) else {
            return;
        };

        let candidates: Vec<UserId> = core
            .place(actor.map)
            .into_iter()
            .flat_map(|place| place.users())
            .filter(|id| *id != attacker)
            .filter(|id| {
                core.users
                    .get(id)
                    .is_some_and(|u| within_reach(actor, u.x, u.y))
            })
            .collect();

        let mut handled = false;
        for target in candidates {
            if mode.hit(core, attacker, target) {
                handled = true;
                break;
            }
        }
        if !handled {
            handled = core.activate_events(attacker);
        }

        tracing::trace!(room_id = %core.id, user_id = %attacker, handled, "hit resolved");
        self.settle();
    }
}

impl RoomCore {
    /// Activates the first reachable event on the actor's map that handles
    /// the interaction, then delivers whatever the events queued.
    pub(crate) fn activate_events(&mut self, actor: UserId) -> bool {
        let Some(user) = self.users.get(&actor) else {
            return false;
        };
        let Some(place) = self.places.get_mut(&user.map) else {
            return false;
        };

        let mut outbox = Vec::new();
        let mut handled = false;
        for event in place.events_mut() {
            let (_, x, y) = event.location();
            if within_reach(user, x, y) && event.activate(user, &mut outbox) {
                handled = true;
                break;
            }
        }

        for (recipient, notice) in outbox {
            self.dispatch(recipient, notice);
        }
        handled
    }
}
