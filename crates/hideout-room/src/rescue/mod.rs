//! Rescue: red captors against blue hostages.
//!
//! Everyone joins blue and waits in the blue base while a lobby countdown
//! runs. When it reaches the game threshold the room locks and a random
//! sample of the blue roster turns red. Red users capture blue users by
//! hitting them, which sends them to the prison. Red users who linger next
//! to a portal are warned and eventually sent back to their base.

mod layout;
mod state;

use std::any::Any;
use std::collections::{BTreeSet, HashMap};

use hideout_protocol::{Appearance, Notice, Team, UserId};

use crate::{GameMode, RoomCore};

pub use layout::{MapType, RescueLayout, Spot};
pub use state::{Phase, RescueConfig, RescueState};

const RED_OBJECTIVE: &str = "Lock up even a single human in the prison.";
const BLUE_OBJECTIVE: &str = "Rescue every hostage held in the prison.";
const CAMP_WARNING: &str = "<color=red>Warning! Do not block the area around a portal.</color>";
const CAMP_EJECTED: &str =
    "<color=red>You were sent back to your base for repeatedly disrupting play.</color>";
const RESCUE_SOON: &str = "<color=#B5E61D>Hostages can be rescued shortly...</color>";
const RESCUE_OPEN: &str = "<color=#B5E61D>Hostages can be rescued now!</color>";

pub struct RescueMode {
    config: RescueConfig,
    map: MapType,
    layout: RescueLayout,
    red_score: usize,
    blue_score: usize,
    red: BTreeSet<UserId>,
    blue: BTreeSet<UserId>,
    players: HashMap<UserId, RescueState>,
    phase: Phase,
    tick: u32,
    count: i32,
    winner: Option<Team>,
}

impl RescueMode {
    pub fn new(map: MapType, config: RescueConfig) -> Self {
        Self {
            count: config.countdown_start,
            config,
            map,
            layout: map.layout(),
            red_score: 0,
            blue_score: 0,
            red: BTreeSet::new(),
            blue: BTreeSet::new(),
            players: HashMap::new(),
            phase: Phase::Ready,
            tick: 0,
            winner: None,
        }
    }

    pub fn map_type(&self) -> MapType {
        self.map
    }

    pub fn layout(&self) -> &RescueLayout {
        &self.layout
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Seconds left on the countdown.
    pub fn count(&self) -> i32 {
        self.count
    }

    pub fn red_score(&self) -> usize {
        self.red_score
    }

    pub fn blue_score(&self) -> usize {
        self.blue_score
    }

    pub fn winner(&self) -> Option<Team> {
        self.winner
    }

    pub fn state(&self, user: UserId) -> Option<&RescueState> {
        self.players.get(&user)
    }

    pub fn team_of(&self, user: UserId) -> Option<Team> {
        self.players.get(&user).map(|s| s.team)
    }

    pub fn team(&self, team: Team) -> &BTreeSet<UserId> {
        match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
        }
    }

    /// Every tracked user is in exactly the team set their state names,
    /// and both sets only hold tracked users.
    pub fn teams_consistent(&self) -> bool {
        let states_agree = self.players.iter().all(|(id, state)| {
            let (own, other) = match state.team {
                Team::Red => (&self.red, &self.blue),
                Team::Blue => (&self.blue, &self.red),
            };
            own.contains(id) && !other.contains(id)
        });
        let sets_tracked = self
            .red
            .iter()
            .chain(&self.blue)
            .all(|id| self.players.contains_key(id));
        states_agree && sets_tracked
    }

    fn enroll(&mut self, user: UserId) {
        let Some(team) = self.team_of(user) else {
            return;
        };
        let (own, other) = match team {
            Team::Red => (&mut self.red, &mut self.blue),
            Team::Blue => (&mut self.blue, &mut self.red),
        };
        other.remove(&user);
        own.insert(user);
    }

    fn unenroll(&mut self, user: UserId) {
        self.red.remove(&user);
        self.blue.remove(&user);
    }

    fn switch_team(&mut self, user: UserId, team: Team) {
        self.unenroll(user);
        if let Some(state) = self.players.get_mut(&user) {
            state.team = team;
        }
        self.enroll(user);
    }

    fn add_score(&mut self, team: Team) {
        match team {
            Team::Red => self.red_score += 1,
            Team::Blue => self.blue_score += 1,
        }
    }

    fn move_to_base(&self, room: &mut RoomCore, user: UserId) {
        if let Some(team) = self.team_of(user) {
            let spot = self.layout.base(team);
            room.relocate(user, spot.map, spot.x, spot.y);
        }
    }

    fn move_to_prison(&self, room: &mut RoomCore, user: UserId) {
        let spot = self.layout.prison;
        room.relocate(user, spot.map, spot.x, spot.y);
    }

    /// Ends the match: marks everyone present, announces the winner and
    /// stops the room.
    pub fn result(&mut self, room: &mut RoomCore, winner: Team) {
        self.phase = Phase::Result;
        self.winner = Some(winner);
        for id in room.user_ids() {
            if let Some(state) = self.players.get_mut(&id) {
                state.result = true;
            }
        }
        room.publish(Notice::MatchResult { winner });
        tracing::info!(
            room_id = %room.id(),
            %winner,
            red_score = self.red_score,
            "rescue match finished"
        );
        room.stop();
    }

    fn ready_second(&mut self, room: &mut RoomCore) {
        let threshold = self.config.game_threshold;
        if self.count > threshold && self.count <= self.config.ready_ceiling {
            if self.count == self.config.lead_in_at {
                room.publish(Notice::sound("GhostsTen"));
            }
            room.publish(Notice::notice((self.count - threshold).to_string()));
        } else if self.count == threshold {
            self.start_game(room);
        }
    }

    fn start_game(&mut self, room: &mut RoomCore) {
        room.lock();
        self.phase = Phase::Game;

        let roster: Vec<UserId> = self.blue.iter().copied().collect();
        let amount = (roster.len() / self.config.red_ratio.max(1) + 1).min(roster.len());
        let picked: Vec<UserId> = if amount == 0 {
            Vec::new()
        } else {
            rand::seq::index::sample(&mut rand::rng(), roster.len(), amount)
                .into_iter()
                .map(|i| roster[i])
                .collect()
        };
        for id in picked {
            self.switch_team(id, Team::Red);
            room.set_appearance(id, Appearance::Red);
        }

        for id in &self.red {
            room.send_to(*id, Notice::notice(RED_OBJECTIVE));
        }
        for id in &self.blue {
            room.send_to(*id, Notice::notice(BLUE_OBJECTIVE));
        }
        room.publish(Notice::sound("A4"));

        tracing::info!(
            room_id = %room.id(),
            red = self.red.len(),
            blue = self.blue.len(),
            "rescue match started"
        );
    }

    fn game_second(&mut self, room: &mut RoomCore) {
        self.patrol_portals(room);

        let count = self.count;
        if count == 15 || count % 40 == 5 {
            room.publish(Notice::inform(RESCUE_SOON));
        } else if count == 10 || count % 40 == 0 {
            room.publish(Notice::inform(RESCUE_OPEN));
            room.publish(Notice::sound("thump"));
        }

        if self.config.win_conditions {
            self.check_result(room);
        }
    }

    fn check_result(&mut self, room: &mut RoomCore) {
        if self.red.is_empty() {
            self.result(room, Team::Blue);
        } else if self.blue.is_empty() || self.red_score == self.blue.len() {
            self.result(room, Team::Red);
        } else if self.count == 5 {
            room.publish(Notice::sound("Second"));
        } else if self.count == 0 {
            let winner = if self.red_score > 0 { Team::Red } else { Team::Blue };
            self.result(room, winner);
        }
    }

    /// Camping control: red users near a portal accumulate a counter, get
    /// warned, and past the limit are sent back to their base.
    fn patrol_portals(&mut self, room: &mut RoomCore) {
        let red: Vec<UserId> = self.red.iter().copied().collect();
        for id in red {
            let Some(user) = room.user(id) else {
                continue;
            };
            let near = room
                .maps()
                .near_portal(user.map, user.x, user.y, self.config.camp_radius);
            let Some(state) = self.players.get_mut(&id) else {
                continue;
            };

            if !near {
                state.camping = state.camping.saturating_sub(1);
                continue;
            }

            state.camping += 1;
            if state.camping > self.config.camp_warn_max {
                state.camping = 0;
                self.move_to_base(room, id);
                room.send_to(id, Notice::inform(CAMP_EJECTED));
                tracing::debug!(room_id = %room.id(), user_id = %id, "camper ejected");
            } else if state.camping >= self.config.camp_warn_min {
                room.send_to(id, Notice::inform(CAMP_WARNING));
                room.send_to(id, Notice::sound("Warn"));
            }
        }
    }
}

impl GameMode for RescueMode {
    fn join(&mut self, room: &mut RoomCore, user: UserId) {
        if self.phase == Phase::Result {
            return;
        }
        self.unenroll(user);
        self.players.insert(user, RescueState::default());

        match self.phase {
            Phase::Ready => {
                room.set_appearance(user, Appearance::Blue);
                self.enroll(user);
                self.move_to_base(room, user);
            }
            Phase::Game => {
                if let Some(state) = self.players.get_mut(&user) {
                    state.captured = true;
                }
                room.set_appearance(user, Appearance::Blue);
                self.enroll(user);
                self.move_to_prison(room, user);
                self.red_score += 1;
                room.send_to(user, Notice::notice(BLUE_OBJECTIVE));
            }
            Phase::Result => {}
        }
    }

    fn leave(&mut self, _room: &mut RoomCore, user: UserId) {
        self.unenroll(user);
        if self.players.remove(&user).is_some_and(|s| s.captured) {
            self.red_score = self.red_score.saturating_sub(1);
        }
    }

    fn draw_users(&self, room: &RoomCore, user: UserId) {
        let Some(me) = room.user(user) else {
            return;
        };
        let Some(place) = room.place(me.map) else {
            return;
        };
        let my_team = self.team_of(user);

        for other_id in place.users().filter(|id| *id != user) {
            let Some(other) = room.user(other_id) else {
                continue;
            };
            let hidden = self.team_of(other_id) != my_team;
            other.send(Notice::CreateGameObject {
                object: me.game_object(hidden),
            });
            me.send(Notice::CreateGameObject {
                object: other.game_object(hidden),
            });
        }
    }

    fn hit(&mut self, room: &mut RoomCore, attacker: UserId, target: UserId) -> bool {
        let Some(attacker_team) = self.team_of(attacker) else {
            return false;
        };
        if attacker_team == Team::Blue {
            return true;
        }
        let Some(target_state) = self.players.get(&target) else {
            return false;
        };
        if target_state.team == attacker_team {
            return false;
        }
        if target_state.captured {
            return true;
        }

        self.move_to_prison(room, target);
        if let Some(state) = self.players.get_mut(&target) {
            state.captured = true;
        }

        let name = room.user(target).map(|u| u.name.clone()).unwrap_or_default();
        room.send_to(attacker, Notice::notice(format!("You took {name} hostage.")));
        room.send_to(attacker, Notice::sound("Eat"));
        room.broadcast_except(attacker, Notice::notice(format!("{name} was taken hostage!")));
        room.broadcast_except(attacker, Notice::sound("Shock"));
        self.add_score(attacker_team);

        tracing::debug!(
            room_id = %room.id(),
            attacker = %attacker,
            target = %target,
            red_score = self.red_score,
            "hostage captured"
        );
        true
    }

    fn update(&mut self, room: &mut RoomCore) {
        self.tick += 1;
        if self.tick % self.config.ticks_per_second.max(1) != 0 {
            return;
        }
        self.tick = 0;

        match self.phase {
            Phase::Ready => self.ready_second(room),
            Phase::Game => self.game_second(room),
            Phase::Result => {}
        }
        self.count -= 1;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
