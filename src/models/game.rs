use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    log_entry::{LogEntry, LogType},
    player::Player,
    role::Team,
};

/// Countdown a fresh match starts with, before the first transition.
pub const INITIAL_TIME_LEFT: i64 = 30;
/// Length of the wolves' night.
pub const NIGHT_DURATION: i64 = 10;
/// The locally controlled player always sits in the first seat.
pub const HUMAN_PLAYER_ID: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    NightWolf,   // wolves pick a victim
    DayAnnounce, // night results are read out
    DayDiscuss,
    DayVote,
}

impl Phase {
    pub fn next(&self) -> Phase {
        match self {
            Phase::NightWolf => Phase::DayAnnounce,
            Phase::DayAnnounce => Phase::DayDiscuss,
            Phase::DayDiscuss => Phase::DayVote,
            Phase::DayVote => Phase::NightWolf,
        }
    }

    /// Seconds granted to this phase when the cycle enters it.
    pub fn duration(&self) -> i64 {
        match self {
            Phase::DayAnnounce => 5,
            Phase::DayDiscuss => 30,
            Phase::DayVote => 15,
            Phase::NightWolf => NIGHT_DURATION,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::NightWolf => write!(f, "NIGHT_WOLF"),
            Phase::DayAnnounce => write!(f, "DAY_ANNOUNCE"),
            Phase::DayDiscuss => write!(f, "DAY_DISCUSS"),
            Phase::DayVote => write!(f, "DAY_VOTE"),
        }
    }
}

/// Snapshot of a whole match. Clones handed to observers share nothing with
/// the live copy.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub day: u32,
    pub phase: Phase,
    pub players: Vec<Player>,
    pub logs: Vec<LogEntry>,
    pub time_left: i64,
    pub winner: Option<Team>,
    pub self_id: u32,
    pub sheriff_id: Option<u32>,
}

impl GameState {
    pub fn new(players: Vec<Player>) -> Self {
        GameState {
            day: 1,
            phase: Phase::DayAnnounce,
            players,
            logs: Vec::new(),
            time_left: INITIAL_TIME_LEFT,
            winner: None,
            self_id: HUMAN_PLAYER_ID,
            sheriff_id: None,
        }
    }

    /// Appends an entry stamped with the current day and phase.
    pub fn add_log(&mut self, content: impl Into<String>, log_type: LogType, speaker_id: Option<u32>) {
        let entry = LogEntry::new(self.day, self.phase, speaker_id, content.into(), log_type);
        self.logs.push(entry);
    }

    pub fn player(&self, id: u32) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn is_living(&self, id: u32) -> bool {
        self.player(id).map(|p| p.is_alive).unwrap_or(false)
    }

    pub fn living_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_alive)
    }

    pub fn logs_by_type(&self, log_type: LogType) -> Vec<&LogEntry> {
        self.logs.iter().filter(|l| l.log_type == log_type).collect()
    }

    /// Judges the match from the living roles. Nothing applies this
    /// automatically; an outside referee decides when to declare it.
    pub fn judge_winner(&self) -> Option<Team> {
        let mut wolves = 0;
        let mut others = 0;
        for p in self.living_players() {
            match p.role.team() {
                Team::Werewolves => wolves += 1,
                Team::Villagers => others += 1,
            }
        }

        if wolves == 0 {
            Some(Team::Villagers)
        } else if wolves >= others {
            Some(Team::Werewolves)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::role::Role;

    fn state_with_roles(roles: &[Role]) -> GameState {
        let players = roles
            .iter()
            .enumerate()
            .map(|(slot, role)| Player::for_slot(slot, *role))
            .collect();
        GameState::new(players)
    }

    #[test]
    fn phase_cycle_wraps_to_night() {
        let mut phase = Phase::NightWolf;
        let mut seen = Vec::new();
        for _ in 0..8 {
            seen.push(phase);
            phase = phase.next();
        }
        assert_eq!(
            seen,
            vec![
                Phase::NightWolf,
                Phase::DayAnnounce,
                Phase::DayDiscuss,
                Phase::DayVote,
                Phase::NightWolf,
                Phase::DayAnnounce,
                Phase::DayDiscuss,
                Phase::DayVote,
            ]
        );
    }

    #[test]
    fn add_log_stamps_current_day_and_phase() {
        let mut state = state_with_roles(&[Role::Villager, Role::Werewolf]);
        state.day = 3;
        state.phase = Phase::DayVote;
        state.add_log("hello", LogType::Speech, Some(2));

        let entry = &state.logs[0];
        assert_eq!(entry.day, 3);
        assert_eq!(entry.phase, Phase::DayVote);
        assert_eq!(entry.speaker_id, Some(2));
        assert_eq!(entry.content, "hello");
    }

    #[test]
    fn judge_winner_follows_living_roles() {
        let mut state = state_with_roles(&[
            Role::Villager,
            Role::Werewolf,
            Role::Seer,
            Role::Villager,
        ]);
        assert_eq!(state.judge_winner(), None);

        state.players[1].is_alive = false;
        assert_eq!(state.judge_winner(), Some(Team::Villagers));

        state.players[1].is_alive = true;
        state.players[0].is_alive = false;
        state.players[2].is_alive = false;
        assert_eq!(state.judge_winner(), Some(Team::Werewolves));
    }

    #[test]
    fn serializes_with_ui_field_names() {
        let state = state_with_roles(&[Role::Villager]);
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["phase"], "DAY_ANNOUNCE");
        assert_eq!(json["timeLeft"], 30);
        assert_eq!(json["selfId"], 1);
        assert!(json["sheriffId"].is_null());
        assert_eq!(json["players"][0]["isHuman"], true);
        assert_eq!(json["players"][0]["role"], "VILLAGER");
    }
}
