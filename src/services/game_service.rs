use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{
    config::RoleDistribution,
    game::{GameState, Phase},
    log_entry::LogType,
    player::Player,
};

/// Lines the agents pick from while the village discusses.
pub const CHATTER_PHRASES: [&str; 5] = [
    "I suspect Player 5 is acting suspiciously quiet.",
    "My logic dictates Player 2 is a Villager.",
    "I agree with the previous statement.",
    "Can we focus on the voting patterns?",
    "I am a Villager, please trust me.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The countdown moved without a transition.
    Counting,
    Advanced { from: Phase, to: Phase },
    /// A winner is set; the loop must stop.
    Stopped,
}

/// Deals the configured roles onto fresh seats and returns a new match.
pub fn initialize_match<R: Rng + ?Sized>(distribution: &RoleDistribution, rng: &mut R) -> GameState {
    let mut roles = distribution.roles();

    // Fisher-Yates: each seat is equally likely to receive any role
    for i in (1..roles.len()).rev() {
        let j = rng.gen_range(0..=i);
        roles.swap(i, j);
    }

    let players = roles
        .into_iter()
        .enumerate()
        .map(|(slot, role)| Player::for_slot(slot, role))
        .collect();

    GameState::new(players)
}

/// Runs one tick of the phase driver. Broadcasting is left to the caller.
pub fn tick<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R, chatter_probability: f64) -> TickOutcome {
    if state.winner.is_some() {
        return TickOutcome::Stopped;
    }

    state.time_left -= 1;

    let mut outcome = TickOutcome::Counting;
    if state.time_left <= 0 {
        let from = state.phase;
        let to = advance_phase(state, rng);
        outcome = TickOutcome::Advanced { from, to };
    }

    if state.phase == Phase::DayDiscuss && rng.gen_bool(chatter_probability) {
        agent_chatter(state, rng);
    }

    outcome
}

/// Moves the match to the next phase, applying that transition's side effects.
pub fn advance_phase<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> Phase {
    match state.phase {
        Phase::NightWolf => {
            state.add_log("Dawn breaks. The village wakes up.", LogType::System, None);
        }
        Phase::DayAnnounce => {
            state.add_log("Last night was a peaceful night (Mock).", LogType::System, None);
        }
        Phase::DayDiscuss => {
            state.add_log("Discussion ends. Please cast your votes.", LogType::Alert, None);
        }
        Phase::DayVote => {
            resolve_vote(state, rng);
            state.add_log("Night falls. Wolves are hunting...", LogType::System, None);
            state.day += 1;
        }
    }

    let next = state.phase.next();
    state.phase = next;
    state.time_left = next.duration();
    next
}

/// Placeholder vote: walk the living players in seat order and eliminate the
/// first one whose coin flip lands. Lower seats are eliminated more often.
pub fn resolve_vote<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> Option<u32> {
    let victim = state
        .players
        .iter_mut()
        .find(|p| p.is_alive && rng.gen_bool(0.5));

    match victim {
        Some(player) => {
            player.is_alive = false;
            let id = player.id;
            state.add_log(format!("Player {} was voted out!", id), LogType::Alert, None);
            Some(id)
        }
        None => {
            state.add_log("No one was voted out.", LogType::System, None);
            None
        }
    }
}

/// A random living agent says a random stock phrase.
fn agent_chatter<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> Option<u32> {
    let speakers: Vec<u32> = state
        .living_players()
        .filter(|p| !p.is_human)
        .map(|p| p.id)
        .collect();

    let speaker = *speakers.choose(rng)?;
    let phrase = *CHATTER_PHRASES.choose(rng)?;
    state.add_log(phrase, LogType::Speech, Some(speaker));
    Some(speaker)
}
