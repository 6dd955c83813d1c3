use log::warn;

use crate::{
    models::{decision::AgentDecision, game::GameState, log_entry::LogType},
    state::EngineError,
};

/// Records the human's decision in the match log.
///
/// Speech is always kept. A vote must name a living player; otherwise its
/// `action` entry is skipped and the target is reported back. The vote is
/// display-only and does not feed the automatic vote resolution.
pub fn record_human_action(state: &mut GameState, decision: &AgentDecision) -> Result<(), EngineError> {
    let speaker = Some(state.self_id);

    if let Some(speech) = decision.natural_speech.as_deref().filter(|s| !s.is_empty()) {
        state.add_log(speech, LogType::Speech, speaker);
    }

    if let Some(target) = decision.vote_target {
        if !state.is_living(target) {
            warn!("Rejected vote against player {}: not a living player", target);
            return Err(EngineError::InvalidTarget(target));
        }
        state.add_log(
            format!("(Mock Backend) Received vote against Player {}", target),
            LogType::Action,
            speaker,
        );
    }

    Ok(())
}
