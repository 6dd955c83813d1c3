use log::info;

use crate::models::decision::AgentDecision;

/// Where human decisions go once they are recorded locally. A real match
/// server would validate them and push authoritative updates back.
pub trait MatchBackend: Send + Sync {
    fn submit_decision(&self, decision: &AgentDecision);
}

/// Stand-in backend that only reports the decision in the log.
#[derive(Debug, Default, Clone)]
pub struct LoggingBackend;

impl MatchBackend for LoggingBackend {
    fn submit_decision(&self, decision: &AgentDecision) {
        match serde_json::to_string(decision) {
            Ok(json) => info!("Human action sent: {}", json),
            Err(_) => info!("Human action sent: {:?}", decision),
        }
    }
}
