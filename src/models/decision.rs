use serde::{Deserialize, Serialize};

/// A decision submitted by the local human player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentDecision {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_speech: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_target: Option<u32>,
}

impl AgentDecision {
    pub fn speech(text: impl Into<String>) -> Self {
        Self {
            natural_speech: Some(text.into()),
            vote_target: None,
        }
    }

    pub fn vote(target: u32) -> Self {
        Self {
            natural_speech: None,
            vote_target: Some(target),
        }
    }

    /// Parses a console line: `/vote <id>` votes, anything else is speech.
    pub fn from_command(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match line.strip_prefix("/vote") {
            Some(rest) => rest.trim().parse::<u32>().ok().map(Self::vote),
            None => Some(Self::speech(line)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_console_commands() {
        assert_eq!(AgentDecision::from_command("/vote 5"), Some(AgentDecision::vote(5)));
        assert_eq!(
            AgentDecision::from_command("  I am a villager.  "),
            Some(AgentDecision::speech("I am a villager."))
        );
        assert_eq!(AgentDecision::from_command("/vote abc"), None);
        assert_eq!(AgentDecision::from_command("   "), None);
    }

    #[test]
    fn deserializes_partial_decisions() {
        let decision: AgentDecision = serde_json::from_str(r#"{"vote_target": 3}"#).unwrap();
        assert_eq!(decision, AgentDecision::vote(3));

        let decision: AgentDecision = serde_json::from_str("{}").unwrap();
        assert_eq!(decision, AgentDecision::default());
    }
}
