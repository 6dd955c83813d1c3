use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::game::Phase;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    pub day: u32,
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_id: Option<u32>,
    pub content: String,
    #[serde(rename = "type")]
    pub log_type: LogType,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    System, // narrator messages
    Alert,
    Speech,
    Action, // human intents echoed back for display
}

impl LogEntry {
    pub fn new(
        day: u32,
        phase: Phase,
        speaker_id: Option<u32>,
        content: String,
        log_type: LogType,
    ) -> Self {
        LogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            day,
            phase,
            speaker_id,
            content,
            log_type,
            timestamp: Utc::now(),
        }
    }
}
