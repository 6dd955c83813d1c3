use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Werewolf,
    Villager,
    Seer,
    Witch,
    Hunter,
}

impl Role {
    pub fn team(&self) -> Team {
        match self {
            Role::Werewolf => Team::Werewolves,
            _ => Team::Villagers,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Werewolf => write!(f, "Werewolf"),
            Role::Villager => write!(f, "Villager"),
            Role::Seer => write!(f, "Seer"),
            Role::Witch => write!(f, "Witch"),
            Role::Hunter => write!(f, "Hunter"),
        }
    }
}

/// Winning side of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Team {
    Villagers,
    Werewolves,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Villagers => write!(f, "Villagers"),
            Team::Werewolves => write!(f, "Werewolves"),
        }
    }
}
