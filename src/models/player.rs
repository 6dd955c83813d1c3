use serde::{Deserialize, Serialize};

use super::role::Role;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub is_alive: bool,
    pub role: Role,
    pub is_human: bool,
    pub suspicion_score: f64,
    pub avatar_url: String,
}

impl Player {
    /// Builds the player seated at `slot` (0-based). Slot 0 is the local human.
    pub fn for_slot(slot: usize, role: Role) -> Self {
        let is_human = slot == 0;
        let name = if is_human {
            "You (Human)".to_string()
        } else {
            format!("Agent-{}", 100 + slot)
        };

        Self {
            id: slot as u32 + 1,
            name,
            is_alive: true,
            role,
            is_human,
            suspicion_score: 0.0,
            avatar_url: format!("https://picsum.photos/seed/{}/100/100", slot + 50),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_zero_is_human() {
        let human = Player::for_slot(0, Role::Seer);
        assert_eq!(human.id, 1);
        assert!(human.is_human);
        assert_eq!(human.name, "You (Human)");

        let agent = Player::for_slot(3, Role::Villager);
        assert_eq!(agent.id, 4);
        assert!(!agent.is_human);
        assert_eq!(agent.name, "Agent-103");
        assert_ne!(agent.avatar_url, human.avatar_url);
    }
}
