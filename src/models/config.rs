use std::env;
use std::time::Duration;

use super::role::Role;
use crate::utils::config::{flag_var, parse_var};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("unknown player preset: {0}")]
    UnknownPreset(String),
    #[error("role distribution covers {role_total} seats but the match has {player_count}")]
    InvalidDistribution {
        player_count: usize,
        role_total: usize,
    },
    #[error("a match needs at least one seat for the human player")]
    NoSeats,
    #[error("chatter probability must be within [0, 1], got {0}")]
    ChatterProbability(f64),
    #[error("tick interval must be positive")]
    ZeroTickInterval,
}

/// How many of each role are dealt in a match.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleDistribution {
    pub player_count: usize,
    pub counts: Vec<(Role, usize)>,
}

impl RoleDistribution {
    pub fn standard_nine() -> Self {
        Self {
            player_count: 9,
            counts: vec![
                (Role::Werewolf, 3),
                (Role::Villager, 3),
                (Role::Seer, 1),
                (Role::Witch, 1),
                (Role::Hunter, 1),
            ],
        }
    }

    pub fn standard_six() -> Self {
        Self {
            player_count: 6,
            counts: vec![
                (Role::Werewolf, 2),
                (Role::Villager, 2),
                (Role::Seer, 1),
                (Role::Witch, 1),
            ],
        }
    }

    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "nine" | "9" => Ok(Self::standard_nine()),
            "six" | "6" => Ok(Self::standard_six()),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }

    /// The unshuffled role list, one entry per seat.
    pub fn roles(&self) -> Vec<Role> {
        self.counts
            .iter()
            .flat_map(|(role, n)| std::iter::repeat(*role).take(*n))
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.player_count == 0 {
            return Err(ConfigError::NoSeats);
        }
        let role_total: usize = self.counts.iter().map(|(_, n)| n).sum();
        if role_total != self.player_count {
            return Err(ConfigError::InvalidDistribution {
                player_count: self.player_count,
                role_total,
            });
        }
        Ok(())
    }
}

impl Default for RoleDistribution {
    fn default() -> Self {
        Self::standard_nine()
    }
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub tick_interval_ms: u64,
    // chance per discussion tick that an agent speaks
    pub chatter_probability: f64,
    pub roles: RoleDistribution,
    // 0 runs until interrupted
    pub run_seconds: u64,
    pub rng_seed: Option<u64>,
    pub print_snapshots: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            chatter_probability: 0.2,
            roles: RoleDistribution::standard_nine(),
            run_seconds: 0,
            rng_seed: None,
            print_snapshots: false,
        }
    }
}

impl SimulationConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let roles = match lookup("SIM_PLAYER_PRESET") {
            Some(preset) => RoleDistribution::from_preset(&preset)?,
            None => defaults.roles,
        };

        let config = Self {
            tick_interval_ms: parse_var(&lookup, "SIM_TICK_INTERVAL_MS")?
                .unwrap_or(defaults.tick_interval_ms),
            chatter_probability: parse_var(&lookup, "SIM_CHATTER_PROBABILITY")?
                .unwrap_or(defaults.chatter_probability),
            roles,
            run_seconds: parse_var(&lookup, "SIM_RUN_SECONDS")?.unwrap_or(defaults.run_seconds),
            rng_seed: parse_var(&lookup, "SIM_RNG_SEED")?,
            print_snapshots: flag_var(&lookup, "SIM_PRINT_SNAPSHOTS", defaults.print_snapshots),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if !(0.0..=1.0).contains(&self.chatter_probability) {
            return Err(ConfigError::ChatterProbability(self.chatter_probability));
        }
        self.roles.validate()
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
