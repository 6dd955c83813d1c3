use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex, Once};

use crate::models::{config::SimulationConfig, decision::AgentDecision, game::GameState};
use crate::services::{backend::MatchBackend, broadcaster::Listener};
use crate::state::GameEngine;

static INIT: Once = Once::new();

/// Routes library logs into the test harness once per process.
pub fn setup_test_env() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Engine with a fixed seed and default config.
pub fn seeded_engine(seed: u64) -> GameEngine {
    setup_test_env();
    GameEngine::with_rng(SimulationConfig::default(), Box::new(StdRng::seed_from_u64(seed)))
        .unwrap_or_else(|e| panic!("default config rejected: {}", e))
}

/// Backend that keeps every decision it receives.
#[derive(Default)]
pub struct RecordingBackend {
    pub decisions: Mutex<Vec<AgentDecision>>,
}

impl MatchBackend for RecordingBackend {
    fn submit_decision(&self, decision: &AgentDecision) {
        if let Ok(mut decisions) = self.decisions.lock() {
            decisions.push(decision.clone());
        }
    }
}

/// Listener that stores every snapshot it is handed.
pub fn recording_listener() -> (Listener, Arc<Mutex<Vec<GameState>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let listener: Listener = Arc::new(move |state: GameState| {
        if let Ok(mut states) = sink.lock() {
            states.push(state);
        }
    });
    (listener, seen)
}
