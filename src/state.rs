use log::{debug, info};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::models::{
    config::{ConfigError, SimulationConfig},
    decision::AgentDecision,
    game::GameState,
    log_entry::LogType,
    role::Team,
};
use crate::services::{
    action_service,
    backend::{LoggingBackend, MatchBackend},
    broadcaster::{Broadcaster, Listener, Subscription},
    game_service::{self, TickOutcome},
};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("player {0} is not a living player")]
    InvalidTarget(u32),
    #[error("the game loop needs a running tokio runtime")]
    NoRuntime,
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

struct Match {
    state: GameState,
    rng: Box<dyn RngCore + Send>,
}

/// The running loop, if any. `generation` moves on every stop so a ticker
/// that was already mid-tick can tell it has been superseded.
#[derive(Default)]
struct Ticker {
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

/// Owns the single live match: its state, its ticker and its observers.
/// Clones share the same match.
///
/// Every mutating operation holds `delivery` from the change until its
/// broadcast returns, so observers see snapshots in the order they were
/// taken. Lock order is delivery, then ticker, then match.
#[derive(Clone)]
pub struct GameEngine {
    current: Arc<Mutex<Match>>,
    ticker: Arc<Mutex<Ticker>>,
    delivery: Arc<Mutex<()>>,
    broadcaster: Broadcaster,
    backend: Arc<dyn MatchBackend>,
    config: Arc<SimulationConfig>,
}

impl GameEngine {
    pub fn new(config: SimulationConfig) -> Result<Self, EngineError> {
        let rng: Box<dyn RngCore + Send> = match config.rng_seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(StdRng::from_entropy()),
        };
        Self::with_rng(config, rng)
    }

    /// Builds an engine drawing all randomness (shuffle, votes, chatter) from `rng`.
    pub fn with_rng(config: SimulationConfig, mut rng: Box<dyn RngCore + Send>) -> Result<Self, EngineError> {
        config.validate()?;
        let state = game_service::initialize_match(&config.roles, rng.as_mut());

        Ok(GameEngine {
            current: Arc::new(Mutex::new(Match { state, rng })),
            ticker: Arc::new(Mutex::new(Ticker::default())),
            delivery: Arc::new(Mutex::new(())),
            broadcaster: Broadcaster::new(),
            backend: Arc::new(LoggingBackend),
            config: Arc::new(config),
        })
    }

    pub fn with_backend(mut self, backend: Arc<dyn MatchBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Current live snapshot.
    pub fn get_state(&self) -> GameState {
        self.lock_match().state.clone()
    }

    pub fn subscribe(&self, listener: Listener) -> Subscription {
        self.broadcaster.subscribe(listener)
    }

    pub fn subscribe_channel(&self) -> broadcast::Receiver<GameState> {
        self.broadcaster.subscribe_channel()
    }

    pub fn is_running(&self) -> bool {
        self.lock_ticker()
            .handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Starts the recurring ticker. Calling this while it already runs does nothing.
    pub fn start_game_loop(&self) -> Result<(), EngineError> {
        let _delivery = self.lock_delivery();
        let mut ticker = self.lock_ticker();
        if ticker.handle.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("Game loop already running");
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;

        let snapshot = {
            let mut current = self.lock_match();
            let day = current.state.day;
            current
                .state
                .add_log(format!("Game Initialized. Day {} begins.", day), LogType::System, None);
            current.state.clone()
        };

        let period = self.config.tick_interval();
        let generation = ticker.generation;
        ticker.handle = Some(runtime.spawn(self.clone().run_ticker(period, generation)));
        drop(ticker);

        info!("Game loop started (tick every {:?})", period);
        self.broadcaster.broadcast(&snapshot);
        Ok(())
    }

    /// Cancels the pending tick. Returns whether a loop was running.
    pub fn stop_game_loop(&self) -> bool {
        let _delivery = self.lock_delivery();
        self.halt_ticker()
    }

    fn halt_ticker(&self) -> bool {
        let mut ticker = self.lock_ticker();
        ticker.generation += 1;
        match ticker.handle.take() {
            Some(handle) => {
                let was_running = !handle.is_finished();
                handle.abort();
                if was_running {
                    info!("Game loop stopped");
                }
                was_running
            }
            None => false,
        }
    }

    /// Stops the loop and replaces the match with a freshly dealt one.
    pub fn reset_game(&self) {
        let _delivery = self.lock_delivery();
        self.halt_ticker();

        let snapshot = {
            let mut current = self.lock_match();
            let Match { state, rng } = &mut *current;
            *state = game_service::initialize_match(&self.config.roles, rng.as_mut());
            state.clone()
        };

        info!("Game reset");
        self.broadcaster.broadcast(&snapshot);
    }

    /// Runs one tick of the phase driver and broadcasts the result.
    pub fn tick(&self) -> TickOutcome {
        let _delivery = self.lock_delivery();
        self.tick_delivering()
    }

    fn scheduled_tick(&self, generation: u64) -> TickOutcome {
        let _delivery = self.lock_delivery();
        if self.lock_ticker().generation != generation {
            debug!("Dropping tick from a stopped loop");
            return TickOutcome::Stopped;
        }
        self.tick_delivering()
    }

    fn tick_delivering(&self) -> TickOutcome {
        let (outcome, snapshot) = {
            let mut current = self.lock_match();
            let Match { state, rng } = &mut *current;
            let outcome = game_service::tick(state, rng.as_mut(), self.config.chatter_probability);
            (outcome, state.clone())
        };

        match outcome {
            TickOutcome::Stopped => {
                info!("Winner decided, stopping the game loop");
                self.halt_ticker();
                return outcome;
            }
            TickOutcome::Advanced { from, to } => {
                info!("Day {}: {} -> {}", snapshot.day, from, to);
            }
            TickOutcome::Counting => {
                debug!("{} {}s left", snapshot.phase, snapshot.time_left);
            }
        }

        self.broadcaster.broadcast(&snapshot);
        outcome
    }

    /// Records a decision from the human player and hands it to the backend.
    ///
    /// The backend always gets the decision. A vote against a player who is
    /// not alive is left out of the log and reported as `InvalidTarget`.
    pub fn send_human_action(&self, decision: AgentDecision) -> Result<(), EngineError> {
        let _delivery = self.lock_delivery();
        let (recorded, snapshot) = {
            let mut current = self.lock_match();
            let recorded = action_service::record_human_action(&mut current.state, &decision);
            (recorded, current.state.clone())
        };

        self.backend.submit_decision(&decision);
        self.broadcaster.broadcast(&snapshot);
        recorded
    }

    /// Sets the winner from outside. The loop halts on its next tick.
    pub fn declare_winner(&self, team: Team) {
        let _delivery = self.lock_delivery();
        let snapshot = {
            let mut current = self.lock_match();
            if current.state.winner.is_some() {
                return;
            }
            current.state.winner = Some(team);
            current
                .state
                .add_log(format!("Game over: {} win.", team), LogType::Alert, None);
            current.state.clone()
        };

        info!("{} declared winner", team);
        self.broadcaster.broadcast(&snapshot);
    }

    async fn run_ticker(self, period: Duration, generation: u64) {
        let mut interval = time::interval_at(Instant::now() + period, period);
        // no burst of catch-up ticks after a stall
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            if self.scheduled_tick(generation) == TickOutcome::Stopped {
                break;
            }
        }
    }

    fn lock_match(&self) -> MutexGuard<'_, Match> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_ticker(&self) -> MutexGuard<'_, Ticker> {
        self.ticker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_delivery(&self) -> MutexGuard<'_, ()> {
        self.delivery.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
