use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::time::sleep;

use werewolf_sim::{
    models::{
        config::SimulationConfig,
        game::{GameState, Phase},
        log_entry::LogType,
        role::Team,
    },
    utils::test_setup::{recording_listener, seeded_engine, setup_test_env},
    GameEngine,
};

const INIT_LOG: &str = "Game Initialized. Day 1 begins.";

fn init_log_count(engine: &GameEngine) -> usize {
    engine
        .get_state()
        .logs
        .iter()
        .filter(|l| l.content == INIT_LOG)
        .count()
}

#[tokio::test(start_paused = true)]
async fn test_thirty_seconds_reach_discussion() {
    let engine = seeded_engine(100);
    engine.start_game_loop().unwrap();

    sleep(Duration::from_millis(30_500)).await;

    let state = engine.get_state();
    assert_eq!(state.phase, Phase::DayDiscuss);
    assert_eq!(state.time_left, 30);
    assert_eq!(state.day, 1);
    engine.stop_game_loop();
}

#[tokio::test(start_paused = true)]
async fn test_start_is_idempotent() {
    let engine = seeded_engine(101);
    let (listener, seen) = recording_listener();
    engine.subscribe(listener);

    engine.start_game_loop().unwrap();
    engine.start_game_loop().unwrap();
    assert!(engine.is_running());
    assert_eq!(init_log_count(&engine), 1);

    sleep(Duration::from_millis(10_500)).await;

    // a doubled ticker would have burned 20 seconds off the clock
    assert_eq!(engine.get_state().time_left, 20);
    // one broadcast for the start, one per tick
    assert_eq!(seen.lock().unwrap().len(), 11);
    engine.stop_game_loop();
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_ticks() {
    let engine = seeded_engine(102);
    engine.start_game_loop().unwrap();
    sleep(Duration::from_millis(3_500)).await;

    assert!(engine.stop_game_loop());
    assert!(!engine.is_running());
    let frozen = engine.get_state();

    sleep(Duration::from_secs(10)).await;
    assert_eq!(engine.get_state(), frozen);
    assert_eq!(frozen.time_left, 27);
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_stop_logs_again() {
    let engine = seeded_engine(103);
    engine.start_game_loop().unwrap();
    sleep(Duration::from_millis(1_500)).await;
    engine.stop_game_loop();

    engine.start_game_loop().unwrap();
    assert_eq!(init_log_count(&engine), 2);
    sleep(Duration::from_millis(1_200)).await;
    assert_eq!(engine.get_state().time_left, 28);
    engine.stop_game_loop();
}

#[tokio::test(start_paused = true)]
async fn test_reset_stops_loop() {
    let engine = seeded_engine(104);
    engine.start_game_loop().unwrap();
    sleep(Duration::from_millis(90_500)).await;
    assert!(engine.get_state().day >= 2);

    engine.reset_game();
    assert!(!engine.is_running());

    sleep(Duration::from_secs(5)).await;
    let state = engine.get_state();
    assert_eq!(state.day, 1);
    assert_eq!(state.time_left, 30);
    assert!(state.logs.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_winner_ends_loop() {
    let engine = seeded_engine(105);
    engine.start_game_loop().unwrap();
    sleep(Duration::from_millis(2_500)).await;

    engine.declare_winner(Team::Werewolves);
    sleep(Duration::from_millis(1_000)).await;
    assert!(!engine.is_running());

    let state = engine.get_state();
    assert_eq!(state.time_left, 28);
    assert_eq!(state.logs_by_type(LogType::Alert).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_channel_subscriber_follows_ticks() {
    let engine = seeded_engine(106);
    let mut rx = engine.subscribe_channel();
    engine.start_game_loop().unwrap();

    let started = rx.recv().await.unwrap();
    assert_eq!(started.logs.len(), 1);

    let first_tick = rx.recv().await.unwrap();
    assert_eq!(first_tick.time_left, 29);
    engine.stop_game_loop();
}

#[tokio::test(start_paused = true)]
async fn test_custom_tick_interval() {
    setup_test_env();
    let config = SimulationConfig {
        tick_interval_ms: 100,
        rng_seed: Some(7),
        ..SimulationConfig::default()
    };
    let engine = GameEngine::new(config).unwrap();
    engine.start_game_loop().unwrap();

    sleep(Duration::from_millis(1_050)).await;
    assert_eq!(engine.get_state().time_left, 20);
    engine.stop_game_loop();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reset_during_slow_delivery_ends_on_fresh_state() {
    setup_test_env();
    let config = SimulationConfig {
        tick_interval_ms: 50,
        rng_seed: Some(8),
        ..SimulationConfig::default()
    };
    let engine = GameEngine::new(config).unwrap();

    // stalls on tick snapshots so the reset lands mid-delivery
    engine.subscribe(Arc::new(|state: GameState| {
        if state.time_left < 30 {
            thread::sleep(Duration::from_millis(300));
        }
    }));
    let (recorder, seen) = recording_listener();
    engine.subscribe(recorder);

    engine.start_game_loop().unwrap();
    sleep(Duration::from_millis(120)).await;

    let resetter = engine.clone();
    tokio::task::spawn_blocking(move || resetter.reset_game())
        .await
        .unwrap();
    sleep(Duration::from_millis(400)).await;

    assert!(!engine.is_running());
    let live = engine.get_state();
    assert_eq!(live.time_left, 30);
    assert!(live.logs.is_empty());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.last(), Some(&live));
    assert!(seen.iter().any(|s| s.time_left == 29));
}
