use anyhow::Context;
use dotenvy::dotenv;
use env_logger::Builder;
use log::{warn, LevelFilter};
use std::io::{self, BufRead};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use werewolf_sim::{
    models::{config::SimulationConfig, decision::AgentDecision, game::GameState},
    services::broadcaster::Listener,
    GameEngine,
};

fn init_logger() {
    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Info)
        .filter_module("werewolf_sim", LevelFilter::Info)
        .format_timestamp(Some(env_logger::TimestampPrecision::Millis))
        .format_target(true)
        .parse_default_env()
        .init();
}

/// Prints each log entry once, as it shows up in a snapshot.
fn console_printer(print_snapshots: bool) -> Listener {
    let printed = Mutex::new(0usize);
    Arc::new(move |state: GameState| {
        let mut printed = printed.lock().unwrap_or_else(PoisonError::into_inner);
        // a reset starts the log over
        if state.logs.len() < *printed {
            *printed = 0;
        }
        for entry in &state.logs[*printed..] {
            let speaker = entry
                .speaker_id
                .and_then(|id| state.player(id))
                .map(|p| format!("{}: ", p.name))
                .unwrap_or_default();
            println!(
                "[Day {} {}] {:?} {}{}",
                entry.day, entry.phase, entry.log_type, speaker, entry.content
            );
        }
        *printed = state.logs.len();
        drop(printed);

        if print_snapshots {
            match serde_json::to_string(&state) {
                Ok(json) => println!("{}", json),
                Err(e) => warn!("Failed to serialize snapshot: {}", e),
            }
        }
    })
}

/// Console lines become human decisions. Runs on a plain thread so a pending
/// read never holds up shutdown.
fn read_human_input(engine: GameEngine) {
    for line in io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        let Some(decision) = AgentDecision::from_command(&line) else {
            continue;
        };
        if let Err(e) = engine.send_human_action(decision) {
            warn!("Action rejected: {}", e);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenv() {
        eprintln!("Warning: failed to load .env file: {}", e);
    }

    init_logger();

    let config = SimulationConfig::from_env().context("invalid simulation config")?;
    let run_seconds = config.run_seconds;
    let print_snapshots = config.print_snapshots;
    let engine = GameEngine::new(config)?;

    let subscription = engine.subscribe(console_printer(print_snapshots));
    engine.start_game_loop()?;

    let input_engine = engine.clone();
    thread::spawn(move || read_human_input(input_engine));

    if run_seconds > 0 {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = tokio::time::sleep(Duration::from_secs(run_seconds)) => {}
        }
    } else {
        tokio::signal::ctrl_c().await.context("failed to listen for ctrl-c")?;
    }

    engine.stop_game_loop();
    subscription.unsubscribe();
    Ok(())
}
