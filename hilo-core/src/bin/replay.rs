// hilo replay
// Feeds a recorded draw history through the engine, or watches a live JSON file.
//
//   replay <history.json>          chronological draws, oldest first
//   replay --watch <window.json>   newest-first window, re-read every poll interval
//   replay --strategies            lists the strategies in the defensive vote

use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use hilo_common::Observation;
use hilo_core::config::Settings;
use hilo_core::service::{JsonFileSource, Poller};
use hilo_core::strategy;
use hilo_core::{PredictionEngine, Submission};
use std::{env, sync::Arc, time::Duration};
use tokio::sync::{broadcast, Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str =
    "usage: replay <history.json> | replay --watch <window.json> | replay --strategies";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::new().context("failed to load configuration")?;
    let args: Vec<String> = env::args().skip(1).collect();

    match args.as_slice() {
        [flag] if flag == "--strategies" => {
            list_strategies();
            Ok(())
        }
        [flag, path] if flag == "--watch" => watch(&settings, path).await,
        [path] => replay(&settings, path).await,
        [] => match settings.poller.source_path.clone() {
            Some(path) => watch(&settings, &path).await,
            None => bail!(USAGE),
        },
        _ => bail!(USAGE),
    }
}

fn list_strategies() {
    for info in strategy::list_strategies() {
        println!("{:<16} {:<26} {}", info.id, info.name, info.description);
    }
}

async fn replay(settings: &Settings, path: &str) -> Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read {}", path))?;
    let draws: Vec<Observation> =
        serde_json::from_slice(&bytes).with_context(|| format!("invalid draw file {}", path))?;
    info!(draws = draws.len(), "replaying history");

    let mut engine = PredictionEngine::new(settings.engine.clone())?;
    let depth = settings.engine.pattern_window;
    for end in 1..=draws.len() {
        let window: Vec<Observation> = draws[..end].iter().rev().take(depth).cloned().collect();
        if let Submission::Issued(outcome) = engine.submit(&window)? {
            println!(
                "{:>8} -> {:<4} ({}) via {:?}/{:?}",
                outcome.issued_period_id.as_deref().unwrap_or("?"),
                outcome.predicted,
                outcome.synthetic_sample,
                outcome.regime,
                outcome.rule
            );
        }
    }

    println!("{}", serde_json::to_string_pretty(&engine.statistics())?);
    Ok(())
}

async fn watch(settings: &Settings, path: &str) -> Result<()> {
    let engine = Arc::new(Mutex::new(PredictionEngine::new(settings.engine.clone())?));
    let poller = Arc::new(Poller::new(
        JsonFileSource::new(path),
        Arc::clone(&engine),
        Duration::from_secs(settings.poller.refresh_interval_secs),
    ));

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let runner = Arc::clone(&poller);
    let handle = tokio::spawn(async move { runner.start(shutdown_rx).await });

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    let _ = shutdown_tx.send(());
    handle.await??;

    let stats = engine.lock().await.statistics();
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
