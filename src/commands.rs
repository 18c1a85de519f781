//! Headless command handlers.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use blockfall::core::{DemoLog, GameConfig, GameEngine, RankingTable, VirtualClock};
use blockfall::engine::{AutoPlayer, DemoPlayer};

const FRAME: Duration = Duration::from_millis(16);

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize report")?;
    println!("{text}");
    Ok(())
}

pub fn record(config: &GameConfig, pieces: u32, player_seed: u32) -> Result<()> {
    let clock = VirtualClock::new(0);
    let mut engine =
        GameEngine::from_config(config, clock.clone()).context("failed to create game")?;

    let report = AutoPlayer::new(player_seed).play(&mut engine, &clock, pieces);
    let stats = engine.stats().clone();
    let elapsed_ms = engine.elapsed_ms();

    let written = engine
        .finish(&config.demo_path)
        .with_context(|| format!("failed to write {}", config.demo_path.display()))?;

    print_json(&json!({
        "demo": config.demo_path,
        "bytes": written,
        "randomizer": config.randomizer,
        "seed": config.seed,
        "player_seed": player_seed,
        "pieces": report.pieces,
        "game_over": report.game_over,
        "score": stats.score,
        "rows": stats.rows,
        "level": stats.level,
        "elapsed_ms": elapsed_ms,
    }))
}

fn load_demo(path: &Path) -> Result<DemoLog> {
    DemoLog::load(path).with_context(|| format!("failed to load demo {}", path.display()))
}

pub fn replay(config: &GameConfig, path: &Path, speed: Option<f64>) -> Result<()> {
    let demo = load_demo(path)?;
    let mut player = DemoPlayer::from_config(&demo, config).context("failed to create game")?;

    match speed {
        None => {
            player.run_to_end();
        }
        Some(speed) => {
            player.set_time_scale(speed);
            if player.time_scale() == 0.0 {
                bail!("a speed of {speed} would never finish");
            }
            let mut last = Instant::now();
            let mut last_report = Instant::now();
            while !player.is_finished() {
                thread::sleep(FRAME);
                let now = Instant::now();
                player.advance(now.duration_since(last).as_secs_f64() * 1000.0);
                last = now;
                if last_report.elapsed() >= Duration::from_secs(1) {
                    info!("{}", player.status_line());
                    last_report = now;
                }
            }
        }
    }

    info!("{}", player.status_line());
    print_json(&json!({
        "demo": path,
        "status": player.status_line(),
        "skipped": player.skipped(),
        "snapshot": player.engine().snapshot(),
    }))
}

pub fn verify(config: &GameConfig, path: &Path) -> Result<()> {
    let demo = load_demo(path)?;
    let mut player = DemoPlayer::from_config(&demo, config).context("failed to create game")?;
    player.run_to_end();

    let engine = player.into_engine();
    let stats = engine.stats().clone();
    let rerecorded = engine.into_demo();
    let reproduced = rerecorded == demo;

    print_json(&json!({
        "demo": path,
        "pieces": demo.piece_count(),
        "instructions": demo.instruction_count(),
        "reproduced": reproduced,
        "score": stats.score,
        "rows": stats.rows,
        "level": stats.level,
        "game_over": stats.ended,
    }))?;

    if !reproduced {
        bail!(
            "replay diverged: recorded {} instructions / {} pieces, replay produced {} / {}",
            demo.instruction_count(),
            demo.piece_count(),
            rerecorded.instruction_count(),
            rerecorded.piece_count()
        );
    }
    Ok(())
}

pub fn scores(config: &GameConfig) -> Result<()> {
    let table = RankingTable::load_or_default(&config.ranking_path, config.ranking_len)
        .with_context(|| format!("failed to read {}", config.ranking_path.display()))?;
    print_json(&table)
}
