//! Blockfall command line.
//!
//! - `play`: interactive game in the terminal
//! - `record`: let the scripted player record a demo
//! - `replay`: play a demo back and report the final state
//! - `verify`: check a demo file and that replaying it reproduces itself
//! - `scores`: print the ranking table
//! - `config`: print the effective configuration
//!
//! Every command starts from [`GameConfig::from_env`] and applies its flags
//! on top. Reports are printed to stdout as JSON; logs go to stderr.

mod commands;
mod play;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use blockfall::core::GameConfig;
use blockfall::types::RandomizerKind;

#[derive(Debug, Parser)]
#[command(name = "blockfall", version, about = "Falling-block puzzle with demo record and replay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Play in the terminal
    Play {
        #[command(flatten)]
        game: GameArgs,
        /// Name stored in the ranking
        #[arg(long, default_value = "player")]
        name: String,
    },
    /// Record a demo with the scripted player
    Record {
        #[command(flatten)]
        game: GameArgs,
        /// Stop after this many pieces have locked
        #[arg(long, default_value_t = 500)]
        pieces: u32,
        /// Seed for the scripted player (defaults to the game seed)
        #[arg(long)]
        player_seed: Option<u32>,
    },
    /// Replay a demo file
    Replay {
        path: PathBuf,
        #[command(flatten)]
        game: GameArgs,
        /// Playback speed; omit to replay instantly
        #[arg(long)]
        speed: Option<f64>,
    },
    /// Validate a demo file and check that it replays to itself
    Verify {
        path: PathBuf,
        #[command(flatten)]
        game: GameArgs,
    },
    /// Show the ranking table
    Scores {
        #[command(flatten)]
        game: GameArgs,
    },
    /// Show the effective configuration
    Config {
        #[command(flatten)]
        game: GameArgs,
    },
}

/// Flags shared by every command, layered over the environment
#[derive(Debug, Clone, Default, Args)]
struct GameArgs {
    #[arg(long)]
    width: Option<u32>,
    /// Visible rows
    #[arg(long)]
    height: Option<u32>,
    /// 7bag, tgm or random
    #[arg(long)]
    randomizer: Option<RandomizerKind>,
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long)]
    demo: Option<PathBuf>,
    #[arg(long)]
    ranking: Option<PathBuf>,
}

impl GameArgs {
    fn resolve(&self) -> GameConfig {
        let mut config = GameConfig::from_env();
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.visible_height = height;
        }
        if let Some(kind) = self.randomizer {
            config.randomizer = kind;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(demo) = &self.demo {
            config.demo_path = demo.clone();
        }
        if let Some(ranking) = &self.ranking {
            config.ranking_path = ranking.clone();
        }
        config
    }
}

fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play { game, name } => {
            // Log lines would tear the playfield; opt in with RUST_LOG.
            init_logging("off");
            play::run(&game.resolve(), &name)
        }
        Commands::Record {
            game,
            pieces,
            player_seed,
        } => {
            init_logging("info");
            let config = game.resolve();
            let player_seed = player_seed.unwrap_or(config.seed);
            commands::record(&config, pieces, player_seed)
        }
        Commands::Replay { path, game, speed } => {
            init_logging("info");
            commands::replay(&game.resolve(), &path, speed)
        }
        Commands::Verify { path, game } => {
            init_logging("info");
            commands::verify(&game.resolve(), &path)
        }
        Commands::Scores { game } => {
            init_logging("warn");
            commands::scores(&game.resolve())
        }
        Commands::Config { game } => {
            init_logging("warn");
            commands::print_json(&game.resolve())
        }
    }
}
