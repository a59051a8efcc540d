//! Goban: a Go rule engine with territory estimation.
//!
//! ## Usage
//!
//! - `goban` - Play a short random demo game on 9x9
//! - `goban gtp` - Start a GTP server for GUI integration
//! - `goban demo --seed 7 --json` - Reproducible demo with JSON output

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{Level, info, warn};

use goban::board::Captures;
use goban::config::GameConfig;
use goban::game::GameState;
use goban::gtp::GtpEngine;
use goban::territory::{Ownership, Score};

/// Goban: a Go rule engine with territory estimation
#[derive(Parser)]
#[command(name = "goban")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the GTP (Go Text Protocol) server for use with GUI applications
    Gtp {
        #[command(flatten)]
        game: GameArgs,
    },
    /// Play random legal moves and show the resulting score
    Demo {
        #[command(flatten)]
        game: GameArgs,
        /// Maximum number of moves to play
        #[arg(long, default_value_t = 60)]
        moves: usize,
        /// Seed for the move picker
        #[arg(long)]
        seed: Option<u64>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Default)]
struct GameArgs {
    /// Board size (NxN)
    #[arg(long)]
    size: Option<usize>,
    /// Komi awarded to White
    #[arg(long)]
    komi: Option<f32>,
    /// JSON file with game settings; flags override it
    #[arg(long)]
    config: Option<PathBuf>,
}

impl GameArgs {
    fn resolve(&self, default_size: usize) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_json_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => GameConfig::with_size(default_size),
        };
        if let Some(size) = self.size {
            config.size = size;
        }
        if let Some(komi) = self.komi {
            config.komi = komi;
        }
        config.validate().context("invalid game settings")?;
        Ok(config)
    }
}

#[derive(Serialize)]
struct DemoReport {
    size: usize,
    moves: usize,
    board: Vec<String>,
    captures: Captures,
    ownership: Ownership,
    score: Score,
    result: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Gtp { game }) => {
            let config = game.resolve(GameConfig::default().size)?;
            info!(size = config.size, komi = config.komi, "starting GTP server");
            let mut engine = GtpEngine::new(config)?;
            engine
                .run(io::stdin().lock(), io::stdout().lock())
                .context("GTP session failed")?;
        }
        Some(Commands::Demo {
            game,
            moves,
            seed,
            json,
        }) => run_demo(&game, moves, seed, json)?,
        None => run_demo(&GameArgs::default(), 60, None, false)?,
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    // Logs go to stderr; stdout carries GTP responses.
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_demo(args: &GameArgs, max_moves: usize, seed: Option<u64>, json: bool) -> Result<()> {
    let config = args.resolve(9)?;
    let mut game = GameState::new(config)?;
    let mut rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);

    for _ in 0..max_moves {
        let legal = game.legal_moves();
        if legal.is_empty() {
            if game.pass() {
                break;
            }
            continue;
        }
        let (x, y) = legal[rng.usize(..legal.len())];
        if let Err(err) = game.place_stone(x, y) {
            warn!(x, y, error = %err, "demo move rejected");
            game.pass();
        }
    }

    let score = game.score();
    let report = DemoReport {
        size: game.board().size(),
        moves: game.moves().len(),
        board: game.board().to_string().lines().map(str::to_string).collect(),
        captures: game.capture_tally(),
        ownership: game.ownership(),
        score,
        result: score.to_string(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Goban: Go rule engine demo\n");
    println!("{}", game.board());
    println!("Moves played: {}", report.moves);
    println!(
        "Captures: Black {}, White {}",
        report.captures.black, report.captures.white
    );
    println!(
        "Territory: Black {}, White {}, neutral {}",
        report.ownership.black, report.ownership.white, report.ownership.neutral
    );
    println!(
        "Score: Black {:.1}, White {:.1} ({})",
        score.black, score.white, report.result
    );
    Ok(())
}
