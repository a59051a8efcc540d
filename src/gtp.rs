//! Go Text Protocol (GTP) front end.
//!
//! GTP is a text-based protocol for communicating with Go programs. This
//! module drives a [`GameState`] from GTP version 2 commands, so the rule
//! engine can referee games played through a GUI such as Sabaki or GoGui.
//! The engine never chooses moves itself; there is no `genmove`.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`, `quit`
//! - `boardsize <size>` - Start a new game on a board of the given size
//! - `clear_board` - Reset the board to empty
//! - `komi <value>` - Set komi
//! - `play <color> <vertex>` - Play a move (or `pass`) for the given color
//! - `final_score` - Area score, e.g. `B+3.5`
//! - `showboard` - Print the board
//! - `captures <color>` - Stones captured by the color
//! - `legal_moves <color>` - Every legal vertex for the color
//!
//! ## Example
//!
//! ```no_run
//! use goban::config::GameConfig;
//! use goban::gtp::GtpEngine;
//!
//! let mut engine = GtpEngine::new(GameConfig::default()).unwrap();
//! engine.run(std::io::stdin().lock(), std::io::stdout()).unwrap();
//! ```

use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::board::Color;
use crate::config::{ConfigError, GameConfig};
use crate::constants::MAX_VERTEX_SIZE;
use crate::coord::{Vertex, format_vertex, parse_vertex};
use crate::game::GameState;

/// The list of known GTP commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "captures",
    "clear_board",
    "final_score",
    "known_command",
    "komi",
    "legal_moves",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "version",
];

/// GTP engine state.
pub struct GtpEngine {
    /// Settings used whenever a new game is started
    config: GameConfig,
    /// Current game
    game: GameState,
}

impl GtpEngine {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let game = GameState::new(config.clone())?;
        Ok(Self { config, game })
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    /// Run the GTP command loop until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, args);
            if !success {
                debug!(%command, %message, "gtp command failed");
            }

            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            write!(output, "{prefix}{id_str} {message}\n\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    fn parse_color(arg: &str) -> Option<Color> {
        match arg.to_lowercase().as_str() {
            "b" | "black" => Some(Color::Black),
            "w" | "white" => Some(Color::White),
            _ => None,
        }
    }

    /// Execute a GTP command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "2".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&arg.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "boardsize" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<usize>() {
                    Ok(size) if (1..=MAX_VERTEX_SIZE).contains(&size) => {
                        let config = GameConfig {
                            size,
                            ..self.config.clone()
                        };
                        match GameState::new(config.clone()) {
                            Ok(game) => {
                                self.config = config;
                                self.game = game;
                                (true, String::new())
                            }
                            Err(err) => (false, err.to_string()),
                        }
                    }
                    Ok(_) => (false, "unacceptable size".to_string()),
                    Err(_) => (false, "invalid size".to_string()),
                }
            }

            "clear_board" => {
                self.game.reset();
                (true, String::new())
            }

            "komi" => {
                let Some(arg) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match arg.parse::<f32>() {
                    Ok(komi) if komi.is_finite() => {
                        self.config.komi = komi;
                        self.game.set_komi(komi);
                        (true, String::new())
                    }
                    _ => (false, "invalid komi".to_string()),
                }
            }

            "play" => {
                let [color, vertex, ..] = args else {
                    return (false, "missing arguments".to_string());
                };
                let Some(color) = Self::parse_color(color) else {
                    return (false, "invalid color".to_string());
                };
                let vertex = match parse_vertex(vertex, self.game.board().size()) {
                    Ok(v) => v,
                    Err(err) => return (false, err.to_string()),
                };

                self.game.set_acting_color(color);
                match vertex {
                    Vertex::Pass => {
                        self.game.pass();
                        (true, String::new())
                    }
                    Vertex::Play((x, y)) => match self.game.place_stone(x, y) {
                        Ok(_) => (true, String::new()),
                        Err(err) => (false, err.to_string()),
                    },
                }
            }

            "final_score" => (true, self.game.score().to_string()),

            "showboard" => (true, format!("\n{}", self.game.board())),

            "captures" => {
                let Some(color) = args.first().and_then(|a| Self::parse_color(a)) else {
                    return (false, "invalid color".to_string());
                };
                (true, self.game.captures(color).to_string())
            }

            "legal_moves" => {
                let Some(color) = args.first().and_then(|a| Self::parse_color(a)) else {
                    return (false, "invalid color".to_string());
                };
                let size = self.game.board().size();
                let moves: Vec<String> = self
                    .game
                    .board()
                    .legal_moves(color)
                    .into_iter()
                    .map(|pt| format_vertex(pt, size))
                    .collect();
                (true, moves.join(" "))
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }
}
