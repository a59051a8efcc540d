//! Goban: a Go rule engine with territory estimation.
//!
//! This crate enforces the rules of Go for an externally supplied sequence of
//! moves and scores the resulting position. It does not choose moves.
//!
//! ## Modules
//!
//! - [`constants`] - Default rules and territory tuning values
//! - [`config`] - Runtime game configuration
//! - [`board`] - Grid, groups, captures, ko and superko
//! - [`game`] - Turn order, move record, captures, passes and scoring
//! - [`territory`] - Influence-diffusion territory estimate
//! - [`coord`] - Text coordinates (`D4`, `pass`)
//! - [`gtp`] - Go Text Protocol front end
//!
//! ## Example
//!
//! ```
//! use goban::game::GameState;
//!
//! let mut game = GameState::with_size(9).unwrap();
//! game.place_stone(4, 4).unwrap();
//! game.pass();
//! game.pass();
//!
//! assert!(game.is_game_over());
//! let score = game.score();
//! assert_eq!(score.black, 81.0);
//! assert_eq!(score.white, 6.5);
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod coord;
pub mod game;
pub mod gtp;
pub mod territory;

pub use board::{Board, Captures, Cell, Color, MoveError, MoveResult, Point};
pub use config::GameConfig;
pub use game::{GameError, GameState};
pub use territory::{Ownership, Score, TerritoryEvaluator};
