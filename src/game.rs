//! Game flow on top of a [`Board`]: turn order, the move record, capture
//! tallies, pass handling and scoring.
//!
//! The acting color alternates on every placement and pass. A controller
//! replaying an external record may override it with
//! [`GameState::set_acting_color`]; nothing else changes it.

use std::cell::OnceCell;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::board::{Board, Captures, Color, MoveError, MoveResult, Point};
use crate::config::{ConfigError, GameConfig};
use crate::constants::PASSES_TO_END;
use crate::territory::{Evaluation, Ownership, Score, TerritoryEvaluator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveKind {
    Place(Point),
    Pass,
}

/// One entry of the move record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// Position in the record, starting at 0.
    pub index: usize,
    pub color: Color,
    pub kind: MoveKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    InProgress,
    Over,
}

/// A move supplied by an external record: a point, or `None` for a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedMove {
    pub color: Color,
    pub point: Option<Point>,
}

impl RecordedMove {
    pub fn play(color: Color, x: usize, y: usize) -> Self {
        Self {
            color,
            point: Some((x, y)),
        }
    }

    pub fn pass(color: Color) -> Self {
        Self { color, point: None }
    }
}

/// Why [`GameState::place_stone`] refused a move.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error(transparent)]
    Move(#[from] MoveError),
    #[error("illegal move: game is over")]
    GameOver,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("recorded move {index} ({color}) rejected: {source}")]
pub struct ReplayError {
    pub index: usize,
    pub color: Color,
    #[source]
    pub source: GameError,
}

/// A single game in progress.
#[derive(Debug, Clone)]
pub struct GameState {
    config: GameConfig,
    board: Board,
    current: Color,
    moves: Vec<Move>,
    captures: Captures,
    passes: u32,
    /// Dropped on every accepted placement.
    evaluation: OnceCell<Evaluation>,
}

impl GameState {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = Board::with_ko_window(config.size, config.ko_window)?;
        Ok(Self {
            config,
            board,
            current: Color::Black,
            moves: Vec::new(),
            captures: Captures::default(),
            passes: 0,
            evaluation: OnceCell::new(),
        })
    }

    /// Default rules on a board of the given size.
    pub fn with_size(size: usize) -> Result<Self, ConfigError> {
        Self::new(GameConfig::with_size(size))
    }

    /// Play the current color at `(x, y)`.
    ///
    /// On rejection nothing changes. On success the move is recorded, the
    /// mover's capture tally grows by the stones removed, the pass streak is
    /// reset and the turn passes to the opponent.
    pub fn place_stone(&mut self, x: usize, y: usize) -> Result<MoveResult, GameError> {
        if self.is_game_over() {
            return Err(GameError::GameOver);
        }
        let color = self.current;
        let opp = color.opponent();
        let before = self.board.stone_count(opp);
        let result = self.board.place(x, y, color)?;
        let captured = before - self.board.stone_count(opp);
        debug_assert_eq!(captured, result.captures);

        self.moves.push(Move {
            index: self.moves.len(),
            color,
            kind: MoveKind::Place((x, y)),
        });
        self.captures.add(color, captured);
        self.passes = 0;
        self.evaluation = OnceCell::new();
        self.current = opp;
        Ok(result)
    }

    /// Pass the turn. Returns whether the game is now over.
    ///
    /// Once the game is over a pass is ignored: it is not recorded and the
    /// acting color stays put. The board, including any ko point, is never
    /// touched; a ko binds only the capturer's opponent.
    pub fn pass(&mut self) -> bool {
        if self.is_game_over() {
            return true;
        }
        self.passes += 1;
        self.moves.push(Move {
            index: self.moves.len(),
            color: self.current,
            kind: MoveKind::Pass,
        });
        debug!(color = %self.current, streak = self.passes, "pass");
        self.current = self.current.opponent();

        let over = self.is_game_over();
        if over {
            info!(moves = self.moves.len(), "game over after consecutive passes");
        }
        over
    }

    pub fn is_game_over(&self) -> bool {
        self.passes >= PASSES_TO_END
    }

    pub fn phase(&self) -> Phase {
        if self.is_game_over() {
            Phase::Over
        } else {
            Phase::InProgress
        }
    }

    /// Make `color` the next to act, for replaying externally authored
    /// records that do not strictly alternate.
    pub fn set_acting_color(&mut self, color: Color) {
        if color != self.current {
            debug!(%color, "acting color overridden");
        }
        self.current = color;
    }

    /// Apply a record in order, setting the acting color before each move.
    /// Stops at the first rejected move.
    pub fn replay(&mut self, record: &[RecordedMove]) -> Result<(), ReplayError> {
        for (index, mv) in record.iter().enumerate() {
            self.set_acting_color(mv.color);
            match mv.point {
                Some((x, y)) => {
                    self.place_stone(x, y).map_err(|source| ReplayError {
                        index,
                        color: mv.color,
                        source,
                    })?;
                }
                None => {
                    self.pass();
                }
            }
        }
        Ok(())
    }

    /// Start over on an empty board with the same configuration.
    pub fn reset(&mut self) {
        self.board.clear();
        self.current = Color::Black;
        self.moves.clear();
        self.captures = Captures::default();
        self.passes = 0;
        self.evaluation = OnceCell::new();
    }

    /// Territory evaluation of the current position, computed on first use.
    pub fn evaluation(&self) -> &Evaluation {
        self.evaluation.get_or_init(|| {
            TerritoryEvaluator::new(&self.board)
                .smoothing(self.config.smoothing)
                .passes(self.config.passes())
                .evaluate()
        })
    }

    /// Area score: stones on the board plus territory, komi to White.
    pub fn score(&self) -> Score {
        self.evaluation().area_score(self.config.komi)
    }

    pub fn ownership(&self) -> Ownership {
        self.evaluation().ownership()
    }

    pub fn territory_map(&self) -> &[f64] {
        self.evaluation().territory_map()
    }

    pub fn influence_map(&self) -> &[f64] {
        self.evaluation().influence_map()
    }

    /// Legal points for the color to move.
    pub fn legal_moves(&self) -> Vec<Point> {
        self.board.legal_moves(self.current)
    }

    pub fn current_player(&self) -> Color {
        self.current
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Stones captured so far by `color`.
    pub fn captures(&self, color: Color) -> usize {
        self.captures.get(color)
    }

    pub fn capture_tally(&self) -> Captures {
        self.captures
    }

    pub fn pass_count(&self) -> u32 {
        self.passes
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn komi(&self) -> f32 {
        self.config.komi
    }

    /// Change the komi. Only the score depends on it.
    pub fn set_komi(&mut self, komi: f32) {
        self.config.komi = komi;
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}
