//! Board representation, stone groups, captures and the ko rules.
//!
//! The grid is a flat `Vec<Cell>` addressed by `y * size + x`. Groups are
//! found with an explicit-stack flood fill, so even large boards never recurse.
//!
//! Repetition is guarded twice:
//! - a single forbidden point catches the classic one-stone ko immediately,
//! - a short [`KoHistory`] of earlier grids rejects any move that would
//!   recreate one of them (positional superko over a bounded window).

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::constants::KO_WINDOW;

/// Stone color. Black moves first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// The other color.
    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "Black"),
            Color::White => write!(f, "White"),
        }
    }
}

/// State of a single intersection.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Empty,
    Black,
    White,
}

impl Cell {
    pub fn color(self) -> Option<Color> {
        match self {
            Cell::Empty => None,
            Cell::Black => Some(Color::Black),
            Cell::White => Some(Color::White),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

impl From<Color> for Cell {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => Cell::Black,
            Color::White => Cell::White,
        }
    }
}

/// A board coordinate `(x, y)`: `x` is the column, `y` the row, both 0-based
/// from the top-left corner.
pub type Point = (usize, usize);

/// Reason a placement was refused. None of these are fatal; the board is left
/// exactly as it was.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("illegal move: point is off the board")]
    OutOfBounds,
    #[error("illegal move: point not empty")]
    Occupied,
    #[error("illegal move: retakes ko")]
    KoForbiddenPoint,
    #[error("illegal move: suicide")]
    Suicide,
    #[error("illegal move: repeats a recent position")]
    SuperkoRepetition,
}

/// Errors raised while constructing a board.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("board size must be positive")]
    InvalidSize,
    #[error("row {row} has {len} points, expected {expected}")]
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[error("unknown cell {ch:?} in row {row}")]
    UnknownCell { ch: char, row: usize },
}

/// Outcome of an accepted placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveResult {
    /// Number of opponent stones removed.
    pub captures: usize,
    /// Point the opponent may not play on the next move, if the capture
    /// formed a single-stone ko.
    pub ko: Option<Point>,
}

/// Stones captured by each color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Captures {
    pub black: usize,
    pub white: usize,
}

impl Captures {
    pub fn get(&self, color: Color) -> usize {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }

    pub fn add(&mut self, color: Color, n: usize) {
        match color {
            Color::Black => self.black += n,
            Color::White => self.white += n,
        }
    }
}

/// Bounded FIFO of earlier grids used for the positional superko check.
///
/// A push only happens when a placement is accepted; once `capacity` grids
/// are held, the oldest one is evicted first.
#[derive(Clone, Debug)]
pub struct KoHistory {
    grids: VecDeque<Vec<Cell>>,
    capacity: usize,
}

impl KoHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            grids: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, grid: Vec<Cell>) {
        if self.capacity == 0 {
            return;
        }
        if self.grids.len() == self.capacity {
            self.grids.pop_front();
        }
        self.grids.push_back(grid);
    }

    pub fn contains(&self, grid: &[Cell]) -> bool {
        self.grids.iter().any(|g| g.as_slice() == grid)
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.grids.clear();
    }
}

/// An N×N Go board with its ko bookkeeping.
#[derive(Clone, Debug)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
    history: KoHistory,
    /// Ko point and the color it binds.
    forbidden: Option<(Point, Color)>,
}

impl Board {
    /// Create an empty board with the default superko window.
    pub fn new(size: usize) -> Result<Self, BoardError> {
        Self::with_ko_window(size, KO_WINDOW)
    }

    /// Create an empty board remembering `window` earlier positions.
    pub fn with_ko_window(size: usize, window: usize) -> Result<Self, BoardError> {
        if size == 0 {
            return Err(BoardError::InvalidSize);
        }
        Ok(Self {
            size,
            cells: vec![Cell::Empty; size * size],
            history: KoHistory::new(window),
            forbidden: None,
        })
    }

    /// Build a position from text rows, top row first.
    ///
    /// `X` is Black, `O` is White, `.` or `+` is empty; whitespace is ignored,
    /// so the output of `Display` reads back unchanged. The position is set
    /// up directly and does not enter the ko history.
    pub fn from_rows(rows: &[&str]) -> Result<Self, BoardError> {
        let mut board = Self::new(rows.len())?;
        let size = board.size;
        for (y, row) in rows.iter().enumerate() {
            let row: Vec<char> = row.chars().filter(|c| !c.is_whitespace()).collect();
            if row.len() != size {
                return Err(BoardError::RaggedRow {
                    row: y,
                    len: row.len(),
                    expected: size,
                });
            }
            for (x, ch) in row.into_iter().enumerate() {
                board.cells[y * size + x] = match ch {
                    'X' => Cell::Black,
                    'O' => Cell::White,
                    '.' | '+' => Cell::Empty,
                    _ => return Err(BoardError::UnknownCell { ch, row: y }),
                };
            }
        }
        Ok(board)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn idx(&self, (x, y): Point) -> usize {
        y * self.size + x
    }

    /// The cell at `(x, y)`, or `None` when the point is off the board.
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        if x >= self.size || y >= self.size {
            return None;
        }
        Some(self.cells[self.idx((x, y))])
    }

    /// Raw grid in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Point the capturer's opponent may not play on (simple ko).
    pub fn forbidden_point(&self) -> Option<Point> {
        self.forbidden.map(|(pt, _)| pt)
    }

    /// Whether `color` is barred from `pt` by the current ko.
    pub fn is_forbidden(&self, pt: Point, color: Color) -> bool {
        self.forbidden == Some((pt, color))
    }

    pub fn history(&self) -> &KoHistory {
        &self.history
    }

    /// All points in row-major order.
    pub fn points(&self) -> impl Iterator<Item = Point> {
        let size = self.size;
        (0..size).flat_map(move |y| (0..size).map(move |x| (x, y)))
    }

    pub fn stone_count(&self, color: Color) -> usize {
        let cell = Cell::from(color);
        self.cells.iter().filter(|&&c| c == cell).count()
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_empty()).count()
    }

    /// The maximal same-colored group containing `(x, y)`. Empty for an empty
    /// or off-board point.
    pub fn find_group(&self, x: usize, y: usize) -> Vec<Point> {
        match self.get(x, y) {
            Some(cell) if !cell.is_empty() => self.view().group((x, y)),
            _ => Vec::new(),
        }
    }

    /// Whether any stone of `group` touches an empty point.
    pub fn has_liberties(&self, group: &[Point]) -> bool {
        self.view().has_liberties(group)
    }

    /// Number of distinct liberties of the group containing `(x, y)`.
    pub fn liberties(&self, x: usize, y: usize) -> usize {
        let group = self.find_group(x, y);
        self.view().liberty_count(&group)
    }

    fn view(&self) -> GridView<'_> {
        GridView {
            size: self.size,
            cells: &self.cells,
        }
    }

    /// Place a stone of `color` at `(x, y)`.
    ///
    /// Captures opponent groups left without liberties, then rejects suicide
    /// and repetition of any grid still held in the ko history. The board,
    /// the history and the forbidden point only change when the move is
    /// accepted.
    pub fn place(&mut self, x: usize, y: usize, color: Color) -> Result<MoveResult, MoveError> {
        let (next, result) = self.resolve((x, y), color).inspect_err(|err| {
            debug!(x, y, %color, error = %err, "move rejected");
        })?;

        self.history.push(next.clone());
        self.cells = next;
        self.forbidden = result.ko.map(|pt| (pt, color.opponent()));
        if let Some((kx, ky)) = result.ko {
            debug!(kx, ky, bound = %color.opponent(), "ko point set");
        }
        Ok(result)
    }

    /// Work out the grid that playing `pt` would produce, without touching
    /// `self`.
    fn resolve(&self, pt: Point, color: Color) -> Result<(Vec<Cell>, MoveResult), MoveError> {
        let (x, y) = pt;
        if x >= self.size || y >= self.size {
            return Err(MoveError::OutOfBounds);
        }
        let idx = self.idx(pt);
        if !self.cells[idx].is_empty() {
            return Err(MoveError::Occupied);
        }
        if self.is_forbidden(pt, color) {
            return Err(MoveError::KoForbiddenPoint);
        }

        let opp = Cell::from(color.opponent());
        // Playing into an opponent's eye is what makes a single capture a ko.
        let in_enemy_eye = neighbors(self.size, pt).all(|n| self.cells[self.idx(n)] == opp);

        let mut next = self.cells.clone();
        next[idx] = color.into();

        let mut captured: Vec<Point> = Vec::new();
        for n in neighbors(self.size, pt) {
            if next[self.idx(n)] != opp {
                continue;
            }
            let view = GridView {
                size: self.size,
                cells: &next,
            };
            let group = view.group(n);
            if !view.has_liberties(&group) {
                for &p in &group {
                    next[self.idx(p)] = Cell::Empty;
                }
                captured.extend(group);
            }
        }

        if captured.is_empty() {
            let view = GridView {
                size: self.size,
                cells: &next,
            };
            if !view.has_liberties(&view.group(pt)) {
                return Err(MoveError::Suicide);
            }
        }

        if self.history.contains(&next) {
            return Err(MoveError::SuperkoRepetition);
        }

        let ko = match captured.as_slice() {
            [single] if in_enemy_eye => Some(*single),
            _ => None,
        };
        Ok((
            next,
            MoveResult {
                captures: captured.len(),
                ko,
            },
        ))
    }

    /// Every point where `color` could legally play, in row-major order.
    ///
    /// Each candidate is resolved on its own copy of the grid.
    pub fn legal_moves(&self, color: Color) -> Vec<Point> {
        self.points()
            .filter(|&pt| self.cells[self.idx(pt)].is_empty() && !self.is_forbidden(pt, color))
            .filter(|&pt| self.resolve(pt, color).is_ok())
            .collect()
    }

    /// Empty the board and forget the ko state.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
        self.history.clear();
        self.forbidden = None;
    }
}

/// Read-only view over a grid, shared by the live board and scratch copies.
#[derive(Clone, Copy)]
struct GridView<'a> {
    size: usize,
    cells: &'a [Cell],
}

impl GridView<'_> {
    fn at(&self, (x, y): Point) -> Cell {
        self.cells[y * self.size + x]
    }

    /// Flood fill from `start` over same-colored stones.
    fn group(&self, start: Point) -> Vec<Point> {
        let color = self.at(start);
        let mut visited = vec![false; self.cells.len()];
        let mut stack = vec![start];
        let mut group = Vec::new();
        visited[start.1 * self.size + start.0] = true;

        while let Some(pt) = stack.pop() {
            group.push(pt);
            for n in neighbors(self.size, pt) {
                let ni = n.1 * self.size + n.0;
                if !visited[ni] && self.cells[ni] == color {
                    visited[ni] = true;
                    stack.push(n);
                }
            }
        }
        group
    }

    fn has_liberties(&self, group: &[Point]) -> bool {
        group
            .iter()
            .any(|&pt| neighbors(self.size, pt).any(|n| self.at(n).is_empty()))
    }

    fn liberty_count(&self, group: &[Point]) -> usize {
        let mut seen = vec![false; self.cells.len()];
        let mut libs = 0;
        for &pt in group {
            for n in neighbors(self.size, pt) {
                let ni = n.1 * self.size + n.0;
                if self.cells[ni].is_empty() && !seen[ni] {
                    seen[ni] = true;
                    libs += 1;
                }
            }
        }
        libs
    }
}

/// The up to 4 orthogonal neighbors (W, E, N, S) of a point.
pub(crate) fn neighbors(size: usize, (x, y): Point) -> impl Iterator<Item = Point> {
    [
        (x > 0).then(|| (x - 1, y)),
        (x + 1 < size).then(|| (x + 1, y)),
        (y > 0).then(|| (x, y - 1)),
        (y + 1 < size).then(|| (x, y + 1)),
    ]
    .into_iter()
    .flatten()
}

/// The up to 4 diagonal neighbors (NW, NE, SW, SE) of a point.
pub(crate) fn diagonal_neighbors(size: usize, (x, y): Point) -> impl Iterator<Item = Point> {
    let left = x.checked_sub(1);
    let right = (x + 1 < size).then_some(x + 1);
    let up = y.checked_sub(1);
    let down = (y + 1 < size).then_some(y + 1);
    [(left, up), (right, up), (left, down), (right, down)]
        .into_iter()
        .filter_map(|(nx, ny)| Some((nx?, ny?)))
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size {
            for x in 0..self.size {
                let ch = match self.cells[self.idx((x, y))] {
                    Cell::Black => 'X',
                    Cell::White => 'O',
                    Cell::Empty => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
