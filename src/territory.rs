//! Territory and influence estimation.
//!
//! An evaluation runs in four steps over a board snapshot:
//! 1. stones seed the map with ±[`STONE_SEED`] (positive for Black),
//! 2. each empty region is flood filled and valued by the colors on its
//!    border,
//! 3. a few smoothing passes diffuse influence through empty points,
//! 4. the map is scaled into [-1, 1].
//!
//! Empty points whose scaled influence passes [`OWNERSHIP_THRESHOLD`] count as
//! territory. Stones are never changed by smoothing.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::board::{Board, Captures, Cell, Color, Point, diagonal_neighbors, neighbors};
use crate::constants::{
    CONTESTED_RANGE, DIAGONAL_WEIGHT, ORTHOGONAL_WEIGHT, OWNERSHIP_THRESHOLD, POTENTIAL_PASSES,
    POTENTIAL_RETAIN, SIMPLE_PASSES, SIMPLE_RETAIN, SOLE_BORDER_SEED, STONE_SEED,
    STONE_WEIGHT_FACTOR,
};

/// How influence spreads during the smoothing passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Smoothing {
    /// Eight neighbors, orthogonal ones and stones weighted higher.
    #[default]
    Potential,
    /// Plain mean of the four orthogonal neighbors.
    Simple,
}

impl Smoothing {
    /// Conventional number of passes for the mode.
    pub fn default_passes(self) -> usize {
        match self {
            Smoothing::Potential => POTENTIAL_PASSES,
            Smoothing::Simple => SIMPLE_PASSES,
        }
    }
}

/// Empty points by owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Ownership {
    pub black: usize,
    pub white: usize,
    pub neutral: usize,
}

impl Ownership {
    pub fn territory(&self, color: Color) -> usize {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }

    pub fn total(&self) -> usize {
        self.black + self.white + self.neutral
    }
}

/// Final or provisional score of both players.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Score {
    pub black: f32,
    pub white: f32,
}

impl Score {
    /// The leading color, or `None` on a tie.
    pub fn winner(&self) -> Option<Color> {
        if self.black > self.white {
            Some(Color::Black)
        } else if self.white > self.black {
            Some(Color::White)
        } else {
            None
        }
    }

    /// Absolute difference between the two scores.
    pub fn margin(&self) -> f32 {
        (self.black - self.white).abs()
    }
}

/// GTP style result: `B+3.5`, `W+0.5` or `0`.
impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.winner() {
            Some(Color::Black) => write!(f, "B+{}", self.margin()),
            Some(Color::White) => write!(f, "W+{}", self.margin()),
            None => write!(f, "0"),
        }
    }
}

/// Computes territory and influence maps for one board snapshot.
pub struct TerritoryEvaluator<'a> {
    board: &'a Board,
    smoothing: Smoothing,
    passes: usize,
}

impl<'a> TerritoryEvaluator<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self {
            board,
            smoothing: Smoothing::Potential,
            passes: POTENTIAL_PASSES,
        }
    }

    pub fn smoothing(mut self, smoothing: Smoothing) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn passes(mut self, passes: usize) -> Self {
        self.passes = passes;
        self
    }

    pub fn evaluate(&self) -> Evaluation {
        let mut territory = self.seed();
        for _ in 0..self.passes {
            territory = self.smooth(&territory);
        }

        let abs_max = territory.iter().fold(1.0_f64, |m, v| m.max(v.abs()));
        let influence = territory.iter().map(|v| v / abs_max).collect();

        trace!(
            size = self.board.size(),
            passes = self.passes,
            smoothing = ?self.smoothing,
            abs_max,
            "territory evaluated"
        );
        Evaluation {
            size: self.board.size(),
            cells: self.board.cells().to_vec(),
            territory,
            influence,
        }
    }

    pub fn ownership(&self) -> Ownership {
        self.evaluate().ownership()
    }

    pub fn score(&self, captures: Captures, komi: f32) -> Score {
        self.evaluate().score(captures, komi)
    }

    /// Stones and flood-filled empty regions, before any smoothing.
    fn seed(&self) -> Vec<f64> {
        let size = self.board.size();
        let cells = self.board.cells();
        let mut map: Vec<f64> = cells
            .iter()
            .map(|c| match c {
                Cell::Black => STONE_SEED,
                Cell::White => -STONE_SEED,
                Cell::Empty => 0.0,
            })
            .collect();

        let mut visited = vec![false; cells.len()];
        for pt in self.board.points() {
            let i = pt.1 * size + pt.0;
            if visited[i] || !cells[i].is_empty() {
                continue;
            }
            let (region, black, white) = self.region(pt, &mut visited);
            let value = region_value(black, white);
            for (x, y) in region {
                map[y * size + x] = value;
            }
        }
        map
    }

    /// Flood fill the empty region containing `start`. Returns its points and
    /// the number of distinct black and white stones on its border.
    fn region(&self, start: Point, visited: &mut [bool]) -> (Vec<Point>, usize, usize) {
        let size = self.board.size();
        let cells = self.board.cells();
        let mut border = vec![false; cells.len()];
        let (mut black, mut white) = (0, 0);
        let mut region = Vec::new();
        let mut stack = vec![start];
        visited[start.1 * size + start.0] = true;

        while let Some(pt) = stack.pop() {
            region.push(pt);
            for n in neighbors(size, pt) {
                let ni = n.1 * size + n.0;
                match cells[ni] {
                    Cell::Empty => {
                        if !visited[ni] {
                            visited[ni] = true;
                            stack.push(n);
                        }
                    }
                    stone if !border[ni] => {
                        border[ni] = true;
                        if stone == Cell::Black {
                            black += 1;
                        } else {
                            white += 1;
                        }
                    }
                    _ => {}
                }
            }
        }
        (region, black, white)
    }

    /// One diffusion pass over the empty points. Reads only from `map`.
    fn smooth(&self, map: &[f64]) -> Vec<f64> {
        let size = self.board.size();
        let cells = self.board.cells();
        let mut next = map.to_vec();

        for pt in self.board.points() {
            let i = pt.1 * size + pt.0;
            if !cells[i].is_empty() {
                continue;
            }
            next[i] = match self.smoothing {
                Smoothing::Potential => {
                    let orthogonal = neighbors(size, pt).map(|n| (n, ORTHOGONAL_WEIGHT));
                    let diagonal = diagonal_neighbors(size, pt).map(|n| (n, DIAGONAL_WEIGHT));
                    let (mut sum, mut weights) = (0.0, 0.0);
                    for ((nx, ny), base) in orthogonal.chain(diagonal) {
                        let ni = ny * size + nx;
                        let weight = if cells[ni].is_empty() {
                            base
                        } else {
                            base * STONE_WEIGHT_FACTOR
                        };
                        sum += map[ni] * weight;
                        weights += weight;
                    }
                    if weights > 0.0 {
                        POTENTIAL_RETAIN * map[i] + (1.0 - POTENTIAL_RETAIN) * (sum / weights)
                    } else {
                        map[i]
                    }
                }
                Smoothing::Simple => {
                    let (sum, count) = neighbors(size, pt)
                        .fold((0.0, 0usize), |(s, c), (nx, ny)| (s + map[ny * size + nx], c + 1));
                    if count > 0 {
                        SIMPLE_RETAIN * map[i] + (1.0 - SIMPLE_RETAIN) * (sum / count as f64)
                    } else {
                        map[i]
                    }
                }
            };
        }
        next
    }
}

/// Value of an empty region given the stones on its border.
fn region_value(black: usize, white: usize) -> f64 {
    match (black, white) {
        (0, 0) => 0.0,
        (_, 0) => SOLE_BORDER_SEED,
        (0, _) => -SOLE_BORDER_SEED,
        (b, w) => {
            let ratio = b as f64 / (b + w) as f64;
            (ratio - 0.5) * 2.0 * CONTESTED_RANGE
        }
    }
}

/// Result of one [`TerritoryEvaluator::evaluate`] call.
///
/// Holds its own copy of the grid, so it stays valid after the board moves on;
/// it just no longer describes the current position.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    size: usize,
    cells: Vec<Cell>,
    territory: Vec<f64>,
    influence: Vec<f64>,
}

impl Evaluation {
    pub fn size(&self) -> usize {
        self.size
    }

    /// Raw map: sign is the owner, magnitude the confidence.
    pub fn territory_map(&self) -> &[f64] {
        &self.territory
    }

    /// Territory map scaled into [-1, 1].
    pub fn influence_map(&self) -> &[f64] {
        &self.influence
    }

    pub fn influence_at(&self, x: usize, y: usize) -> Option<f64> {
        (x < self.size && y < self.size).then(|| self.influence[y * self.size + x])
    }

    /// Owner of an empty point, `None` for neutral points, stones and points
    /// off the board.
    pub fn owner(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.size || y >= self.size || !self.cells[y * self.size + x].is_empty() {
            return None;
        }
        classify(self.influence[y * self.size + x])
    }

    pub fn ownership(&self) -> Ownership {
        let mut ownership = Ownership::default();
        for (cell, &value) in self.cells.iter().zip(&self.influence) {
            if !cell.is_empty() {
                continue;
            }
            match classify(value) {
                Some(Color::Black) => ownership.black += 1,
                Some(Color::White) => ownership.white += 1,
                None => ownership.neutral += 1,
            }
        }
        ownership
    }

    pub fn stone_count(&self, color: Color) -> usize {
        let cell = Cell::from(color);
        self.cells.iter().filter(|&&c| c == cell).count()
    }

    /// Area score: stones plus territory, komi to White.
    pub fn area_score(&self, komi: f32) -> Score {
        self.score(Captures::default(), komi)
    }

    /// Stones plus territory plus the given captures, komi to White.
    pub fn score(&self, captures: Captures, komi: f32) -> Score {
        let ownership = self.ownership();
        let points = |color: Color| {
            (self.stone_count(color) + ownership.territory(color) + captures.get(color)) as f32
        };
        Score {
            black: points(Color::Black),
            white: points(Color::White) + komi,
        }
    }
}

fn classify(influence: f64) -> Option<Color> {
    if influence > OWNERSHIP_THRESHOLD {
        Some(Color::Black)
    } else if influence < -OWNERSHIP_THRESHOLD {
        Some(Color::White)
    } else {
        None
    }
}
