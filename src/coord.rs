//! Text coordinates in the usual Go notation.
//!
//! Columns are letters `A`..`Z` skipping `I` (to avoid confusion with `J`),
//! rows are numbered from 1 at the bottom. `D4` on a 9x9 board is the point
//! `(3, 5)`. `pass` (any case) is accepted as a vertex.

use thiserror::Error;

use crate::board::Point;
use crate::constants::MAX_VERTEX_SIZE;

/// A parsed vertex: a board point or a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertex {
    Play(Point),
    Pass,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoordError {
    #[error("empty vertex")]
    Empty,
    #[error("invalid column in vertex {0:?}")]
    BadColumn(String),
    #[error("invalid row in vertex {0:?}")]
    BadRow(String),
    #[error("vertex {0:?} is off the board")]
    OffBoard(String),
}

/// Parse a vertex such as `D4` or `pass` for a board of `size`.
pub fn parse_vertex(s: &str, size: usize) -> Result<Vertex, CoordError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(CoordError::Empty);
    }
    if s.eq_ignore_ascii_case("pass") {
        return Ok(Vertex::Pass);
    }

    let mut chars = s.chars();
    let col_char = chars
        .next()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .ok_or_else(|| CoordError::BadColumn(s.to_string()))?;
    if col_char == 'I' {
        return Err(CoordError::BadColumn(s.to_string()));
    }
    let mut col = (col_char as u8 - b'A') as usize;
    // Skip 'I'
    if col_char > 'I' {
        col -= 1;
    }

    let row_text = chars.as_str();
    if !row_text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoordError::BadRow(s.to_string()));
    }
    let row: usize = row_text
        .parse()
        .map_err(|_| CoordError::BadRow(s.to_string()))?;
    if row == 0 || row > size || col >= size {
        return Err(CoordError::OffBoard(s.to_string()));
    }
    Ok(Vertex::Play((col, size - row)))
}

/// Format a point as a vertex for a board of `size`.
///
/// Boards larger than 25 have no letter for their last columns; those points
/// are written as `x,y` instead.
pub fn format_vertex((x, y): Point, size: usize) -> String {
    if size > MAX_VERTEX_SIZE || x >= size || y >= size {
        return format!("{x},{y}");
    }
    let mut c = (b'A' + x as u8) as char;
    if c >= 'I' {
        c = (c as u8 + 1) as char;
    }
    format!("{c}{}", size - y)
}
