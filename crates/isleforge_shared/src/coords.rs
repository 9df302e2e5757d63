use std::fmt;
use std::num::ParseIntError;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const CHUNK_SIZE: usize = 16;
pub const CHUNK_HEIGHT: usize = 256;
pub const CHUNK_AREA: usize = CHUNK_SIZE * CHUNK_HEIGHT;

/// Identifies one chunk column in the world. The world container keys
/// chunks by the `"cx,cy"` form produced by `Display`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
}

impl ChunkCoord {
    pub fn new(cx: i32, cy: i32) -> Self {
        Self { cx, cy }
    }
}

impl Add for ChunkCoord {
    type Output = ChunkCoord;

    fn add(self, rhs: Self) -> Self::Output {
        ChunkCoord {
            cx: self.cx + rhs.cx,
            cy: self.cy + rhs.cy,
        }
    }
}

impl AddAssign for ChunkCoord {
    fn add_assign(&mut self, rhs: Self) {
        self.cx += rhs.cx;
        self.cy += rhs.cy;
    }
}

impl Sub for ChunkCoord {
    type Output = ChunkCoord;

    fn sub(self, rhs: Self) -> Self::Output {
        ChunkCoord {
            cx: self.cx - rhs.cx,
            cy: self.cy - rhs.cy,
        }
    }
}

impl SubAssign for ChunkCoord {
    fn sub_assign(&mut self, rhs: Self) {
        self.cx -= rhs.cx;
        self.cy -= rhs.cy;
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.cx, self.cy)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCoordError {
    MissingSeparator,
    InvalidComponent(ParseIntError),
}

impl fmt::Display for ParseCoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSeparator => write!(f, "expected 'cx,cy'"),
            Self::InvalidComponent(err) => write!(f, "invalid coordinate component: {err}"),
        }
    }
}

impl std::error::Error for ParseCoordError {}

impl FromStr for ChunkCoord {
    type Err = ParseCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (cx, cy) = s.split_once(',').ok_or(ParseCoordError::MissingSeparator)?;
        Ok(Self {
            cx: cx.trim().parse().map_err(ParseCoordError::InvalidComponent)?,
            cy: cy.trim().parse().map_err(ParseCoordError::InvalidComponent)?,
        })
    }
}

/// Flat index of a cell inside a chunk, row-major with row 0 at the bottom.
pub fn cell_to_index(row: usize, col: usize) -> usize {
    debug_assert!(row < CHUNK_HEIGHT && col < CHUNK_SIZE);
    row * CHUNK_SIZE + col
}

pub fn index_to_cell(index: usize) -> (usize, usize) {
    assert!(index < CHUNK_AREA, "chunk index out of bounds: {index}");
    (index / CHUNK_SIZE, index % CHUNK_SIZE)
}
