//! Core types for the EV charging environment.
//!
//! Defines grid cells and the per-EV movement mode used throughout the
//! environment and the learning loop.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A cell of the square grid lattice, addressed by integer coordinates.
///
/// Valid cells for a grid of size `n` satisfy `0 <= x < n` and `0 <= y < n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    /// Creates a new cell.
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Origin cell (0, 0).
    pub fn origin() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Manhattan distance to another cell.
    ///
    /// On an unobstructed 4-connected lattice this equals the shortest-path
    /// length, which makes it an exact A* heuristic.
    pub fn manhattan_to(&self, other: &Cell) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Returns true if the cell lies inside a `size × size` grid.
    pub fn is_within(&self, size: usize) -> bool {
        self.x < size && self.y < size
    }

    /// Coordinates as observation features `[x, y]`.
    pub fn features(&self) -> [f64; 2] {
        [self.x as f64, self.y as f64]
    }
}

impl From<(usize, usize)> for Cell {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Movement mode of an EV, derived from its charging timer.
///
/// `Moving` EVs pick a destination station each step; `Charging` EVs wait
/// at their station until the timer runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EvMode {
    Moving,
    Charging,
}

impl fmt::Display for EvMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvMode::Moving => write!(f, "moving"),
            EvMode::Charging => write!(f, "charging"),
        }
    }
}
