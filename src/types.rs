//! Coordinate, direction, and error types shared across the crate.

use std::fmt;

use clap::ValueEnum;
use thiserror::Error;

/// Convenience alias for results carrying a [`GridwayError`].
///
/// This alias is used by every fallible operation in the library so callers can bring a single
/// result type into scope.
pub type Result<T> = std::result::Result<T, GridwayError>;

/// Row-column position of a cell within a structure.
///
/// This structure identifies a single cell. The crate uses the (row, col) convention uniformly:
/// row zero is the top row and column zero is the leftmost column, for structure indexing,
/// start/end coordinates, and the file format alike.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Coord {
    /// Zero-based row index, counted from the top.
    pub row: usize,
    /// Zero-based column index, counted from the left.
    pub col: usize,
}

impl Coord {
    /// Creates a coordinate from row and column indices.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Computes the Manhattan distance to another coordinate.
    ///
    /// This function sums the absolute row and column differences. For 4-directional unit-cost
    /// movement the measure is admissible and consistent, which is what makes it a valid A*
    /// heuristic.
    #[must_use]
    pub const fn manhattan_distance(self, other: Self) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl fmt::Display for Coord {
    #[expect(
        clippy::min_ident_chars,
        reason = "The parameter name follows the standard library trait signature."
    )]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Cardinal movement direction between adjacent cells.
///
/// This enumeration names the four axis-aligned moves a search or carve can take. Row and column
/// offsets for each move come from [`offsets`](Direction::offsets).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// One column to the left.
    Left,
    /// One column to the right.
    Right,
    /// One row up.
    Up,
    /// One row down.
    Down,
}

impl Direction {
    /// All four directions in the order neighbor expansion scans them.
    ///
    /// This constant fixes the enumeration order so that searches expand neighbors
    /// deterministically; combined with first-in-first-out tie-breaking in the open set it makes
    /// repeated searches reproduce the same path.
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Up, Self::Down];

    /// Returns the row and column offsets of a single step in this direction.
    #[must_use]
    pub const fn offsets(self) -> (isize, isize) {
        match self {
            Self::Left => (0, -1),
            Self::Right => (0, 1),
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
        }
    }
}

/// Walkability model applied to a structure's cell codes.
///
/// This enumeration selects how the search interprets cell codes, replacing a per-model search
/// implementation with a single parameterized one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Encoding {
    /// Cell codes are block markers: zero is walkable, anything else blocks the cell outright.
    Grid,
    /// Cell codes are wall bitmasks: bit 0 walls off the cell's left edge and bit 1 its top edge,
    /// so walkability depends on the pair of cells a move crosses between.
    Maze,
}

/// Failure conditions surfaced by structure generation, search, and file handling.
///
/// This enumeration is the crate's whole error taxonomy. Absence of a path is deliberately not
/// represented here: disconnected start and end coordinates are a normal search outcome and are
/// reported as an empty path instead.
#[derive(Debug, Error)]
pub enum GridwayError {
    /// Requested dimensions are below the usable minimum.
    ///
    /// This variant is returned by the generator when either span is smaller than five cells; a
    /// narrower lattice degenerates into a corridor with no room to carve.
    #[error("structure dimensions {width}x{height} are below the 5x5 minimum")]
    InvalidDimension {
        /// Requested width in cells.
        width: usize,
        /// Requested height in cells.
        height: usize,
    },
    /// A start or end coordinate lies outside the structure.
    ///
    /// This variant is produced after any dimension normalization has been applied, so the bounds
    /// it reports are the ones actually in effect.
    #[error("coordinate {coord} lies outside the {width}x{height} structure")]
    OutOfBounds {
        /// Offending coordinate.
        coord: Coord,
        /// Width of the structure in cells.
        width: usize,
        /// Height of the structure in cells.
        height: usize,
    },
    /// A structure file failed to parse.
    ///
    /// This variant carries the 1-based line number and a short reason so the caller can point at
    /// the offending input. Parsing never skips a bad line and continues.
    #[error("malformed structure file at line {line}: {reason}")]
    MalformedFile {
        /// 1-based line number the parser rejected.
        line: usize,
        /// What made the line unparsable.
        reason: String,
    },
    /// The structure file to load does not exist.
    #[error("structure file not found: {path}")]
    FileNotFound {
        /// Path that was probed.
        path: String,
    },
    /// The structure file could not be read or written.
    #[error("structure file could not be read or written")]
    Io(#[from] std::io::Error),
}
