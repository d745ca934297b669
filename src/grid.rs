//! Structure storage and cell codes.
//!
//! This module owns the rectangular cell-code lattice every other component works against. Cells
//! are stored as raw `u8` codes so the same storage serves both walkability encodings; the
//! [`Cell`] enumeration gives the grid-encoding codes names, and the wall-bit constants cover the
//! maze encoding.

use std::collections::HashSet;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::types::{Coord, Direction, GridwayError, Result};

/// Bit flag marking a wall on the left edge of a maze-encoded cell.
pub const WALL_LEFT: u8 = 0b01;
/// Bit flag marking a wall on the top edge of a maze-encoded cell.
pub const WALL_TOP: u8 = 0b10;

/// Cell codes used by grid-encoded structures.
///
/// This enumeration names the three codes the grid encoding assigns to a cell. Conversions to and
/// from the raw `u8` storage go through the derived [`From`] and [`TryFrom`] implementations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Cell {
    /// Walkable cell.
    ///
    /// This variant is the only code a grid-encoding search may enter.
    Open = 0,
    /// Blocking wall cell.
    Wall = 1,
    /// Cell annotated as lying on a solved path.
    ///
    /// This variant is a rendering annotation, not a structural property. Searches treat it like
    /// a wall, so path overlays must happen at render time rather than being written back into a
    /// structure that will be searched again.
    Path = 2,
}

impl Cell {
    /// Returns whether a grid-encoding search may enter this cell.
    #[must_use]
    pub const fn walkable(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Rectangular cell-code lattice that structures are generated into and searched over.
///
/// This structure stores its cells as a flat row-major buffer of raw codes. It is immutable from
/// the search's point of view: searches only read it, and path overlays are applied while
/// rendering instead of being written into the cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Structure {
    /// Number of columns.
    width: usize,
    /// Number of rows.
    height: usize,
    /// Cell codes in row-major order, `width * height` entries.
    cells: Vec<u8>,
}

impl Structure {
    /// Creates a structure with every cell set to the same code.
    #[must_use]
    pub fn filled(width: usize, height: usize, code: u8) -> Self {
        Self {
            width,
            height,
            cells: vec![code; width * height],
        }
    }

    /// Creates a fully walkable grid-encoded structure.
    ///
    /// This function builds the blank-grid variant: every cell carries [`Cell::Open`], so any two
    /// in-bounds coordinates are connected.
    #[must_use]
    pub fn open_grid(width: usize, height: usize) -> Self {
        Self::filled(width, height, Cell::Open.into())
    }

    /// Builds a structure from explicit rows of cell codes.
    ///
    /// # Errors
    ///
    /// - [`GridwayError::MalformedFile`] when no rows are given, the first row is empty, or a row
    ///   length differs from the first row's; the reported line is the offending row's 1-based
    ///   position within `rows`.
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(GridwayError::MalformedFile {
                line: 1,
                reason: "no rows given".to_owned(),
            });
        };
        let width = first.len();
        if width == 0 {
            return Err(GridwayError::MalformedFile {
                line: 1,
                reason: "first row is empty".to_owned(),
            });
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        for (index, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(GridwayError::MalformedFile {
                    line: index + 1,
                    reason: "row length differs from the first row".to_owned(),
                });
            }
            cells.extend_from_slice(row);
        }

        Ok(Self {
            width,
            height: rows.len(),
            cells,
        })
    }

    /// Returns the number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns whether a coordinate lies within the structure.
    #[must_use]
    pub const fn contains(&self, coord: Coord) -> bool {
        coord.row < self.height && coord.col < self.width
    }

    /// Reads the cell code at a coordinate, or `None` when it is out of bounds.
    #[must_use]
    pub fn at(&self, coord: Coord) -> Option<u8> {
        if self.contains(coord) {
            self.cells.get(self.offset(coord)).copied()
        } else {
            None
        }
    }

    /// Writes a cell code at a coordinate, ignoring writes outside the structure.
    pub(crate) fn set(&mut self, coord: Coord, code: u8) {
        if self.contains(coord) {
            let offset = self.offset(coord);
            if let Some(cell) = self.cells.get_mut(offset) {
                *cell = code;
            }
        }
    }

    /// Resolves the in-bounds neighbor one step in the given direction, if any.
    #[must_use]
    pub fn step(&self, from: Coord, direction: Direction) -> Option<Coord> {
        let (row_offset, col_offset) = direction.offsets();
        let row = from.row.checked_add_signed(row_offset)?;
        let col = from.col.checked_add_signed(col_offset)?;
        let next = Coord::new(row, col);
        self.contains(next).then_some(next)
    }

    /// Iterates over the structure's rows as cell-code slices, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        // `chunks` rejects a zero size; an empty structure yields no rows either way.
        self.cells.chunks(self.width.max(1))
    }

    /// Renders the structure as ASCII art, one text row per cell row.
    ///
    /// This function draws grid-encoding codes: open cells as `.`, walls as `#`, path annotations
    /// as `*`, and any unrecognized code as `?`.
    #[must_use]
    pub fn render(&self) -> String {
        self.render_with_path(&[])
    }

    /// Renders the structure with a path overlaid as `*` glyphs.
    ///
    /// This function applies the overlay purely at render time; the structure's cells are not
    /// touched, so the same structure can be searched again afterwards.
    #[must_use]
    pub fn render_with_path(&self, path: &[Coord]) -> String {
        let overlay: HashSet<Coord> = path.iter().copied().collect();
        let mut out = String::with_capacity(self.cells.len() + self.height);

        for (row_index, row) in self.rows().enumerate() {
            for (col_index, &code) in row.iter().enumerate() {
                if overlay.contains(&Coord::new(row_index, col_index)) {
                    out.push('*');
                } else {
                    out.push(Self::glyph(code));
                }
            }
            out.push('\n');
        }

        out
    }

    /// Maps a grid-encoding cell code to its rendering glyph.
    fn glyph(code: u8) -> char {
        Cell::try_from(code).map_or('?', |cell| match cell {
            Cell::Open => '.',
            Cell::Wall => '#',
            Cell::Path => '*',
        })
    }

    /// Computes the flat buffer offset of an in-bounds coordinate.
    const fn offset(&self, coord: Coord) -> usize {
        coord.row * self.width + coord.col
    }
}
