//! Randomized structure generation.
//!
//! This module carves perfect mazes: starting from an all-wall lattice, a randomized depth-first
//! traversal strides two cells at a time and knocks down the wall it crosses, leaving a spanning
//! tree of walkable cells with exactly one simple path between any two carved junctions.

use log::debug;
use rand::{seq::SliceRandom as _, Rng};

use crate::{
    grid::{Cell, Structure},
    types::{Coord, Direction, GridwayError, Result},
};

/// Smallest span on either axis a structure can usefully be carved with.
///
/// This constant is the floor below which the half-resolution lattice degenerates into a single
/// corridor; requests under it are rejected rather than normalized.
const MIN_DIMENSION: usize = 5;

/// Output of a structure generation run.
///
/// This structure carries the carved structure together with the dimensions and end coordinate
/// actually used, which may differ from the requested ones after odd-dimension normalization and
/// end clamping. The start coordinate is never adjusted and so is not echoed back.
#[derive(Clone, Debug)]
pub struct Generated {
    /// Carved structure in grid encoding.
    pub structure: Structure,
    /// Width actually used, after normalization.
    pub width: usize,
    /// Height actually used, after normalization.
    pub height: usize,
    /// End coordinate actually used, after clamping into bounds.
    pub end: Coord,
}

/// Single frame of the iterative depth-first carve.
///
/// This structure replaces one call frame of the recursive formulation: it remembers the junction
/// it expands from, a direction order private to the frame, and how many of those directions have
/// been tried so far.
struct CarveFrame {
    /// Junction cell the frame expands from.
    cell: Coord,
    /// Shuffled direction order owned by this frame.
    directions: [Direction; 4],
    /// Index of the next direction to try.
    cursor: usize,
}

/// Carves a perfect maze between a start and end coordinate.
///
/// This function normalizes even spans down to the next odd value, clamps the end coordinate into
/// the normalized bounds, carves a randomized depth-first maze from `start`, and finally forces
/// both `start` and `end` walkable even when the carve never crossed them. The returned
/// [`Generated`] echoes the dimensions and end coordinate actually used.
///
/// # Errors
///
/// - [`GridwayError::InvalidDimension`] when either requested span is below five cells.
/// - [`GridwayError::OutOfBounds`] when `start` lies outside the normalized bounds.
pub fn generate_structure<R: Rng>(
    start: Coord,
    end: Coord,
    width: usize,
    height: usize,
    rng: &mut R,
) -> Result<Generated> {
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return Err(GridwayError::InvalidDimension { width, height });
    }

    // The carve operates on a half-resolution lattice; an even span would leave a disconnected
    // boundary row or column, so even spans shrink by one.
    let width = if width % 2 == 0 { width - 1 } else { width };
    let height = if height % 2 == 0 { height - 1 } else { height };

    let end = Coord::new(end.row.min(height - 1), end.col.min(width - 1));

    if start.row >= height || start.col >= width {
        return Err(GridwayError::OutOfBounds {
            coord: start,
            width,
            height,
        });
    }

    debug!("carving {width}x{height} structure from {start} to {end}");

    let mut structure = Structure::filled(width, height, Cell::Wall.into());
    carve(&mut structure, start, rng);

    // The end (and, for off-lattice starts, the start) may sit on a cell the stride never
    // crosses; both are forced walkable unconditionally.
    structure.set(start, Cell::Open.into());
    structure.set(end, Cell::Open.into());

    Ok(Generated {
        structure,
        width,
        height,
        end,
    })
}

/// Runs the randomized depth-first carve from the given junction.
///
/// This function strides two cells at a time so every other row and column stays available as
/// wall material; each stride opens both the target junction and the bridge cell crossed on the
/// way. The traversal uses an explicit frame stack instead of recursion so large structures
/// cannot overflow the call stack, while consuming the random stream in the same depth-first
/// order the recursive formulation would.
fn carve<R: Rng>(structure: &mut Structure, start: Coord, rng: &mut R) {
    structure.set(start, Cell::Open.into());
    let mut stack = vec![new_frame(start, rng)];

    while let Some(frame) = stack.last_mut() {
        let Some(direction) = frame.directions.get(frame.cursor).copied() else {
            let _ = stack.pop();
            continue;
        };
        frame.cursor += 1;
        let cell = frame.cell;

        if let Some((bridge, target)) = stride_target(structure, cell, direction) {
            structure.set(bridge, Cell::Open.into());
            structure.set(target, Cell::Open.into());
            stack.push(new_frame(target, rng));
        }
    }
}

/// Builds a carve frame with a direction order shuffled for this frame alone.
fn new_frame<R: Rng>(cell: Coord, rng: &mut R) -> CarveFrame {
    let mut directions = Direction::ALL;
    directions.shuffle(rng);
    CarveFrame {
        cell,
        directions,
        cursor: 0,
    }
}

/// Resolves the bridge and stride-two target of a carve step, if the step is takeable.
///
/// This function returns `None` when the target would leave the lattice or has been carved
/// already; the bridge cell's state does not matter, only the target's.
fn stride_target(
    structure: &Structure,
    cell: Coord,
    direction: Direction,
) -> Option<(Coord, Coord)> {
    let bridge = structure.step(cell, direction)?;
    let target = structure.step(bridge, direction)?;
    (structure.at(target) == Some(Cell::Wall.into())).then_some((bridge, target))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng as _;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    /// Counts the open cells in a structure.
    fn open_cell_count(structure: &Structure) -> usize {
        structure
            .rows()
            .flatten()
            .filter(|&&code| code == u8::from(Cell::Open))
            .count()
    }

    /// Counts the open cells reachable from `start` by 4-directional flood fill.
    fn reachable_open_cells(structure: &Structure, start: Coord) -> usize {
        let mut visited = HashSet::new();
        let mut stack = vec![start];

        while let Some(cell) = stack.pop() {
            if structure.at(cell) != Some(u8::from(Cell::Open)) {
                continue;
            }
            if !visited.insert(cell) {
                continue;
            }
            for direction in Direction::ALL {
                if let Some(next) = structure.step(cell, direction) {
                    stack.push(next);
                }
            }
        }

        visited.len()
    }

    #[test]
    fn test_rejects_small_dimensions() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let start = Coord::new(0, 0);
        let end = Coord::new(4, 4);

        assert!(
            matches!(
                generate_structure(start, end, 4, 9, &mut rng),
                Err(GridwayError::InvalidDimension {
                    width: 4,
                    height: 9
                })
            ),
            "a width below five should be rejected"
        );
        assert!(
            matches!(
                generate_structure(start, end, 9, 0, &mut rng),
                Err(GridwayError::InvalidDimension { .. })
            ),
            "a zero height should be rejected"
        );
    }

    #[test]
    fn test_even_dimensions_normalized_and_end_clamped() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let generated = generate_structure(Coord::new(0, 0), Coord::new(9, 9), 10, 8, &mut rng)
            .expect("valid request generates");

        assert_eq!(generated.width, 9);
        assert_eq!(generated.height, 7);
        assert_eq!(generated.end, Coord::new(6, 8));
        assert_eq!(generated.structure.width(), 9);
        assert_eq!(generated.structure.height(), 7);
    }

    #[test]
    fn test_start_out_of_normalized_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        // Height 8 normalizes to 7, putting row 7 out of bounds even though it was within the
        // requested span.
        let result = generate_structure(Coord::new(7, 0), Coord::new(0, 0), 9, 8, &mut rng);

        assert!(
            matches!(
                result,
                Err(GridwayError::OutOfBounds {
                    coord: Coord { row: 7, col: 0 },
                    ..
                })
            ),
            "the start should never be adjusted into bounds"
        );
    }

    #[test]
    fn test_perfect_maze_topology() {
        // On a 9x7 lattice carved from (0, 0) the junctions sit on even rows and columns: four
        // junction rows by five junction columns, and a spanning tree over those 20 junctions
        // opens 20 + 19 cells in total.
        for seed in [1, 42, 1_000] {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let generated =
                generate_structure(Coord::new(0, 0), Coord::new(6, 8), 9, 7, &mut rng)
                    .expect("valid request generates");

            let open = open_cell_count(&generated.structure);
            let reachable = reachable_open_cells(&generated.structure, Coord::new(0, 0));

            assert_eq!(open, 39, "a spanning tree over 20 junctions opens 39 cells");
            assert_eq!(reachable, 39, "every open cell should be reachable from the start");
        }
    }

    #[test]
    fn test_start_and_end_always_open() {
        // The end sits on odd row and column offsets, which the stride never crosses; the
        // generator must force it open anyway.
        let start = Coord::new(0, 0);
        let end = Coord::new(5, 7);

        for seed in 0..5 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let generated = generate_structure(start, end, 9, 7, &mut rng)
                .expect("valid request generates");

            assert_eq!(generated.structure.at(start), Some(0), "the start should be open");
            assert_eq!(generated.structure.at(end), Some(0), "the end should be open");
        }
    }

    #[test]
    fn test_deterministic_for_seed() {
        let start = Coord::new(0, 0);
        let end = Coord::new(6, 8);

        let mut first_rng = ChaCha8Rng::seed_from_u64(99);
        let mut second_rng = ChaCha8Rng::seed_from_u64(99);
        let mut other_rng = ChaCha8Rng::seed_from_u64(100);

        let first = generate_structure(start, end, 9, 7, &mut first_rng)
            .expect("valid request generates");
        let second = generate_structure(start, end, 9, 7, &mut second_rng)
            .expect("valid request generates");
        let other = generate_structure(start, end, 9, 7, &mut other_rng)
            .expect("valid request generates");

        assert_eq!(
            first.structure,
            second.structure,
            "equal seeds should carve equal structures"
        );
        assert_ne!(
            first.structure,
            other.structure,
            "different seeds should carve different structures"
        );
    }
}
