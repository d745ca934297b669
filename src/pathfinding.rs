//! A* shortest-path search over structures.
//!
//! This module implements A* with a Manhattan heuristic over a [`Structure`] under either
//! walkability [`Encoding`]. Searches are deterministic: the open set orders entries by f-score
//! and breaks ties by insertion order, so identical inputs always produce identical paths.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap, HashSet},
};

use log::{debug, trace};

use crate::{
    grid::{Cell, Structure, WALL_LEFT, WALL_TOP},
    types::{Coord, Direction, Encoding, GridwayError, Result},
};

/// Entry in the open set's priority queue.
///
/// This structure carries the costs a queued coordinate was discovered with. The ordering is
/// reversed so the standard max-heap pops the lowest f-score first, and the insertion sequence
/// number makes entries with equal f-scores pop first-in-first-out.
#[derive(Clone, Debug, PartialEq, Eq)]
struct OpenEntry {
    /// Coordinate the entry would expand.
    coord: Coord,
    /// Step cost paid from the start to this coordinate.
    g_cost: usize,
    /// Step cost plus the heuristic estimate to the end.
    f_cost: usize,
    /// Insertion sequence number, monotonically increasing per search.
    seq: usize,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Comparing the other way round turns the max-heap into a min-heap on (f, seq).
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Result of advancing a search by one expansion.
///
/// This enumeration is what [`Search::step`] yields, letting a caller observe the search one
/// expanded coordinate at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The search expanded this coordinate and has more work queued.
    Expanded(Coord),
    /// The search reached the end coordinate; the ordered path from start to end is attached.
    Found(Vec<Coord>),
    /// The open set ran dry without reaching the end; no path exists.
    Exhausted,
}

/// Resumable A* search over a borrowed structure.
///
/// This structure owns the open and closed sets of a single search so a caller can drive it one
/// expansion at a time with [`step`](Search::step), or to completion with [`run`](Search::run).
/// The structure being searched is only ever read; path markers are never written into it. Each
/// search is independent, so running a fresh one over the same inputs reproduces the same path.
pub struct Search<'grid> {
    /// Structure being searched.
    structure: &'grid Structure,
    /// Walkability model applied to the structure's cell codes.
    encoding: Encoding,
    /// Coordinate the search is trying to reach.
    end: Coord,
    /// Pending entries, ordered by f-score and then insertion order.
    open: BinaryHeap<OpenEntry>,
    /// Coordinates already expanded.
    closed: HashSet<Coord>,
    /// Cheapest step cost recorded so far per discovered coordinate.
    best_g: HashMap<Coord, usize>,
    /// Back-pointers used to rebuild the path once the end is reached.
    parents: HashMap<Coord, Coord>,
    /// Sequence number stamped onto the next queued entry.
    next_seq: usize,
}

impl<'grid> Search<'grid> {
    /// Starts a search from `start` towards `end`.
    ///
    /// # Errors
    ///
    /// - [`GridwayError::OutOfBounds`] when either coordinate lies outside the structure.
    pub fn new(
        start: Coord,
        end: Coord,
        structure: &'grid Structure,
        encoding: Encoding,
    ) -> Result<Self> {
        for coord in [start, end] {
            if !structure.contains(coord) {
                return Err(GridwayError::OutOfBounds {
                    coord,
                    width: structure.width(),
                    height: structure.height(),
                });
            }
        }

        let mut search = Self {
            structure,
            encoding,
            end,
            open: BinaryHeap::new(),
            closed: HashSet::new(),
            best_g: HashMap::new(),
            parents: HashMap::new(),
            next_seq: 0,
        };
        search.push_open(start, 0);

        Ok(search)
    }

    /// Advances the search by one expansion.
    ///
    /// This function pops the best open entry, finishes if it is the end coordinate, and
    /// otherwise queues its walkable neighbors. Stale duplicate entries for already-expanded
    /// coordinates are discarded without counting as an expansion.
    pub fn step(&mut self) -> StepOutcome {
        while let Some(entry) = self.open.pop() {
            if self.closed.contains(&entry.coord) {
                continue;
            }

            if entry.coord == self.end {
                let path = self.reconstruct();
                trace!(
                    "path found: {} cells after {} expansions",
                    path.len(),
                    self.closed.len()
                );
                return StepOutcome::Found(path);
            }

            let _ = self.closed.insert(entry.coord);

            for direction in Direction::ALL {
                let Some(next) = self.neighbor(entry.coord, direction) else {
                    continue;
                };
                if self.closed.contains(&next) {
                    continue;
                }
                let g_next = entry.g_cost + 1;
                if self.best_g.get(&next).is_some_and(|&best| best <= g_next) {
                    continue;
                }
                let _ = self.parents.insert(next, entry.coord);
                self.push_open(next, g_next);
            }

            return StepOutcome::Expanded(entry.coord);
        }

        debug!("open set exhausted after {} expansions", self.closed.len());
        StepOutcome::Exhausted
    }

    /// Drives the search to completion.
    ///
    /// This function steps until the end is reached or the open set empties, returning the
    /// ordered path from start to end inclusive, or an empty vector when no path exists.
    #[must_use]
    pub fn run(mut self) -> Vec<Coord> {
        loop {
            match self.step() {
                StepOutcome::Expanded(_) => {}
                StepOutcome::Found(path) => return path,
                StepOutcome::Exhausted => return Vec::new(),
            }
        }
    }

    /// Returns the number of entries currently queued in the open set.
    #[must_use]
    pub fn open_len(&self) -> usize {
        self.open.len()
    }

    /// Returns the number of coordinates expanded so far.
    #[must_use]
    pub fn closed_len(&self) -> usize {
        self.closed.len()
    }

    /// Queues a coordinate with the given step cost.
    fn push_open(&mut self, coord: Coord, g_cost: usize) {
        let entry = OpenEntry {
            coord,
            g_cost,
            f_cost: g_cost + coord.manhattan_distance(self.end),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        let _ = self.best_g.insert(coord, g_cost);
        self.open.push(entry);
    }

    /// Resolves the walkable neighbor one step in the given direction, if any.
    ///
    /// This function checks bounds first and then the encoding's walkability rule. Under the
    /// grid encoding only a cell code of zero may be entered. Under the maze encoding a wall is
    /// stored on one side of the edge it blocks: moving left or up consults the current cell's
    /// own left or top bit, while moving right or down consults the destination cell's.
    fn neighbor(&self, from: Coord, direction: Direction) -> Option<Coord> {
        let next = self.structure.step(from, direction)?;
        match self.encoding {
            Encoding::Grid => {
                (self.structure.at(next)? == u8::from(Cell::Open)).then_some(next)
            }
            Encoding::Maze => {
                let blocked = match direction {
                    Direction::Left => self.structure.at(from)? & WALL_LEFT != 0,
                    Direction::Right => self.structure.at(next)? & WALL_LEFT != 0,
                    Direction::Up => self.structure.at(from)? & WALL_TOP != 0,
                    Direction::Down => self.structure.at(next)? & WALL_TOP != 0,
                };
                (!blocked).then_some(next)
            }
        }
    }

    /// Rebuilds the start-to-end path by walking the parent back-pointers from the end.
    fn reconstruct(&self) -> Vec<Coord> {
        let mut path = vec![self.end];
        let mut cursor = self.end;

        while let Some(&parent) = self.parents.get(&cursor) {
            path.push(parent);
            cursor = parent;
        }
        path.reverse();

        path
    }
}

/// Searches for a shortest path between two coordinates.
///
/// This function runs a full A* search over the structure under the given encoding and returns
/// the ordered path from start to end inclusive. An empty vector means the coordinates are not
/// connected, which is a normal outcome rather than an error; `start == end` yields a
/// single-element path.
///
/// # Errors
///
/// - [`GridwayError::OutOfBounds`] when either coordinate lies outside the structure.
pub fn find_path(
    start: Coord,
    end: Coord,
    structure: &Structure,
    encoding: Encoding,
) -> Result<Vec<Coord>> {
    debug!("searching {encoding:?} path from {start} to {end}");
    let search = Search::new(start, end, structure, encoding)?;

    Ok(search.run())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds the 5x9 reference grid used across the search tests.
    ///
    /// Cell (3, 7) is open, which leaves exactly one corridor into the bottom-right corner.
    fn fixture_structure() -> Structure {
        Structure::from_rows(&[
            vec![0, 0, 0, 0, 1, 0, 0, 0, 0],
            vec![1, 1, 0, 1, 0, 0, 0, 1, 0],
            vec![0, 0, 0, 0, 0, 1, 0, 0, 0],
            vec![0, 1, 1, 1, 1, 1, 1, 0, 1],
            vec![0, 0, 0, 0, 0, 1, 1, 0, 0],
        ])
        .expect("fixture rows are rectangular")
    }

    #[test]
    fn test_open_grid_path_is_manhattan_optimal() {
        let structure = Structure::open_grid(9, 5);
        let path = find_path(Coord::new(0, 0), Coord::new(4, 8), &structure, Encoding::Grid)
            .expect("endpoints are in bounds");

        assert_eq!(
            path.len(),
            13,
            "an unobstructed path should cost exactly the Manhattan distance"
        );
        assert_eq!(path.first(), Some(&Coord::new(0, 0)));
        assert_eq!(path.last(), Some(&Coord::new(4, 8)));
    }

    #[test]
    fn test_fixture_path() {
        let structure = fixture_structure();
        let path = find_path(Coord::new(0, 0), Coord::new(4, 8), &structure, Encoding::Grid)
            .expect("endpoints are in bounds");

        // The Manhattan distance is 12, but every monotone route is walled off; the best path
        // detours upward once, costing 14 steps.
        assert_eq!(path.len(), 15);
        assert_eq!(path.first(), Some(&Coord::new(0, 0)));
        assert_eq!(path.last(), Some(&Coord::new(4, 8)));
        for (step_from, step_to) in path.iter().zip(path.iter().skip(1)) {
            assert_eq!(
                step_from.manhattan_distance(*step_to),
                1,
                "consecutive path cells should be adjacent"
            );
        }
    }

    #[test]
    fn test_start_equals_end() {
        let structure = fixture_structure();
        let start = Coord::new(2, 2);
        let path = find_path(start, start, &structure, Encoding::Grid)
            .expect("endpoints are in bounds");

        assert_eq!(
            path,
            vec![start],
            "a search from a cell to itself should yield that single cell"
        );
    }

    #[test]
    fn test_disconnected_returns_empty() {
        // Same layout as the fixture except cell (3, 7) is walled, cutting off the corner.
        let structure = Structure::from_rows(&[
            vec![0, 0, 0, 0, 1, 0, 0, 0, 0],
            vec![1, 1, 0, 1, 0, 0, 0, 1, 0],
            vec![0, 0, 0, 0, 0, 1, 0, 0, 0],
            vec![0, 1, 1, 1, 1, 1, 1, 1, 1],
            vec![0, 0, 0, 0, 0, 1, 1, 0, 0],
        ])
        .expect("rows are rectangular");
        let path = find_path(Coord::new(0, 0), Coord::new(4, 8), &structure, Encoding::Grid)
            .expect("endpoints are in bounds");

        assert!(path.is_empty(), "a walled-off corner should yield no path");
    }

    #[test]
    fn test_out_of_bounds_endpoints() {
        let structure = fixture_structure();

        assert!(
            matches!(
                find_path(Coord::new(9, 9), Coord::new(0, 0), &structure, Encoding::Grid),
                Err(GridwayError::OutOfBounds {
                    coord: Coord { row: 9, col: 9 },
                    ..
                })
            ),
            "an out-of-bounds start should be rejected"
        );
        assert!(
            matches!(
                find_path(Coord::new(0, 0), Coord::new(0, 9), &structure, Encoding::Grid),
                Err(GridwayError::OutOfBounds { .. })
            ),
            "an out-of-bounds end should be rejected"
        );
    }

    #[test]
    fn test_identical_inputs_identical_paths() {
        let structure = fixture_structure();
        let first = find_path(Coord::new(0, 0), Coord::new(4, 8), &structure, Encoding::Grid)
            .expect("endpoints are in bounds");
        let second = find_path(Coord::new(0, 0), Coord::new(4, 8), &structure, Encoding::Grid)
            .expect("endpoints are in bounds");

        assert_eq!(first, second, "repeated searches should reproduce the path");
    }

    #[test]
    fn test_path_annotation_blocks_search() {
        // Code 2 marks a rendered path; a search over such cells must treat them as walls.
        let structure = Structure::from_rows(&[vec![0, 0, 0], vec![2, 2, 2], vec![0, 0, 0]])
            .expect("rows are rectangular");
        let path = find_path(Coord::new(0, 0), Coord::new(2, 0), &structure, Encoding::Grid)
            .expect("endpoints are in bounds");

        assert!(path.is_empty(), "path markers should block the search");
    }

    #[test]
    fn test_maze_walls_block_by_destination() {
        // The left wall on (0, 1) forbids entering it from the left, forcing the path down and
        // across instead.
        let structure = Structure::from_rows(&[vec![0, WALL_LEFT], vec![0, 0]])
            .expect("rows are rectangular");
        let path = find_path(Coord::new(0, 0), Coord::new(1, 1), &structure, Encoding::Maze)
            .expect("endpoints are in bounds");

        assert_eq!(path, vec![Coord::new(0, 0), Coord::new(1, 0), Coord::new(1, 1)]);
    }

    #[test]
    fn test_maze_walls_block_by_source() {
        // The left wall on (1, 1) blocks its own leftward move, so the path has to go up first.
        let structure = Structure::from_rows(&[vec![0, 0], vec![0, WALL_LEFT]])
            .expect("rows are rectangular");
        let path = find_path(Coord::new(1, 1), Coord::new(0, 0), &structure, Encoding::Maze)
            .expect("endpoints are in bounds");

        assert_eq!(path, vec![Coord::new(1, 1), Coord::new(0, 1), Coord::new(0, 0)]);
    }

    #[test]
    fn test_maze_fully_walled_cell_is_unreachable() {
        let walled = WALL_LEFT | WALL_TOP;
        let structure = Structure::from_rows(&[vec![0, WALL_LEFT], vec![0, walled]])
            .expect("rows are rectangular");
        let path = find_path(Coord::new(0, 0), Coord::new(1, 1), &structure, Encoding::Maze)
            .expect("endpoints are in bounds");

        assert!(path.is_empty(), "a fully walled cell should be unreachable");
    }

    #[test]
    fn test_search_stepping_matches_one_shot_run() {
        let structure = Structure::open_grid(3, 3);
        let start = Coord::new(0, 0);
        let end = Coord::new(2, 2);
        let mut search = Search::new(start, end, &structure, Encoding::Grid)
            .expect("endpoints are in bounds");

        let mut expanded = 0;
        let path = loop {
            match search.step() {
                StepOutcome::Expanded(_) => expanded += 1,
                StepOutcome::Found(path) => break path,
                StepOutcome::Exhausted => panic!("an open grid connects its corners"),
            }
        };

        assert!(expanded >= 1, "reaching the far corner should take expansions");
        assert_eq!(
            search.closed_len(),
            expanded,
            "the closed set should count one coordinate per expansion"
        );
        let one_shot = find_path(start, end, &structure, Encoding::Grid)
            .expect("endpoints are in bounds");
        assert_eq!(path, one_shot, "stepping should find the one-shot path");
    }

    #[test]
    fn test_search_stepping_exhausts() {
        let structure = Structure::from_rows(&[vec![0, 1, 1], vec![1, 1, 1], vec![1, 1, 0]])
            .expect("rows are rectangular");
        let mut search = Search::new(Coord::new(0, 0), Coord::new(2, 2), &structure, Encoding::Grid)
            .expect("endpoints are in bounds");

        assert_eq!(search.step(), StepOutcome::Expanded(Coord::new(0, 0)));
        assert_eq!(
            search.step(),
            StepOutcome::Exhausted,
            "an isolated start should exhaust on the second step"
        );
        assert_eq!(search.open_len(), 0, "no entries should remain queued");
    }
}
