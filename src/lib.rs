//! Grid and maze pathfinding sandbox.
//!
//! This crate generates walkable structures, either randomized depth-first perfect mazes or
//! fully open grids, searches them with a deterministic A*, and reads and writes a small textual
//! file format for both. The `gridway` binary fronts the same operations on the command line.
//!
//! ```
//! use gridway::{find_path, Coord, Encoding, Structure};
//!
//! let structure = Structure::open_grid(9, 5);
//! let path = find_path(Coord::new(0, 0), Coord::new(4, 8), &structure, Encoding::Grid)?;
//!
//! assert_eq!(path.len(), 13);
//! # Ok::<(), gridway::GridwayError>(())
//! ```

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]
#![expect(
    unused_crate_dependencies,
    reason = "The color-eyre and env_logger dependencies are used in the binary crate."
)]

mod app;
mod file_loader;
mod generator;
mod grid;
mod pathfinding;
mod types;

pub use app::App;
pub use file_loader::{
    load_structure, parse_structure, save_structure, serialize_structure, StructureFile,
};
pub use generator::{generate_structure, Generated};
pub use grid::{Cell, Structure, WALL_LEFT, WALL_TOP};
pub use pathfinding::{find_path, Search, StepOutcome};
pub use types::{Coord, Direction, Encoding, GridwayError, Result};
