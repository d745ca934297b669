//! Command-line interface and application driver.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::{debug, info, warn};
use rand::{Rng, SeedableRng as _};
use rand_chacha::ChaCha8Rng;

use crate::{
    file_loader::{self, StructureFile},
    generator::{self, Generated},
    grid::Structure,
    pathfinding,
    types::{Coord, Encoding, Result},
};

/// Upper bound on carve attempts before settling for a disconnected structure.
const MAX_CARVE_ATTEMPTS: usize = 64;

/// Terminal pathfinding sandbox.
///
/// This structure is the command-line entry point. Parsing it selects one of the generation or
/// solving subcommands, and [`run`](App::run) executes the selection.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct App {
    /// Selected subcommand.
    #[command(subcommand)]
    command: Command,
}

/// Subcommands of the sandbox.
#[derive(Debug, Subcommand)]
enum Command {
    /// Carve a random perfect maze and solve it.
    Maze(MazeArgs),
    /// Lay out a fully open structure and solve it.
    Blank(BlankArgs),
    /// Load a structure file and solve it.
    Solve(SolveArgs),
}

/// Arguments for the `maze` subcommand.
#[derive(Args, Debug)]
struct MazeArgs {
    /// Structure width in cells; even spans shrink by one
    #[arg(long, default_value = "21", value_parser = clap::value_parser!(u16).range(5..=999))]
    width: u16,

    /// Structure height in cells; even spans shrink by one
    #[arg(long, default_value = "15", value_parser = clap::value_parser!(u16).range(5..=999))]
    height: u16,

    /// Start coordinate as "row,col"; must lie inside the normalized span
    #[arg(long, value_parser = parse_coord_arg, default_value = "0,0")]
    start: Coord,

    /// End coordinate as "row,col"; clamped into bounds (default: bottom-right cell)
    #[arg(long, value_parser = parse_coord_arg)]
    end: Option<Coord>,

    /// Seed for the carve (uses a random seed if not specified)
    #[arg(long)]
    seed: Option<u64>,

    /// Write the carved structure to this file
    #[arg(long)]
    save: Option<PathBuf>,
}

/// Arguments for the `blank` subcommand.
#[derive(Args, Debug)]
struct BlankArgs {
    /// Structure width in cells
    #[arg(long, default_value = "21", value_parser = clap::value_parser!(u16).range(5..=999))]
    width: u16,

    /// Structure height in cells
    #[arg(long, default_value = "15", value_parser = clap::value_parser!(u16).range(5..=999))]
    height: u16,

    /// Start coordinate as "row,col"
    #[arg(long, value_parser = parse_coord_arg, default_value = "0,0")]
    start: Coord,

    /// End coordinate as "row,col" (default: bottom-right cell)
    #[arg(long, value_parser = parse_coord_arg)]
    end: Option<Coord>,

    /// Write the structure to this file
    #[arg(long)]
    save: Option<PathBuf>,
}

/// Arguments for the `solve` subcommand.
#[derive(Args, Debug)]
struct SolveArgs {
    /// Structure file to load
    file: PathBuf,

    /// Walkability model for the file's cell codes
    #[arg(long, value_enum, default_value = "grid")]
    encoding: Encoding,
}

impl App {
    /// Runs the selected subcommand.
    ///
    /// # Errors
    ///
    /// - Any [`GridwayError`](crate::GridwayError) from generation, search, or file handling.
    pub fn run(self) -> Result<()> {
        match self.command {
            Command::Maze(args) => run_maze(&args),
            Command::Blank(args) => run_blank(&args),
            Command::Solve(args) => run_solve(&args),
        }
    }
}

/// Carves a maze, solves it, and prints the result.
fn run_maze(args: &MazeArgs) -> Result<()> {
    let width = usize::from(args.width);
    let height = usize::from(args.height);
    let end = args
        .end
        .unwrap_or_else(|| Coord::new(height - 1, width - 1));
    let seed = args.seed.unwrap_or_else(rand::random);
    info!("carving {width}x{height} structure with seed {seed}");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let (generated, path) = carve_solvable(args.start, end, width, height, &mut rng)?;
    report_adjustments(&generated, end, width, height);
    print_solution(&generated.structure, &path, args.start, generated.end);

    if let Some(target) = &args.save {
        let file = StructureFile {
            start: args.start,
            end: generated.end,
            structure: generated.structure,
        };
        file_loader::save_structure(target, &file)?;
        info!("saved structure to {}", target.display());
    }

    Ok(())
}

/// Lays out an open structure, solves it, and prints the result.
fn run_blank(args: &BlankArgs) -> Result<()> {
    let width = usize::from(args.width);
    let height = usize::from(args.height);
    let end = args
        .end
        .unwrap_or_else(|| Coord::new(height - 1, width - 1));
    let structure = Structure::open_grid(width, height);

    let path = pathfinding::find_path(args.start, end, &structure, Encoding::Grid)?;
    print_solution(&structure, &path, args.start, end);

    if let Some(target) = &args.save {
        let file = StructureFile {
            start: args.start,
            end,
            structure,
        };
        file_loader::save_structure(target, &file)?;
        info!("saved structure to {}", target.display());
    }

    Ok(())
}

/// Loads a structure file, solves it, and prints the result.
fn run_solve(args: &SolveArgs) -> Result<()> {
    let file = file_loader::load_structure(&args.file)?;
    info!(
        "loaded {}x{} structure from {}",
        file.structure.width(),
        file.structure.height(),
        args.file.display()
    );
    let path = pathfinding::find_path(file.start, file.end, &file.structure, args.encoding)?;

    match args.encoding {
        Encoding::Grid => print_solution(&file.structure, &path, file.start, file.end),
        Encoding::Maze => {
            // Wall bits draw no meaningful glyphs, so maze solutions print as a coordinate list.
            if path.is_empty() {
                println!("no path connects {} to {}", file.start, file.end);
            } else {
                println!("{}", render_coord_list(&path));
                println!("path length: {} cells", path.len());
            }
        }
    }

    Ok(())
}

/// Carves structures until one connects the endpoints, up to a bounded number of attempts.
///
/// A clamped or off-lattice end is forced open in a spot the carve may never have linked up, so
/// a structure can come out with its endpoints disconnected. Carving again with fresh randomness
/// usually resolves that; once the attempts run out the last structure is returned along with the
/// empty path.
fn carve_solvable<R: Rng>(
    start: Coord,
    end: Coord,
    width: usize,
    height: usize,
    rng: &mut R,
) -> Result<(Generated, Vec<Coord>)> {
    let mut attempt = 0;

    loop {
        attempt += 1;
        let generated = generator::generate_structure(start, end, width, height, rng)?;
        let path =
            pathfinding::find_path(start, generated.end, &generated.structure, Encoding::Grid)?;

        if !path.is_empty() {
            return Ok((generated, path));
        }
        if attempt >= MAX_CARVE_ATTEMPTS {
            warn!("endpoints stayed disconnected after {MAX_CARVE_ATTEMPTS} attempts");
            return Ok((generated, path));
        }
        debug!("attempt {attempt}: endpoints disconnected, carving again");
    }
}

/// Logs the normalizations the generator applied to the request.
fn report_adjustments(generated: &Generated, end: Coord, width: usize, height: usize) {
    if generated.width != width || generated.height != height {
        info!(
            "adjusted even span to {}x{}",
            generated.width, generated.height
        );
    }
    if generated.end != end {
        info!("clamped end to {}", generated.end);
    }
}

/// Prints a solved structure with its path overlaid, or a note that none exists.
fn print_solution(structure: &Structure, path: &[Coord], start: Coord, end: Coord) {
    if path.is_empty() {
        println!("no path connects {start} to {end}");
    } else {
        print!("{}", structure.render_with_path(path));
        println!("path length: {} cells", path.len());
    }
}

/// Joins a path into a single arrow-separated line.
fn render_coord_list(path: &[Coord]) -> String {
    let steps: Vec<String> = path.iter().map(Coord::to_string).collect();

    steps.join(" -> ")
}

/// Parses a `row,col` command-line coordinate.
fn parse_coord_arg(text: &str) -> std::result::Result<Coord, String> {
    let Some((row, col)) = text.split_once(',') else {
        return Err(format!("expected \"row,col\", got {text:?}"));
    };
    let row = row
        .trim()
        .parse()
        .map_err(|err| format!("invalid row {row:?}: {err}"))?;
    let col = col
        .trim()
        .parse()
        .map_err(|err| format!("invalid column {col:?}: {err}"))?;

    Ok(Coord::new(row, col))
}
