//! Structure file parsing, loading, and saving.
//!
//! The on-disk format is plain text: the first line holds the start coordinate and the second
//! line the end coordinate, each written as `row,col`, followed by one comma-separated line of
//! cell codes per structure row. Parsing is strict; any deviation is reported with the offending
//! line number rather than skipped over.

use std::{fs, io, path::Path};

use crate::{
    grid::Structure,
    types::{Coord, GridwayError, Result},
};

/// Parsed contents of a structure file.
///
/// This structure bundles the endpoints named in a file's header with the cell data they apply
/// to, exactly as read from or written to disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructureFile {
    /// Start coordinate from the first line.
    pub start: Coord,
    /// End coordinate from the second line.
    pub end: Coord,
    /// Cell rows from the remaining lines.
    pub structure: Structure,
}

/// Parses the textual structure format.
///
/// This function reads the two coordinate header lines and the cell rows beneath them, and
/// checks that both endpoints fall inside the parsed structure. Line numbers in errors are
/// 1-based positions in the whole input, header included.
///
/// # Errors
///
/// - [`GridwayError::MalformedFile`] when a header line is missing or unparseable, a cell code
///   is not an integer in `0..=255`, or the rows do not form a rectangle.
/// - [`GridwayError::OutOfBounds`] when an endpoint lies outside the parsed structure.
pub fn parse_structure(input: &str) -> Result<StructureFile> {
    let mut lines = input.lines();
    let start = parse_coord(lines.next(), 1)?;
    let end = parse_coord(lines.next(), 2)?;

    let rows = lines
        .enumerate()
        .map(|(index, text)| parse_row(text, index + 3))
        .collect::<Result<Vec<_>>>()?;
    // Row errors out of `from_rows` are numbered relative to the cell rows; shift them past the
    // two header lines.
    let structure = Structure::from_rows(&rows).map_err(|err| bump_line(err, 2))?;

    let file = StructureFile {
        start,
        end,
        structure,
    };
    for coord in [file.start, file.end] {
        if !file.structure.contains(coord) {
            return Err(GridwayError::OutOfBounds {
                coord,
                width: file.structure.width(),
                height: file.structure.height(),
            });
        }
    }

    Ok(file)
}

/// Loads and parses a structure file from disk.
///
/// # Errors
///
/// - [`GridwayError::FileNotFound`] when no file exists at the path.
/// - [`GridwayError::Io`] when the file exists but cannot be read.
/// - Any parse error from [`parse_structure`].
pub fn load_structure(path: &Path) -> Result<StructureFile> {
    let contents = fs::read_to_string(path).map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            GridwayError::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            GridwayError::Io(err)
        }
    })?;

    parse_structure(&contents)
}

/// Renders a structure file back into its textual format.
///
/// The output ends with a trailing newline and parses back to an equal [`StructureFile`].
#[must_use]
pub fn serialize_structure(file: &StructureFile) -> String {
    let mut lines = vec![
        format!("{},{}", file.start.row, file.start.col),
        format!("{},{}", file.end.row, file.end.col),
    ];
    for row in file.structure.rows() {
        let fields: Vec<String> = row.iter().map(u8::to_string).collect();
        lines.push(fields.join(","));
    }

    let mut output = lines.join("\n");
    output.push('\n');

    output
}

/// Writes a structure file to disk in the textual format.
///
/// # Errors
///
/// - [`GridwayError::Io`] when the file cannot be written.
pub fn save_structure(path: &Path, file: &StructureFile) -> Result<()> {
    fs::write(path, serialize_structure(file))?;

    Ok(())
}

/// Parses a `row,col` header line.
fn parse_coord(line: Option<&str>, line_number: usize) -> Result<Coord> {
    let Some(text) = line else {
        return Err(GridwayError::MalformedFile {
            line: line_number,
            reason: "missing coordinate line".to_owned(),
        });
    };
    let Some((row, col)) = text.trim().split_once(',') else {
        return Err(GridwayError::MalformedFile {
            line: line_number,
            reason: format!("expected a \"row,col\" coordinate, got {text:?}"),
        });
    };

    Ok(Coord::new(
        parse_index(row, line_number)?,
        parse_index(col, line_number)?,
    ))
}

/// Parses one coordinate component.
fn parse_index(text: &str, line_number: usize) -> Result<usize> {
    text.trim().parse().map_err(|err| GridwayError::MalformedFile {
        line: line_number,
        reason: format!("invalid coordinate component {text:?}: {err}"),
    })
}

/// Parses one comma-separated row of cell codes.
fn parse_row(text: &str, line_number: usize) -> Result<Vec<u8>> {
    text.split(',')
        .map(|field| {
            field
                .trim()
                .parse()
                .map_err(|err| GridwayError::MalformedFile {
                    line: line_number,
                    reason: format!("invalid cell code {field:?}: {err}"),
                })
        })
        .collect()
}

/// Shifts a row-relative malformed-line number to its position in the whole file.
fn bump_line(err: GridwayError, offset: usize) -> GridwayError {
    if let GridwayError::MalformedFile { line, reason } = err {
        GridwayError::MalformedFile {
            line: line + offset,
            reason,
        }
    } else {
        err
    }
}
