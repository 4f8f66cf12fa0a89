#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns drawn grids and preset listings into critter paths.
//!
//! Validation is a function of the grid alone: every path-classified cell is
//! scored by the number of path-classified 4-neighbours it has. A grid forms a
//! single simple path when exactly two cells have one such neighbour, every
//! other path cell has two, and walking from one endpoint reaches every path
//! cell.

use critter_defence_core::{
    CellCoord, CellKind, EndpointChoice, Grid, Path, PathGraphError, PresetMap,
};

/// Degree statistics gathered from a grid in row-major scan order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphReport {
    path_cells: usize,
    interior_cells: usize,
    endpoints: Vec<CellCoord>,
    irregular: Vec<(CellCoord, usize)>,
}

impl GraphReport {
    /// Number of path-classified cells in the grid.
    #[must_use]
    pub const fn path_cells(&self) -> usize {
        self.path_cells
    }

    /// Number of cells with exactly two path neighbours.
    #[must_use]
    pub const fn interior_cells(&self) -> usize {
        self.interior_cells
    }

    /// Cells with exactly one path neighbour, in scan order.
    #[must_use]
    pub fn endpoints(&self) -> &[CellCoord] {
        &self.endpoints
    }

    /// Cells with zero or more than two path neighbours, with their degree.
    #[must_use]
    pub fn irregular(&self) -> &[(CellCoord, usize)] {
        &self.irregular
    }

    /// Resolves the two endpoint candidates offered to the player.
    ///
    /// Only the degree rules are checked here; [`validate`] additionally
    /// verifies that the cells form a single connected piece.
    pub fn candidates(&self) -> Result<Endpoints, PathGraphError> {
        if self.path_cells < 2 {
            return Err(PathGraphError::TooFewCells {
                found: self.path_cells,
            });
        }

        if let Some(&(cell, degree)) = self.irregular.first() {
            return Err(PathGraphError::Branching { cell, degree });
        }

        match self.endpoints.as_slice() {
            [first, second] => Ok(Endpoints {
                first: *first,
                second: *second,
            }),
            other => Err(PathGraphError::EndpointCount { found: other.len() }),
        }
    }
}

/// Pair of path endpoints, ordered by row-major scan position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Endpoints {
    first: CellCoord,
    second: CellCoord,
}

impl Endpoints {
    /// Endpoint found first in scan order.
    #[must_use]
    pub const fn first(&self) -> CellCoord {
        self.first
    }

    /// Endpoint found second in scan order.
    #[must_use]
    pub const fn second(&self) -> CellCoord {
        self.second
    }

    /// Splits the endpoints into `(start, end)` according to the choice.
    #[must_use]
    pub const fn oriented(&self, choice: EndpointChoice) -> (CellCoord, CellCoord) {
        match choice {
            EndpointChoice::First => (self.first, self.second),
            EndpointChoice::Second => (self.second, self.first),
        }
    }
}

/// Scores every path cell of the grid by its number of path neighbours.
#[must_use]
pub fn inspect(grid: &Grid) -> GraphReport {
    let mut report = GraphReport::default();

    for (cell, kind) in grid.iter() {
        if !kind.is_path() {
            continue;
        }

        report.path_cells += 1;
        match grid.path_neighbors(cell).count() {
            1 => report.endpoints.push(cell),
            2 => report.interior_cells += 1,
            degree => report.irregular.push((cell, degree)),
        }
    }

    report
}

/// Checks that the grid holds exactly one simple path and returns its endpoints.
pub fn validate(grid: &Grid) -> Result<Endpoints, PathGraphError> {
    let report = inspect(grid);
    let endpoints = report.candidates()?;

    let visited = walk(grid, endpoints.first()).len();
    if visited != report.path_cells() {
        return Err(PathGraphError::Disconnected {
            visited,
            total: report.path_cells(),
        });
    }

    Ok(endpoints)
}

/// Validates the grid and orders its cells from the chosen start endpoint.
pub fn build_from_editor(grid: &Grid, choice: EndpointChoice) -> Result<Path, PathGraphError> {
    let endpoints = validate(grid)?;
    let (start, _) = endpoints.oriented(choice);
    let cells = walk(grid, start);
    Path::new(cells).ok_or(PathGraphError::TooFewCells { found: 1 })
}

/// Builds the path of a preset on a grid of the provided (clamped) size.
///
/// Preset listings are taken as given; only bounds and length are checked.
pub fn build_from_preset(
    preset: &PresetMap,
    columns: u32,
    rows: u32,
) -> Result<Path, PathGraphError> {
    if let Some(cell) = preset
        .path
        .iter()
        .find(|cell| cell.column() >= columns || cell.row() >= rows)
    {
        return Err(PathGraphError::OutOfBounds { cell: *cell });
    }

    Path::new(preset.path.clone()).ok_or(PathGraphError::PathTooShort)
}

/// Stamps a path onto an all-scenery grid, collapsing endpoints into path cells.
#[must_use]
pub fn stamp(columns: u32, rows: u32, path: &Path) -> Grid {
    let mut grid = Grid::new(columns, rows);
    for cell in path.cells() {
        let _ = grid.set_kind(*cell, CellKind::Path);
    }
    grid
}

fn walk(grid: &Grid, start: CellCoord) -> Vec<CellCoord> {
    let mut ordered = vec![start];
    let mut previous: Option<CellCoord> = None;
    let mut current = start;

    loop {
        let next = grid
            .path_neighbors(current)
            .find(|neighbor| Some(*neighbor) != previous);
        let Some(next) = next else {
            break;
        };
        if next == start {
            break;
        }
        ordered.push(next);
        previous = Some(current);
        current = next;
    }

    ordered
}
