//! Maze data model and the plain-text maze format.
//!
//! A maze file starts with the dimension `n` on its own line, followed by `n`
//! rows of `n` symbols each:
//!
//! - `0`: free cell
//! - `1`: wall
//! - `E`: entrance
//! - `S`: exit
//!
//! Whitespace inside a row is ignored, so `0 1 0` and `010` are equivalent.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Cost of an orthogonal (N, E, S, W) move.
pub const ORTHOGONAL_COST: f64 = 1.0;

/// Cost of a diagonal move (approximation of sqrt(2)).
pub const DIAGONAL_COST: f64 = 1.4;

/// Kind of a single maze cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Free,
    Wall,
    Entrance,
    Exit,
}

impl Cell {
    /// Parse a maze file symbol.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '0' => Some(Cell::Free),
            '1' => Some(Cell::Wall),
            'E' => Some(Cell::Entrance),
            'S' => Some(Cell::Exit),
            _ => None,
        }
    }

    /// Symbol used for this cell in the maze file format.
    pub fn symbol(self) -> char {
        match self {
            Cell::Free => '0',
            Cell::Wall => '1',
            Cell::Entrance => 'E',
            Cell::Exit => 'S',
        }
    }

    /// Whether a walker may stand on this cell.
    #[inline]
    pub fn is_passable(self) -> bool {
        !matches!(self, Cell::Wall)
    }
}

/// Grid coordinate as `(row, col)`.
///
/// Coordinates are signed so that a step off the grid is still representable;
/// whether a position lies inside a maze is decided by the maze itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    #[inline]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Position one step away in `direction`.
    #[inline]
    pub fn step(self, direction: Direction) -> Self {
        let (drow, dcol) = direction.offset();
        Self::new(self.row + drow, self.col + dcol)
    }

    /// Manhattan (L1) distance.
    #[inline]
    pub fn manhattan(self, other: Position) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }
}

impl From<(i32, i32)> for Position {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

impl From<Position> for (i32, i32) {
    fn from(p: Position) -> Self {
        (p.row, p.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the eight movement directions.
///
/// The discriminant is the gene value used by chromosomes, so the order is
/// part of the data format and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    N = 0,
    NE = 1,
    E = 2,
    SE = 3,
    S = 4,
    SW = 5,
    W = 6,
    NW = 7,
}

impl Direction {
    /// All directions in gene order.
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    /// Number of distinct directions (and gene values).
    pub const COUNT: u8 = 8;

    /// Direction for a gene value, if it is in range.
    #[inline]
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// `(drow, dcol)` offset. North decreases the row.
    #[inline]
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::N => (-1, 0),
            Direction::NE => (-1, 1),
            Direction::E => (0, 1),
            Direction::SE => (1, 1),
            Direction::S => (1, 0),
            Direction::SW => (1, -1),
            Direction::W => (0, -1),
            Direction::NW => (-1, -1),
        }
    }

    #[inline]
    pub fn is_diagonal(self) -> bool {
        let (drow, dcol) = self.offset();
        drow != 0 && dcol != 0
    }

    /// Movement cost of one step in this direction.
    #[inline]
    pub fn cost(self) -> f64 {
        if self.is_diagonal() {
            DIAGONAL_COST
        } else {
            ORTHOGONAL_COST
        }
    }
}

/// Immutable square maze.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Maze {
    size: usize,
    cells: Vec<Cell>,
    entrance: Position,
    exit: Position,
}

impl Maze {
    /// Build a maze from row-major cells, locating the entrance and exit.
    pub fn new(size: usize, cells: Vec<Cell>) -> Result<Self, MazeError> {
        let expected =
            cell_count(size).ok_or_else(|| MazeError::InvalidDimension(size.to_string()))?;
        if cells.len() != expected {
            return Err(MazeError::CellCount {
                expected,
                found: cells.len(),
            });
        }

        let locate = |kind: Cell| -> Result<Position, MazeError> {
            let mut found = cells
                .iter()
                .enumerate()
                .filter(|&(_, &cell)| cell == kind)
                .map(|(i, _)| Position::new((i / size) as i32, (i % size) as i32));
            let first = found.next().ok_or(MazeError::Missing(kind.symbol()))?;
            if let Some(second) = found.next() {
                return Err(MazeError::Duplicate {
                    symbol: kind.symbol(),
                    first,
                    second,
                });
            }
            Ok(first)
        };

        let entrance = locate(Cell::Entrance)?;
        let exit = locate(Cell::Exit)?;

        Ok(Self {
            size,
            cells,
            entrance,
            exit,
        })
    }

    /// Parse the plain-text maze format.
    pub fn parse(text: &str) -> Result<Self, MazeError> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());

        let header = lines.next().ok_or(MazeError::Empty)?.trim();
        let size: usize = header
            .parse()
            .map_err(|_| MazeError::InvalidDimension(header.to_string()))?;
        let expected =
            cell_count(size).ok_or_else(|| MazeError::InvalidDimension(header.to_string()))?;

        // The header is untrusted; never reserve more than the text can hold.
        let mut cells = Vec::with_capacity(expected.min(text.len()));
        for row in 0..size {
            let line = lines.next().ok_or(MazeError::RowCount {
                expected: size,
                found: row,
            })?;

            let mut width = 0;
            for (column, symbol) in line.chars().filter(|c| !c.is_whitespace()).enumerate() {
                let cell = Cell::from_symbol(symbol).ok_or(MazeError::UnknownSymbol {
                    symbol,
                    row,
                    column,
                })?;
                cells.push(cell);
                width += 1;
            }

            if width != size {
                return Err(MazeError::RowWidth {
                    row,
                    expected: size,
                    found: width,
                });
            }
        }

        Maze::new(size, cells)
    }

    /// Read and parse a maze file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MazeError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Dimension `n` of the `n x n` grid.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn entrance(&self) -> Position {
        self.entrance
    }

    #[inline]
    pub fn exit(&self) -> Position {
        self.exit
    }

    /// Whether both coordinates lie in `[0, n)`.
    #[inline]
    pub fn contains(&self, p: Position) -> bool {
        let n = self.size as i32;
        (0..n).contains(&p.row) && (0..n).contains(&p.col)
    }

    /// Cell at `p`, or `None` when `p` is out of bounds.
    #[inline]
    pub fn cell(&self, p: Position) -> Option<Cell> {
        if self.contains(p) {
            Some(self.cells[p.row as usize * self.size + p.col as usize])
        } else {
            None
        }
    }

    /// Iterate over rows of cells.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.size)
    }
}

/// Cell count of an `n x n` grid, or `None` when `n` is zero or too large
/// for `i32` coordinates.
fn cell_count(size: usize) -> Option<usize> {
    if size == 0 || i32::try_from(size).is_err() {
        return None;
    }
    size.checked_mul(size)
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.size)?;
        for row in self.rows() {
            let line: String = row.iter().map(|c| c.symbol()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Maze construction and parsing errors.
#[derive(Debug, thiserror::Error)]
pub enum MazeError {
    #[error("Failed to read maze file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Maze description is empty")]
    Empty,
    #[error("Invalid maze dimension: {0:?}")]
    InvalidDimension(String),
    #[error("Expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },
    #[error("Row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Expected {expected} cells, found {found}")]
    CellCount { expected: usize, found: usize },
    #[error("Unknown symbol {symbol:?} at row {row}, column {column}")]
    UnknownSymbol {
        symbol: char,
        row: usize,
        column: usize,
    },
    #[error("Maze has no '{0}' cell")]
    Missing(char),
    #[error("Maze has more than one '{symbol}' cell: {first} and {second}")]
    Duplicate {
        symbol: char,
        first: Position,
        second: Position,
    },
}
