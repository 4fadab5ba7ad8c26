//! Grid layout, positions and per-kind rewards.

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;

use crate::error::{Error, Result};

/// What occupies a grid cell. Determines both its reward and whether the
/// agent can enter it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Empty,
    Wall,
    Goal,
    Penalty,
}

impl CellKind {
    pub const ALL: [CellKind; 4] = [
        CellKind::Empty,
        CellKind::Wall,
        CellKind::Goal,
        CellKind::Penalty,
    ];

    fn index(self) -> usize {
        match self {
            CellKind::Empty => 0,
            CellKind::Wall => 1,
            CellKind::Goal => 2,
            CellKind::Penalty => 3,
        }
    }

    /// The short token used in textual grid layouts.
    pub fn token(self) -> &'static str {
        match self {
            CellKind::Empty => "WHITE",
            CellKind::Wall => "WALL",
            CellKind::Goal => "G",
            CellKind::Penalty => "B",
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for CellKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "WHITE" => Ok(CellKind::Empty),
            "WALL" => Ok(CellKind::Wall),
            "G" => Ok(CellKind::Goal),
            "B" => Ok(CellKind::Penalty),
            other => Err(Error::Config(format!("unknown cell token {:?}", other))),
        }
    }
}

/// A `(row, col)` cell address. Row 0 is the top of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub(crate) fn index(self) -> [usize; 2] {
        [self.row, self.col]
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// An immutable, rectangular `height x width` layout of cell kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cells: Array2<CellKind>,
}

impl Grid {
    /// Builds a grid from rows of cells.
    ///
    /// Fails with [`Error::Config`] if there are no rows, the first row is
    /// empty, or the rows have different lengths.
    pub fn new(rows: Vec<Vec<CellKind>>) -> Result<Self> {
        let height = rows.len();
        if height == 0 {
            return Err(Error::Config("grid has no rows".to_string()));
        }
        let width = rows[0].len();
        if width == 0 {
            return Err(Error::Config("grid has no columns".to_string()));
        }
        if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(Error::Config(format!(
                "row {} has {} cells, expected {}",
                row,
                cells.len(),
                width
            )));
        }

        let flat: Vec<CellKind> = rows.into_iter().flatten().collect();
        let cells = Array2::from_shape_vec((height, width), flat)
            .map_err(|e| Error::Config(e.to_string()))?;
        Ok(Self { cells })
    }

    /// Parses a grid written with the `G` / `B` / `WHITE` / `WALL` tokens.
    ///
    /// ```
    /// use gridmdp::{CellKind, Grid, Position};
    ///
    /// let grid = Grid::from_tokens(&[&["G", "WALL"], &["WHITE", "B"]]).unwrap();
    /// assert_eq!(grid.cell(Position::new(1, 1)), CellKind::Penalty);
    /// ```
    pub fn from_tokens<R, S>(rows: &[R]) -> Result<Self>
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let parsed = rows
            .iter()
            .map(|row| {
                row.as_ref()
                    .iter()
                    .map(|token| token.as_ref().parse())
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(parsed)
    }

    pub fn height(&self) -> usize {
        self.cells.nrows()
    }

    pub fn width(&self) -> usize {
        self.cells.ncols()
    }

    pub fn contains(&self, position: Position) -> bool {
        position.row < self.height() && position.col < self.width()
    }

    /// Kind of the cell at `position`.
    ///
    /// # Panics
    /// Panics if `position` lies outside the grid.
    pub fn cell(&self, position: Position) -> CellKind {
        self.cells[position.index()]
    }

    pub fn is_wall(&self, position: Position) -> bool {
        self.cell(position) == CellKind::Wall
    }

    /// All positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let width = self.width();
        (0..self.height()).flat_map(move |row| (0..width).map(move |col| Position::new(row, col)))
    }

    /// Every position the agent can occupy, row-major.
    pub fn open_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions().filter(move |&p| !self.is_wall(p))
    }

    /// Distinct kinds present in the grid, in [`CellKind::ALL`] order.
    pub fn kinds_present(&self) -> Vec<CellKind> {
        let mut seen = [false; 4];
        for kind in self.cells.iter() {
            seen[kind.index()] = true;
        }
        CellKind::ALL
            .into_iter()
            .filter(|k| seen[k.index()])
            .collect()
    }
}

/// Reward received for occupying a cell, keyed by its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardTable {
    values: [Option<f64>; 4],
}

impl RewardTable {
    /// A table with no rewards defined.
    pub fn empty() -> Self {
        Self { values: [None; 4] }
    }

    pub fn with(mut self, kind: CellKind, reward: f64) -> Self {
        self.set(kind, reward);
        self
    }

    pub fn set(&mut self, kind: CellKind, reward: f64) {
        self.values[kind.index()] = Some(reward);
    }

    pub fn get(&self, kind: CellKind) -> Option<f64> {
        self.values[kind.index()]
    }

    /// Reward for `kind`, or [`Error::MissingReward`].
    pub fn require(&self, kind: CellKind) -> Result<f64> {
        self.get(kind).ok_or(Error::MissingReward(kind))
    }

    /// Largest defined reward, if any.
    pub fn max(&self) -> Option<f64> {
        self.values.iter().flatten().copied().reduce(f64::max)
    }

    /// Checks that every kind present in `grid` has a reward.
    pub fn covers(&self, grid: &Grid) -> Result<()> {
        grid.kinds_present()
            .into_iter()
            .try_for_each(|kind| self.require(kind).map(|_| ()))
    }
}

impl Default for RewardTable {
    /// Goal +1, Penalty -1, Empty -0.05, Wall 0.
    fn default() -> Self {
        Self::empty()
            .with(CellKind::Goal, 1.0)
            .with(CellKind::Penalty, -1.0)
            .with(CellKind::Empty, -0.05)
            .with(CellKind::Wall, 0.0)
    }
}
