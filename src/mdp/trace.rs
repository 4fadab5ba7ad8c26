//! Utility history of tracked cells across sweeps.

use crate::mdp::grid::{Grid, Position};
use crate::mdp::utility::UtilityGrid;

/// Per-position utility history, one entry appended per recorded sweep.
///
/// Positions are fixed at construction; [`IterationTrace::record`] appends
/// the current utility of each of them.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationTrace {
    positions: Vec<Position>,
    series: Vec<Vec<f64>>,
}

impl IterationTrace {
    pub fn new(positions: Vec<Position>) -> Self {
        let series = vec![Vec::new(); positions.len()];
        Self { positions, series }
    }

    /// Tracks every open cell of `grid`, row-major.
    pub fn for_open_cells(grid: &Grid) -> Self {
        Self::new(grid.open_positions().collect())
    }

    pub fn record(&mut self, utilities: &UtilityGrid) {
        for (position, series) in self.positions.iter().zip(self.series.iter_mut()) {
            series.push(utilities.get(*position));
        }
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// History for `position`, if it is tracked.
    pub fn series(&self, position: Position) -> Option<&[f64]> {
        self.positions
            .iter()
            .position(|p| *p == position)
            .map(|i| self.series[i].as_slice())
    }

    /// Number of recorded sweeps.
    pub fn sweeps(&self) -> usize {
        self.series.first().map_or(0, Vec::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, &[f64])> + '_ {
        self.positions
            .iter()
            .copied()
            .zip(self.series.iter().map(Vec::as_slice))
    }
}
