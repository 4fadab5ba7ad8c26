//! Dense per-cell utilities.

use std::fmt;

use ndarray::Array2;

use crate::mdp::grid::{Grid, Position};

/// Dense `height x width` matrix of utilities, one per cell.
///
/// Wall cells are never read by the solvers and stay at 0.
#[derive(Debug, Clone, PartialEq)]
pub struct UtilityGrid {
    values: Array2<f64>,
}

impl UtilityGrid {
    pub fn zeros(height: usize, width: usize) -> Self {
        Self {
            values: Array2::zeros((height, width)),
        }
    }

    pub fn for_grid(grid: &Grid) -> Self {
        Self::zeros(grid.height(), grid.width())
    }

    pub fn from_array(values: Array2<f64>) -> Self {
        Self { values }
    }

    pub fn get(&self, position: Position) -> f64 {
        self.values[position.index()]
    }

    pub fn set(&mut self, position: Position, value: f64) {
        self.values[position.index()] = value;
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn into_array(self) -> Array2<f64> {
        self.values
    }

    /// Largest absolute difference over the open cells of `grid`.
    pub fn max_abs_diff(&self, other: &UtilityGrid, grid: &Grid) -> f64 {
        grid.open_positions()
            .map(|p| (self.get(p) - other.get(p)).abs())
            .fold(0.0, f64::max)
    }

    /// Renders the utilities as a markdown table with row and column indices.
    /// Exact zeros print as `0`, everything else with six decimals.
    pub fn to_markdown_table(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for UtilityGrid {
    /// Same output as [`UtilityGrid::to_markdown_table`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (height, width) = self.shape();
        write!(f, "# UTILITY VALUE OF ALL STATES\n\n|   |")?;
        for col in 0..width {
            write!(f, " {} |", col)?;
        }
        writeln!(f, "\n|---|{}", "---|".repeat(width))?;

        for row in 0..height {
            write!(f, "| {} |", row)?;
            for col in 0..width {
                let value = self.values[[row, col]];
                if value == 0.0 {
                    write!(f, " 0 |")?;
                } else {
                    write!(f, " {:.6} |", value)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
