//! One-step lookahead over the slip model, and the synchronous sweep every
//! solver is built from.

use ndarray::Array2;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::mdp::action::Action;
use crate::mdp::grid::Position;
use crate::mdp::model::GridMdp;
use crate::mdp::transition::{move_position, side_actions};
use crate::mdp::utility::UtilityGrid;

/// Computes expected utilities of actions against a fixed utility snapshot.
#[derive(Debug, Clone, Copy)]
pub struct BellmanEvaluator<'m, 'a> {
    mdp: &'m GridMdp<'a>,
}

impl<'m, 'a> BellmanEvaluator<'m, 'a> {
    pub fn new(mdp: &'m GridMdp<'a>) -> Self {
        Self { mdp }
    }

    /// Expected utility of attempting `action` from `position`:
    /// `intended * U(move(action)) + side * (U(move(side_1)) + U(move(side_2)))`.
    ///
    /// The reward and discount are not applied here.
    pub fn expected_value(&self, position: Position, action: Action, utilities: &UtilityGrid) -> f64 {
        let grid = self.mdp.grid();
        let transitions = self.mdp.transitions();
        let mut value =
            transitions.intended() * utilities.get(move_position(position, action, grid));
        for side in side_actions(action) {
            value += transitions.side() * utilities.get(move_position(position, side, grid));
        }
        value
    }

    /// The action with the highest expected value, and that value.
    ///
    /// Actions are scanned in the order `Up, Down, Left, Right` and only a
    /// strictly greater value replaces the current best, so the first
    /// maximal action wins ties.
    pub fn best_action(&self, position: Position, utilities: &UtilityGrid) -> (Action, f64) {
        let mut best_action = Action::Up;
        let mut best_value = f64::NEG_INFINITY;
        for action in self.mdp.actions().iter() {
            let value = self.expected_value(position, action, utilities);
            if value > best_value {
                best_value = value;
                best_action = action;
            }
        }
        (best_action, best_value)
    }
}

/// Result of one synchronous sweep.
#[derive(Debug, Clone)]
pub(crate) struct Sweep {
    pub utilities: UtilityGrid,
    /// Action chosen for each open cell during the sweep.
    pub actions: Array2<Option<Action>>,
    /// Largest `|U'(s) - U(s)|` over open cells.
    pub delta: f64,
}

impl Sweep {
    /// Fails if the sweep produced a non-finite utility or change.
    ///
    /// `f64::max` skips NaN, so `delta` alone would not notice a NaN cell.
    pub(crate) fn ensure_finite(&self, solver: &str, index: usize) -> Result<()> {
        let finite = self.delta.is_finite()
            && self.utilities.as_array().iter().all(|u| u.is_finite());
        if !finite {
            return Err(Error::Derivation(format!(
                "{} sweep {} produced a non-finite utility (delta = {})",
                solver, index, self.delta
            )));
        }
        Ok(())
    }
}

/// Applies `update` to every open cell, reading only from `previous` and
/// writing into a fresh buffer. Walls stay at 0 and get no action.
///
/// `update` returns the new utility and the action it was based on.
pub(crate) fn synchronous_sweep<F>(mdp: &GridMdp<'_>, previous: &UtilityGrid, update: F) -> Sweep
where
    F: Fn(Position, &UtilityGrid) -> (f64, Action) + Sync,
{
    let grid = mdp.grid();
    let (height, width) = (grid.height(), grid.width());

    let compute_row = |row: usize| -> Vec<Option<(f64, Action)>> {
        (0..width)
            .map(|col| {
                let p = Position::new(row, col);
                if grid.is_wall(p) {
                    None
                } else {
                    Some(update(p, previous))
                }
            })
            .collect()
    };

    #[cfg(feature = "parallel")]
    let rows: Vec<_> = (0..height).into_par_iter().map(compute_row).collect();
    #[cfg(not(feature = "parallel"))]
    let rows: Vec<_> = (0..height).map(compute_row).collect();

    let mut utilities = UtilityGrid::zeros(height, width);
    let mut actions = Array2::from_elem((height, width), None);
    let mut delta = 0.0_f64;
    for (row, cells) in rows.into_iter().enumerate() {
        for (col, cell) in cells.into_iter().enumerate() {
            if let Some((value, action)) = cell {
                let p = Position::new(row, col);
                delta = delta.max((value - previous.get(p)).abs());
                utilities.set(p, value);
                actions[[row, col]] = Some(action);
            }
        }
    }

    Sweep {
        utilities,
        actions,
        delta,
    }
}
