//! The fixed intended/slip transition model.

use crate::error::{Error, Result};
use crate::mdp::action::Action;
use crate::mdp::grid::{Grid, Position};

const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Outcome probabilities for an attempted move: the intended direction with
/// probability `intended`, and each of the two orthogonal directions with
/// probability `side`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionProfile {
    intended: f64,
    side: f64,
}

impl TransitionProfile {
    /// Creates a profile, checking `intended + 2 * side == 1` and that neither
    /// probability is negative.
    pub fn new(intended: f64, side: f64) -> Result<Self> {
        let valid = intended.is_finite()
            && side.is_finite()
            && intended >= 0.0
            && side >= 0.0
            && (intended + 2.0 * side - 1.0).abs() <= PROBABILITY_TOLERANCE;
        if !valid {
            return Err(Error::InvalidTransitionProfile { intended, side });
        }
        Ok(Self { intended, side })
    }

    /// Every move lands where intended.
    pub fn deterministic() -> Self {
        Self {
            intended: 1.0,
            side: 0.0,
        }
    }

    pub fn intended(&self) -> f64 {
        self.intended
    }

    pub fn side(&self) -> f64 {
        self.side
    }
}

impl Default for TransitionProfile {
    fn default() -> Self {
        Self {
            intended: 0.8,
            side: 0.1,
        }
    }
}

/// Where the agent lands when `action` succeeds from `position`.
///
/// Moves off the edge are clamped to the border; a move into a wall leaves
/// the agent at `position`.
pub fn move_position(position: Position, action: Action, grid: &Grid) -> Position {
    let (d_row, d_col) = action.delta();
    let clamp = |value: usize, delta: isize, len: usize| -> usize {
        value.saturating_add_signed(delta).min(len - 1)
    };
    let candidate = Position::new(
        clamp(position.row, d_row, grid.height()),
        clamp(position.col, d_col, grid.width()),
    );
    if grid.is_wall(candidate) {
        position
    } else {
        candidate
    }
}

/// The two actions orthogonal to `action`.
pub fn side_actions(action: Action) -> [Action; 2] {
    match action {
        Action::Up | Action::Down => [Action::Left, Action::Right],
        Action::Left | Action::Right => [Action::Up, Action::Down],
    }
}
