//! A validated grid-world problem and the knobs the solvers take.

use ndarray::Array2;

use crate::error::{Error, Result};
use crate::mdp::action::ActionSet;
use crate::mdp::grid::{Grid, Position, RewardTable};
use crate::mdp::threshold::derive_threshold;
use crate::mdp::transition::TransitionProfile;

/// Configuration options shared by the three solvers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Discount factor, `0 <= gamma < 1`
    pub gamma: f64,
    /// Sweeps stop once the largest utility change drops below this
    pub threshold: f64,
    /// Number of evaluation sweeps per round in modified policy iteration
    pub evaluation_sweeps: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            threshold: 0.01,
            evaluation_sweeps: 50,
        }
    }
}

impl SolverConfig {
    /// A config whose threshold is derived from the precision constant `c`.
    pub fn with_precision(c: f64, rewards: &RewardTable, gamma: f64) -> Result<Self> {
        Ok(Self {
            gamma,
            threshold: derive_threshold(c, rewards, gamma)?,
            ..Self::default()
        })
    }

    fn validate_gamma(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.gamma) {
            return Err(Error::InvalidConvergenceParameter(format!(
                "gamma must lie in [0, 1), got {}",
                self.gamma
            )));
        }
        Ok(())
    }

    /// Checks the parameters of the threshold-terminated solvers.
    pub fn validate_threshold(&self) -> Result<()> {
        self.validate_gamma()?;
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(Error::InvalidConvergenceParameter(format!(
                "threshold must be positive and finite, got {}",
                self.threshold
            )));
        }
        Ok(())
    }

    /// Checks the parameters of modified policy iteration.
    pub fn validate_truncated(&self) -> Result<()> {
        self.validate_gamma()?;
        if self.evaluation_sweeps == 0 {
            return Err(Error::InvalidConvergenceParameter(
                "evaluation sweep count k must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A grid world ready to be solved.
///
/// Borrows the caller's grid; rewards are resolved per cell up front so a
/// missing entry is reported before any sweep runs.
#[derive(Debug, Clone)]
pub struct GridMdp<'a> {
    grid: &'a Grid,
    actions: ActionSet,
    transitions: TransitionProfile,
    rewards: Array2<f64>,
}

impl<'a> GridMdp<'a> {
    pub fn new(
        grid: &'a Grid,
        rewards: &RewardTable,
        actions: ActionSet,
        transitions: TransitionProfile,
    ) -> Result<Self> {
        rewards.covers(grid)?;
        for kind in grid.kinds_present() {
            let reward = rewards.require(kind)?;
            if !reward.is_finite() {
                return Err(Error::Config(format!(
                    "reward for {} must be finite, got {}",
                    kind, reward
                )));
            }
        }
        let mut resolved = Array2::zeros((grid.height(), grid.width()));
        for p in grid.positions() {
            resolved[p.index()] = rewards.require(grid.cell(p))?;
        }
        Ok(Self {
            grid,
            actions,
            transitions,
            rewards: resolved,
        })
    }

    pub fn grid(&self) -> &'a Grid {
        self.grid
    }

    pub fn actions(&self) -> &ActionSet {
        &self.actions
    }

    pub fn transitions(&self) -> &TransitionProfile {
        &self.transitions
    }

    /// Reward for occupying `position`.
    pub fn reward(&self, position: Position) -> f64 {
        self.rewards[position.index()]
    }

    /// Fails unless `shape` is the `(height, width)` of the grid.
    pub(crate) fn check_shape(&self, what: &str, shape: (usize, usize)) -> Result<()> {
        let expected = (self.grid.height(), self.grid.width());
        if shape != expected {
            return Err(Error::Config(format!(
                "{} is {}x{} but the grid is {}x{}",
                what, shape.0, shape.1, expected.0, expected.1
            )));
        }
        Ok(())
    }
}
