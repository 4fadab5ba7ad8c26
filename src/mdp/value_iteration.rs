//! Value iteration: repeated synchronous Bellman optimality backups until the
//! largest utility change falls below the threshold.

use log::{info, trace};

use crate::error::{Error, Result};
use crate::mdp::action::{Action, ActionSet};
use crate::mdp::bellman::{synchronous_sweep, BellmanEvaluator};
use crate::mdp::grid::{Grid, Position, RewardTable};
use crate::mdp::model::{GridMdp, SolverConfig};
use crate::mdp::policy::Policy;
use crate::mdp::trace::IterationTrace;
use crate::mdp::transition::TransitionProfile;
use crate::mdp::utility::UtilityGrid;

/// Output of [`solve_value_iteration`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValueIterationResult {
    pub utilities: UtilityGrid,
    /// Greedy actions recorded during the final sweep
    pub policy: Policy,
    /// Pre-sweep utility of every open cell, one entry per sweep
    pub trace: IterationTrace,
    pub sweeps: usize,
    /// Largest change in the final sweep; always below the threshold
    pub final_delta: f64,
}

impl GridMdp<'_> {
    /// Runs value iteration from all-zero utilities.
    pub fn value_iteration(&self, config: &SolverConfig) -> Result<ValueIterationResult> {
        self.value_iteration_from(UtilityGrid::for_grid(self.grid()), config)
    }

    /// Runs value iteration starting from `initial`.
    ///
    /// Starting from an already converged grid finishes after a single sweep.
    /// `initial` must have the grid's shape and hold only finite values.
    pub fn value_iteration_from(
        &self,
        initial: UtilityGrid,
        config: &SolverConfig,
    ) -> Result<ValueIterationResult> {
        config.validate_threshold()?;
        self.check_shape("initial utilities", initial.shape())?;
        if initial.as_array().iter().any(|u| !u.is_finite()) {
            return Err(Error::Config(
                "initial utilities must be finite".to_string(),
            ));
        }

        let evaluator = BellmanEvaluator::new(self);
        let gamma = config.gamma;
        let backup = |p: Position, u: &UtilityGrid| {
            let (action, value) = evaluator.best_action(p, u);
            (self.reward(p) + gamma * value, action)
        };

        let mut trace = IterationTrace::for_open_cells(self.grid());
        let mut utilities = initial;
        let mut sweeps = 0;
        loop {
            trace.record(&utilities);
            let sweep = synchronous_sweep(self, &utilities, &backup);
            sweeps += 1;
            sweep.ensure_finite("value iteration", sweeps)?;
            utilities = sweep.utilities;
            trace!("value iteration sweep {}: delta = {}", sweeps, sweep.delta);

            if sweep.delta < config.threshold {
                info!("Value Iteration converged after {} iterations", sweeps);
                let mut policy = Policy::empty(self.grid().height(), self.grid().width());
                for p in self.grid().open_positions() {
                    if let Some(action) = sweep.actions[p.index()] {
                        policy.set(p, action);
                    }
                }
                return Ok(ValueIterationResult {
                    utilities,
                    policy,
                    trace,
                    sweeps,
                    final_delta: sweep.delta,
                });
            }
        }
    }
}

/// Solves the grid world with value iteration.
///
/// # Examples
///
/// ```
/// use gridmdp::{solve_value_iteration, Action, Grid, Position, RewardTable, TransitionProfile};
///
/// let grid = Grid::from_tokens(&[["WHITE", "G"]]).unwrap();
/// let result = solve_value_iteration(
///     &grid,
///     &RewardTable::default(),
///     &Action::ALL,
///     TransitionProfile::default(),
///     0.9,
///     1e-6,
/// )
/// .unwrap();
/// assert_eq!(result.policy.get(Position::new(0, 0)), Some(Action::Right));
/// ```
///
/// # Errors
/// Fails before the first sweep if the grid lacks rewards, the action list is
/// incomplete, or `gamma`/`threshold` would not terminate. A sweep that
/// overflows to a non-finite utility ends the run with [`Error::Derivation`].
pub fn solve_value_iteration(
    grid: &Grid,
    rewards: &RewardTable,
    actions: &[Action],
    transitions: TransitionProfile,
    gamma: f64,
    threshold: f64,
) -> Result<ValueIterationResult> {
    let mdp = GridMdp::new(grid, rewards, ActionSet::new(actions)?, transitions)?;
    let config = SolverConfig {
        gamma,
        threshold,
        ..SolverConfig::default()
    };
    mdp.value_iteration(&config)
}
