//! Utilities of a fixed policy, either to convergence or for a fixed number
//! of sweeps.

use log::{debug, trace};

use crate::error::Result;
use crate::mdp::bellman::{synchronous_sweep, BellmanEvaluator};
use crate::mdp::grid::Position;
use crate::mdp::model::{GridMdp, SolverConfig};
use crate::mdp::policy::Policy;
use crate::mdp::trace::IterationTrace;
use crate::mdp::utility::UtilityGrid;

/// How long an evaluation runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EvaluationMode {
    /// Sweep until the largest change is below `threshold`.
    Exact { threshold: f64 },
    /// Run exactly `sweeps` sweeps, whatever the change.
    Truncated { sweeps: usize },
}

/// Evaluates a fixed policy with synchronous sweeps of
/// `U'(s) = R(s) + gamma * E[U(s') | s, policy(s)]`.
#[derive(Debug, Clone, Copy)]
pub struct PolicyEvaluator<'m, 'a> {
    mdp: &'m GridMdp<'a>,
    gamma: f64,
    mode: EvaluationMode,
}

impl<'m, 'a> PolicyEvaluator<'m, 'a> {
    /// # Errors
    /// [`Error::InvalidConvergenceParameter`] if `gamma` is outside `[0, 1)`,
    /// an exact threshold is not positive and finite, or a truncated run has
    /// zero sweeps.
    ///
    /// [`Error::InvalidConvergenceParameter`]: crate::Error::InvalidConvergenceParameter
    pub fn new(mdp: &'m GridMdp<'a>, gamma: f64, mode: EvaluationMode) -> Result<Self> {
        match mode {
            EvaluationMode::Exact { threshold } => SolverConfig {
                gamma,
                threshold,
                ..SolverConfig::default()
            }
            .validate_threshold()?,
            EvaluationMode::Truncated { sweeps } => SolverConfig {
                gamma,
                evaluation_sweeps: sweeps,
                ..SolverConfig::default()
            }
            .validate_truncated()?,
        }
        Ok(Self { mdp, gamma, mode })
    }

    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    /// Refines `utilities` under `policy`, returning the new utilities and the
    /// number of sweeps run.
    ///
    /// `improvement_trace` receives the starting utilities once;
    /// `evaluation_trace` receives the pre-sweep utilities before every sweep.
    /// Open cells without an assigned action are evaluated as [`Up`].
    ///
    /// Fails with `Error::Config` if `policy` or `utilities` do not match the
    /// grid's shape, and with `Error::Derivation` if a sweep overflows.
    ///
    /// [`Up`]: crate::mdp::Action::Up
    pub fn evaluate(
        &self,
        policy: &Policy,
        utilities: UtilityGrid,
        evaluation_trace: &mut IterationTrace,
        improvement_trace: &mut IterationTrace,
    ) -> Result<(UtilityGrid, usize)> {
        self.mdp.check_shape("policy", policy.shape())?;
        self.mdp.check_shape("utilities", utilities.shape())?;
        improvement_trace.record(&utilities);

        let evaluator = BellmanEvaluator::new(self.mdp);
        let mdp = self.mdp;
        let gamma = self.gamma;
        let backup = |p: Position, u: &UtilityGrid| {
            let action = policy.action_or_default(p);
            (
                mdp.reward(p) + gamma * evaluator.expected_value(p, action, u),
                action,
            )
        };

        let mut current = utilities;
        let mut sweeps = 0;
        loop {
            if let EvaluationMode::Truncated { sweeps: k } = self.mode {
                if sweeps >= k {
                    break;
                }
            }

            evaluation_trace.record(&current);
            let sweep = synchronous_sweep(mdp, &current, &backup);
            sweeps += 1;
            sweep.ensure_finite("policy evaluation", sweeps)?;
            current = sweep.utilities;
            trace!("policy evaluation sweep {}: delta = {}", sweeps, sweep.delta);

            if let EvaluationMode::Exact { threshold } = self.mode {
                if sweep.delta < threshold {
                    break;
                }
            }
        }

        debug!("policy evaluation ({:?}) ran {} sweeps", self.mode, sweeps);
        Ok((current, sweeps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::mdp::action::{Action, ActionSet};
    use crate::mdp::grid::{CellKind, Grid, RewardTable};
    use crate::mdp::transition::TransitionProfile;
    use approx::assert_relative_eq;

    fn single_goal() -> Grid {
        Grid::from_tokens(&[["G"]]).unwrap()
    }

    #[test]
    fn test_exact_evaluation_converges_to_geometric_sum() {
        let grid = single_goal();
        let mdp = GridMdp::new(
            &grid,
            &RewardTable::default(),
            ActionSet::default(),
            TransitionProfile::default(),
        )
        .unwrap();
        let policy = Policy::uniform(&grid, Action::Up);
        let evaluator = PolicyEvaluator::new(&mdp, 0.5, EvaluationMode::Exact { threshold: 1e-9 })
            .unwrap();

        let mut eval_trace = IterationTrace::for_open_cells(&grid);
        let mut improv_trace = IterationTrace::for_open_cells(&grid);
        let (u, sweeps) = evaluator.evaluate(
            &policy,
            UtilityGrid::for_grid(&grid),
            &mut eval_trace,
            &mut improv_trace,
        )
        .unwrap();

        // U = 1 + 0.5 U  =>  U = 2
        assert_relative_eq!(u.get(Position::new(0, 0)), 2.0, epsilon = 1e-8);
        assert_eq!(eval_trace.sweeps(), sweeps);
        assert_eq!(improv_trace.sweeps(), 1);
        assert_eq!(eval_trace.series(Position::new(0, 0)).unwrap()[0], 0.0);
        assert_eq!(eval_trace.series(Position::new(0, 0)).unwrap()[1], 1.0);
    }

    #[test]
    fn test_truncated_evaluation_runs_exactly_k_sweeps() {
        let grid = single_goal();
        let mdp = GridMdp::new(
            &grid,
            &RewardTable::default(),
            ActionSet::default(),
            TransitionProfile::default(),
        )
        .unwrap();
        let policy = Policy::uniform(&grid, Action::Up);
        let evaluator = PolicyEvaluator::new(&mdp, 0.5, EvaluationMode::Truncated { sweeps: 3 })
            .unwrap();

        let mut eval_trace = IterationTrace::for_open_cells(&grid);
        let mut improv_trace = IterationTrace::for_open_cells(&grid);
        let (u, sweeps) = evaluator.evaluate(
            &policy,
            UtilityGrid::for_grid(&grid),
            &mut eval_trace,
            &mut improv_trace,
        )
        .unwrap();

        assert_eq!(sweeps, 3);
        // 1, 1.5, 1.75
        assert_relative_eq!(u.get(Position::new(0, 0)), 1.75, epsilon = 1e-12);
        assert_eq!(
            eval_trace.series(Position::new(0, 0)).unwrap(),
            &[0.0, 1.0, 1.5]
        );
    }

    #[test]
    fn test_unassigned_cells_follow_up() {
        let grid = Grid::from_tokens(&[["G"], ["WHITE"]]).unwrap();
        let mdp = GridMdp::new(
            &grid,
            &RewardTable::default(),
            ActionSet::default(),
            TransitionProfile::deterministic(),
        )
        .unwrap();
        let evaluator = PolicyEvaluator::new(&mdp, 0.9, EvaluationMode::Truncated { sweeps: 2 })
            .unwrap();
        let mut eval_trace = IterationTrace::for_open_cells(&grid);
        let mut improv_trace = IterationTrace::for_open_cells(&grid);
        let (u, _) = evaluator.evaluate(
            &Policy::empty(2, 1),
            UtilityGrid::for_grid(&grid),
            &mut eval_trace,
            &mut improv_trace,
        )
        .unwrap();
        // Second sweep: -0.05 + 0.9 * U(goal after one sweep) = -0.05 + 0.9
        assert_relative_eq!(u.get(Position::new(1, 0)), 0.85, epsilon = 1e-12);
    }

    #[test]
    fn test_non_terminating_evaluators_rejected() {
        let grid = single_goal();
        let mdp = GridMdp::new(
            &grid,
            &RewardTable::default(),
            ActionSet::default(),
            TransitionProfile::default(),
        )
        .unwrap();
        let invalid = [
            (0.9, EvaluationMode::Exact { threshold: 0.0 }),
            (0.9, EvaluationMode::Exact { threshold: f64::NAN }),
            (1.0, EvaluationMode::Exact { threshold: 0.01 }),
            (1.0, EvaluationMode::Truncated { sweeps: 5 }),
            (0.9, EvaluationMode::Truncated { sweeps: 0 }),
        ];
        for (gamma, mode) in invalid {
            assert!(
                matches!(
                    PolicyEvaluator::new(&mdp, gamma, mode),
                    Err(Error::InvalidConvergenceParameter(_))
                ),
                "accepted gamma {} with {:?}",
                gamma,
                mode
            );
        }
    }

    #[test]
    fn test_mismatched_shapes_rejected() {
        let grid = Grid::from_tokens(&[["G", "WHITE"]]).unwrap();
        let mdp = GridMdp::new(
            &grid,
            &RewardTable::default(),
            ActionSet::default(),
            TransitionProfile::default(),
        )
        .unwrap();
        let evaluator =
            PolicyEvaluator::new(&mdp, 0.9, EvaluationMode::Truncated { sweeps: 2 }).unwrap();
        let mut eval_trace = IterationTrace::for_open_cells(&grid);
        let mut improv_trace = IterationTrace::for_open_cells(&grid);

        let result = evaluator.evaluate(
            &Policy::empty(3, 3),
            UtilityGrid::for_grid(&grid),
            &mut eval_trace,
            &mut improv_trace,
        );
        assert!(matches!(result, Err(Error::Config(_))));

        let result = evaluator.evaluate(
            &Policy::uniform(&grid, Action::Up),
            UtilityGrid::zeros(2, 1),
            &mut eval_trace,
            &mut improv_trace,
        );
        assert!(matches!(result, Err(Error::Config(_))));
        assert_eq!(eval_trace.sweeps(), 0);
    }

    #[test]
    fn test_overflow_is_a_derivation_error() {
        let grid = single_goal();
        let rewards = RewardTable::default().with(CellKind::Goal, f64::MAX);
        let mdp = GridMdp::new(
            &grid,
            &rewards,
            ActionSet::default(),
            TransitionProfile::default(),
        )
        .unwrap();
        let evaluator =
            PolicyEvaluator::new(&mdp, 0.9, EvaluationMode::Truncated { sweeps: 10 }).unwrap();
        let mut eval_trace = IterationTrace::for_open_cells(&grid);
        let mut improv_trace = IterationTrace::for_open_cells(&grid);
        let result = evaluator.evaluate(
            &Policy::uniform(&grid, Action::Up),
            UtilityGrid::for_grid(&grid),
            &mut eval_trace,
            &mut improv_trace,
        );
        assert!(matches!(result, Err(Error::Derivation(_))));
    }
}
