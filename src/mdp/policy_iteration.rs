//! Policy iteration and its truncated-evaluation variant.
//!
//! Both alternate between evaluating the current policy and greedily
//! improving it, stopping once an improvement round leaves every action
//! unchanged. With exact evaluation this terminates on any finite grid.
//! With truncated evaluation termination is observed in practice but is not
//! guaranteed for every `k`.

use log::{debug, info};

use crate::error::Result;
use crate::mdp::action::{Action, ActionSet};
use crate::mdp::bellman::BellmanEvaluator;
use crate::mdp::grid::{Grid, RewardTable};
use crate::mdp::model::{GridMdp, SolverConfig};
use crate::mdp::policy::Policy;
use crate::mdp::policy_evaluation::{EvaluationMode, PolicyEvaluator};
use crate::mdp::trace::IterationTrace;
use crate::mdp::transition::TransitionProfile;
use crate::mdp::utility::UtilityGrid;

/// Output of [`solve_policy_iteration`] and [`solve_policy_iteration_modified`].
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyIterationResult {
    pub utilities: UtilityGrid,
    pub policy: Policy,
    /// One entry per evaluation sweep, across all rounds
    pub evaluation_trace: IterationTrace,
    /// One entry per improvement round, taken before that round's evaluation
    pub improvement_trace: IterationTrace,
    pub evaluation_sweeps: usize,
    pub improvement_rounds: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Evaluate,
    Improve,
    Converged,
}

impl GridMdp<'_> {
    /// Policy iteration with evaluation run to `config.threshold`.
    pub fn policy_iteration(&self, config: &SolverConfig) -> Result<PolicyIterationResult> {
        let mode = EvaluationMode::Exact {
            threshold: config.threshold,
        };
        self.iterate_policy(config.gamma, mode, "Policy Iteration")
    }

    /// Policy iteration with evaluation truncated to `config.evaluation_sweeps`
    /// sweeps per round. `config.threshold` is ignored.
    pub fn modified_policy_iteration(&self, config: &SolverConfig) -> Result<PolicyIterationResult> {
        let mode = EvaluationMode::Truncated {
            sweeps: config.evaluation_sweeps,
        };
        self.iterate_policy(config.gamma, mode, "Modified Policy Iteration")
    }

    fn iterate_policy(
        &self,
        gamma: f64,
        mode: EvaluationMode,
        name: &str,
    ) -> Result<PolicyIterationResult> {
        let grid = self.grid();
        let evaluator = PolicyEvaluator::new(self, gamma, mode)?;
        let bellman = BellmanEvaluator::new(self);

        let mut utilities = UtilityGrid::for_grid(grid);
        let mut policy = Policy::uniform(grid, Action::Up);
        let mut evaluation_trace = IterationTrace::for_open_cells(grid);
        let mut improvement_trace = IterationTrace::for_open_cells(grid);
        let mut evaluation_sweeps = 0;
        let mut improvement_rounds = 0;

        let mut phase = Phase::Evaluate;
        while phase != Phase::Converged {
            phase = match phase {
                Phase::Evaluate => {
                    let (evaluated, sweeps) = evaluator.evaluate(
                        &policy,
                        utilities,
                        &mut evaluation_trace,
                        &mut improvement_trace,
                    )?;
                    utilities = evaluated;
                    evaluation_sweeps += sweeps;
                    Phase::Improve
                }
                Phase::Improve => {
                    improvement_rounds += 1;
                    // Every best action is computed from the same utilities, so
                    // the order cells are visited in does not matter.
                    let mut changed = 0;
                    for p in grid.open_positions() {
                        let (best, _) = bellman.best_action(p, &utilities);
                        if policy.get(p) != Some(best) {
                            changed += 1;
                        }
                        policy.set(p, best);
                    }
                    debug!(
                        "improvement round {}: {} actions changed",
                        improvement_rounds, changed
                    );
                    if changed == 0 {
                        Phase::Converged
                    } else {
                        Phase::Evaluate
                    }
                }
                Phase::Converged => Phase::Converged,
            };
        }

        info!(
            "{} converged after {} policy evaluation iterations and {} policy improvement iterations",
            name, evaluation_sweeps, improvement_rounds
        );
        Ok(PolicyIterationResult {
            utilities,
            policy,
            evaluation_trace,
            improvement_trace,
            evaluation_sweeps,
            improvement_rounds,
        })
    }
}

/// Solves the grid world with policy iteration, evaluating each policy until
/// the largest utility change is below `threshold`.
///
/// # Errors
/// Fails before any sweep on missing rewards, an incomplete action list, or
/// `gamma`/`threshold` values that would not terminate. An evaluation sweep
/// that overflows to a non-finite utility ends the run with
/// [`Error::Derivation`](crate::Error::Derivation).
pub fn solve_policy_iteration(
    grid: &Grid,
    rewards: &RewardTable,
    actions: &[Action],
    transitions: TransitionProfile,
    gamma: f64,
    threshold: f64,
) -> Result<PolicyIterationResult> {
    let mdp = GridMdp::new(grid, rewards, ActionSet::new(actions)?, transitions)?;
    let config = SolverConfig {
        gamma,
        threshold,
        ..SolverConfig::default()
    };
    mdp.policy_iteration(&config)
}

/// Solves the grid world with modified policy iteration: every evaluation
/// runs exactly `k` sweeps.
///
/// # Errors
/// As [`solve_policy_iteration`], with `k == 0` rejected instead of the
/// threshold check.
pub fn solve_policy_iteration_modified(
    grid: &Grid,
    rewards: &RewardTable,
    actions: &[Action],
    transitions: TransitionProfile,
    gamma: f64,
    k: usize,
) -> Result<PolicyIterationResult> {
    let mdp = GridMdp::new(grid, rewards, ActionSet::new(actions)?, transitions)?;
    let config = SolverConfig {
        gamma,
        evaluation_sweeps: k,
        ..SolverConfig::default()
    };
    mdp.modified_policy_iteration(&config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::mdp::grid::{CellKind, Position};

    fn strip() -> Grid {
        Grid::from_tokens(&[["B", "WHITE", "WHITE", "G"]]).unwrap()
    }

    #[test]
    fn test_policy_heads_for_goal() {
        let grid = strip();
        let result = solve_policy_iteration(
            &grid,
            &RewardTable::default(),
            &Action::ALL,
            TransitionProfile::default(),
            0.9,
            1e-6,
        )
        .unwrap();
        assert_eq!(result.policy.get(Position::new(0, 1)), Some(Action::Right));
        assert_eq!(result.policy.get(Position::new(0, 2)), Some(Action::Right));
        assert!(result.improvement_rounds >= 2);
    }

    #[test]
    fn test_trace_lengths_match_counters() {
        let grid = strip();
        let result = solve_policy_iteration_modified(
            &grid,
            &RewardTable::default(),
            &Action::ALL,
            TransitionProfile::default(),
            0.9,
            5,
        )
        .unwrap();
        assert_eq!(result.evaluation_trace.sweeps(), result.evaluation_sweeps);
        assert_eq!(result.improvement_trace.sweeps(), result.improvement_rounds);
        assert_eq!(result.evaluation_sweeps, 5 * result.improvement_rounds);
        for (_, series) in result.improvement_trace.iter() {
            assert_eq!(series[0], 0.0);
        }
    }

    #[test]
    fn test_improvement_trace_samples_round_starts() {
        let grid = strip();
        let result = solve_policy_iteration_modified(
            &grid,
            &RewardTable::default(),
            &Action::ALL,
            TransitionProfile::default(),
            0.9,
            3,
        )
        .unwrap();
        for (position, improvement) in result.improvement_trace.iter() {
            let evaluation = result.evaluation_trace.series(position).unwrap();
            for (round, value) in improvement.iter().enumerate() {
                assert_eq!(*value, evaluation[round * 3]);
            }
        }
    }

    #[test]
    fn test_zero_k_rejected() {
        let grid = strip();
        let result = solve_policy_iteration_modified(
            &grid,
            &RewardTable::default(),
            &Action::ALL,
            TransitionProfile::default(),
            0.9,
            0,
        );
        assert!(matches!(result, Err(Error::InvalidConvergenceParameter(_))));
    }

    #[test]
    fn test_incomplete_actions_rejected() {
        let grid = strip();
        let result = solve_policy_iteration(
            &grid,
            &RewardTable::default(),
            &[Action::Left, Action::Right],
            TransitionProfile::default(),
            0.9,
            0.01,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_profile_rejected_at_construction() {
        assert!(matches!(
            TransitionProfile::new(0.9, 0.1),
            Err(Error::InvalidTransitionProfile { .. })
        ));
    }

    #[test]
    fn test_non_finite_rewards_rejected() {
        let grid = strip();
        for bad in [f64::NAN, f64::NEG_INFINITY] {
            let rewards = RewardTable::default().with(CellKind::Penalty, bad);
            let exact = solve_policy_iteration(
                &grid,
                &rewards,
                &Action::ALL,
                TransitionProfile::default(),
                0.9,
                0.01,
            );
            assert!(matches!(exact, Err(Error::Config(_))));
            let truncated = solve_policy_iteration_modified(
                &grid,
                &rewards,
                &Action::ALL,
                TransitionProfile::default(),
                0.9,
                5,
            );
            assert!(matches!(truncated, Err(Error::Config(_))));
        }
    }

    #[test]
    fn test_overflow_is_a_derivation_error() {
        let grid = strip();
        let rewards = RewardTable::default().with(CellKind::Goal, f64::MAX);
        let exact = solve_policy_iteration(
            &grid,
            &rewards,
            &Action::ALL,
            TransitionProfile::default(),
            0.9,
            0.01,
        );
        assert!(matches!(exact, Err(Error::Derivation(_))));
        let truncated = solve_policy_iteration_modified(
            &grid,
            &rewards,
            &Action::ALL,
            TransitionProfile::default(),
            0.9,
            5,
        );
        assert!(matches!(truncated, Err(Error::Derivation(_))));
    }
}
