//! Planning on stochastic grid worlds.
//!
//! An agent on a rectangular grid attempts one of four moves; it goes where
//! it intended with probability `intended` and slips to each orthogonal
//! direction with probability `side`. Walls block movement and off-grid
//! moves are clamped. Every solver here is built on one primitive, the
//! [`BellmanEvaluator`], and on a synchronous double-buffered sweep.

pub mod action;
pub mod bellman;
pub mod grid;
pub mod model;
pub mod policy;
pub mod policy_evaluation;
pub mod policy_iteration;
pub mod threshold;
pub mod trace;
pub mod transition;
pub mod utility;
pub mod value_iteration;


pub use action::{Action, ActionSet};
pub use bellman::BellmanEvaluator;
pub use grid::{CellKind, Grid, Position, RewardTable};
pub use model::{GridMdp, SolverConfig};
pub use policy::{Policy, PolicyAgreement};
pub use policy_evaluation::{EvaluationMode, PolicyEvaluator};
pub use policy_iteration::{
    solve_policy_iteration, solve_policy_iteration_modified, PolicyIterationResult,
};
pub use threshold::derive_threshold;
pub use trace::IterationTrace;
pub use transition::{move_position, side_actions, TransitionProfile};
pub use utility::UtilityGrid;
pub use value_iteration::{solve_value_iteration, ValueIterationResult};
