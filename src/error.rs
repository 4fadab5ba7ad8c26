//! Error types shared by every solver in the crate.

use thiserror::Error;

use crate::mdp::CellKind;

/// Failures detected while validating a problem or deriving its parameters.
///
/// Every variant except [`Error::Derivation`] is raised before the first
/// sweep runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The grid or action list is malformed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A cell kind that appears in the grid has no reward assigned.
    #[error("no reward defined for cell kind {0}")]
    MissingReward(CellKind),

    #[error("invalid transition profile: intended={intended}, side={side} (need intended + 2*side = 1, both >= 0)")]
    InvalidTransitionProfile { intended: f64, side: f64 },

    /// Discount factor, threshold or truncation depth would prevent termination.
    #[error("invalid convergence parameter: {0}")]
    InvalidConvergenceParameter(String),

    /// Numeric derivation produced a non-finite or non-positive value, or a
    /// sweep overflowed to a non-finite utility.
    #[error("derivation failed: {0}")]
    Derivation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
