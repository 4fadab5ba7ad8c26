//! Per-cell action assignments and how two of them compare.

use std::fmt;

use ndarray::Array2;

use crate::mdp::action::Action;
use crate::mdp::grid::{Grid, Position};

/// An action for every open cell of a grid. Wall cells have no entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    actions: Array2<Option<Action>>,
}

impl Policy {
    /// A policy with no entries.
    pub fn empty(height: usize, width: usize) -> Self {
        Self {
            actions: Array2::from_elem((height, width), None),
        }
    }

    /// Assigns `action` to every open cell of `grid`.
    pub fn uniform(grid: &Grid, action: Action) -> Self {
        let mut policy = Self::empty(grid.height(), grid.width());
        for p in grid.open_positions() {
            policy.set(p, action);
        }
        policy
    }

    pub fn get(&self, position: Position) -> Option<Action> {
        self.actions[position.index()]
    }

    /// The assigned action, or [`Action::Up`] where nothing is assigned.
    pub fn action_or_default(&self, position: Position) -> Action {
        self.get(position).unwrap_or(Action::Up)
    }

    pub fn set(&mut self, position: Position, action: Action) {
        self.actions[position.index()] = Some(action);
    }

    pub fn shape(&self) -> (usize, usize) {
        self.actions.dim()
    }

    /// Number of cells with an assigned action.
    pub fn len(&self) -> usize {
        self.actions.iter().filter(|a| a.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compares two policies over the open cells of `grid`.
    pub fn agreement(&self, other: &Policy, grid: &Grid) -> PolicyAgreement {
        let mut agreement = PolicyAgreement::default();
        for p in grid.open_positions() {
            agreement.total += 1;
            if self.get(p) == other.get(p) {
                agreement.matching += 1;
            }
        }
        agreement
    }
}

impl fmt::Display for Policy {
    /// One line per row: an arrow per assigned cell and `#` elsewhere.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.actions.rows() {
            let line: String = row
                .iter()
                .map(|a| a.map_or('#', Action::arrow))
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// How many open states two policies agree on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicyAgreement {
    pub matching: usize,
    pub total: usize,
}

impl PolicyAgreement {
    /// Fraction of agreeing states; 1.0 when there are no open states.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.matching as f64 / self.total as f64
        }
    }

    pub fn is_full(&self) -> bool {
        self.matching == self.total
    }
}

impl fmt::Display for PolicyAgreement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} states ({:.2}%)",
            self.matching,
            self.total,
            self.ratio() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Grid {
        Grid::from_tokens(&[["WHITE", "WALL"], ["G", "B"]]).unwrap()
    }

    #[test]
    fn test_uniform_skips_walls() {
        let g = grid();
        let policy = Policy::uniform(&g, Action::Up);
        assert_eq!(policy.len(), 3);
        assert_eq!(policy.get(Position::new(0, 1)), None);
        assert_eq!(policy.get(Position::new(1, 1)), Some(Action::Up));
    }

    #[test]
    fn test_default_action() {
        let policy = Policy::empty(1, 1);
        assert!(policy.is_empty());
        assert_eq!(policy.action_or_default(Position::new(0, 0)), Action::Up);
    }

    #[test]
    fn test_agreement() {
        let g = grid();
        let a = Policy::uniform(&g, Action::Up);
        let mut b = a.clone();
        b.set(Position::new(1, 0), Action::Left);
        let agreement = a.agreement(&b, &g);
        assert_eq!(agreement, PolicyAgreement { matching: 2, total: 3 });
        assert!(!agreement.is_full());
        assert_eq!(agreement.to_string(), "2/3 states (66.67%)");
    }

    #[test]
    fn test_display() {
        let g = grid();
        let mut policy = Policy::uniform(&g, Action::Right);
        policy.set(Position::new(1, 1), Action::Down);
        assert_eq!(policy.to_string(), ">#\n>v\n");
    }
}
