//! The four moves and the validated set a solver scans.

use std::fmt;

use crate::error::{Error, Result};

/// One of the four compass moves.
///
/// The derived ordering `Up < Down < Left < Right` is the tie-breaking order
/// used whenever several actions share the maximal expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    /// Canonical order.
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    /// Unit step as `(d_row, d_col)`.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
            Action::Right => (0, 1),
        }
    }

    /// Arrow used when rendering a policy.
    pub fn arrow(self) -> char {
        match self {
            Action::Up => '^',
            Action::Down => 'v',
            Action::Left => '<',
            Action::Right => '>',
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Up => "UP",
            Action::Down => "DOWN",
            Action::Left => "LEFT",
            Action::Right => "RIGHT",
        };
        f.write_str(name)
    }
}

/// The validated set of actions available in every open cell.
///
/// Each direction must appear exactly once. Iteration always follows the
/// canonical order, whatever order the caller supplied, so tie-breaking is
/// independent of how the list was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSet {
    actions: [Action; 4],
}

impl ActionSet {
    pub fn new(actions: &[Action]) -> Result<Self> {
        if actions.is_empty() {
            return Err(Error::Config("action list is empty".to_string()));
        }
        let mut seen = [false; 4];
        for &action in actions {
            let slot = &mut seen[action as usize];
            if *slot {
                return Err(Error::Config(format!("action {} listed twice", action)));
            }
            *slot = true;
        }
        if let Some(missing) = Action::ALL.iter().find(|a| !seen[**a as usize]) {
            return Err(Error::Config(format!("action list is missing {}", missing)));
        }
        Ok(Self {
            actions: Action::ALL,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        self.actions.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl Default for ActionSet {
    fn default() -> Self {
        Self {
            actions: Action::ALL,
        }
    }
}
