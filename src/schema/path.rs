//! Result types for optimal path search.

use serde::{Deserialize, Serialize};

use super::Position;

/// A route found by the optimal path search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    /// Positions from start to goal, both inclusive.
    pub path: Vec<Position>,
    /// Total movement cost along `path`.
    pub cost: f64,
    /// Number of nodes expanded (moved to the closed set) during the search.
    pub expanded: usize,
}

impl PathResult {
    /// Number of moves along the path.
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Outcome of an optimal path search.
///
/// An unreachable goal is an ordinary outcome of the search, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome")]
pub enum PathOutcome {
    /// A minimum-cost path was found.
    Found(PathResult),
    /// The frontier emptied before the goal was reached.
    NoPath {
        /// Number of nodes expanded before giving up.
        expanded: usize,
    },
}

impl PathOutcome {
    /// The found path, if any.
    pub fn path(&self) -> Option<&[Position]> {
        match self {
            PathOutcome::Found(result) => Some(&result.path),
            PathOutcome::NoPath { .. } => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, PathOutcome::Found(_))
    }

    /// Convert into the found route, if any.
    pub fn into_result(self) -> Option<PathResult> {
        match self {
            PathOutcome::Found(result) => Some(result),
            PathOutcome::NoPath { .. } => None,
        }
    }
}
