//! Two-stage solve: discover the exit, then route to it optimally.

use serde::Serialize;

use crate::compute::evolution::DiscoveryEngine;
use crate::compute::{MazeGraph, OptimalPathFinder};
use crate::schema::{
    ConfigError, DiscoveryConfig, DiscoveryResult, GenerationReport, Maze, PathOutcome,
};

/// Errors that stop a solve before it starts.
#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    #[error("Invalid discovery configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Step counts of the discovery walk against the optimal route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathComparison {
    /// Moves taken by the discovery walk.
    pub discovery_steps: usize,
    /// Moves on the optimal route.
    pub optimal_steps: usize,
    /// Percentage of discovery moves saved by the optimal route.
    pub improvement_percent: f64,
}

impl PathComparison {
    pub fn new(discovery_steps: usize, optimal_steps: usize) -> Self {
        let improvement_percent = if discovery_steps > 0 {
            (discovery_steps as f64 - optimal_steps as f64) / discovery_steps as f64 * 100.0
        } else {
            0.0
        };
        Self {
            discovery_steps,
            optimal_steps,
            improvement_percent,
        }
    }

    /// Moves saved; negative if the discovery walk was shorter.
    pub fn difference(&self) -> i64 {
        self.discovery_steps as i64 - self.optimal_steps as i64
    }
}

/// Everything one solve produces.
#[derive(Debug, Clone, Serialize)]
pub struct SolveReport {
    pub discovery: DiscoveryResult,
    /// Optimal route to the discovered exit; absent when discovery failed.
    pub optimal: Option<PathOutcome>,
    pub comparison: Option<PathComparison>,
}

impl SolveReport {
    /// Whether both stages produced a path.
    pub fn is_solved(&self) -> bool {
        self.discovery.success && self.optimal.as_ref().is_some_and(PathOutcome::is_found)
    }
}

/// Solve `maze`: discover the exit, then run A* from the entrance to it.
pub fn solve(maze: &Maze, config: &DiscoveryConfig) -> Result<SolveReport, SolveError> {
    solve_with_callback(maze, config, |_| {})
}

/// Solve with a per-generation progress callback for the discovery stage.
pub fn solve_with_callback<F>(
    maze: &Maze,
    config: &DiscoveryConfig,
    callback: F,
) -> Result<SolveReport, SolveError>
where
    F: FnMut(&GenerationReport),
{
    let graph = MazeGraph::new(maze);
    let mut engine = DiscoveryEngine::new(config.clone(), graph)?;
    let discovery = engine.run_with_callback(callback);

    let Some(exit) = discovery.exit_position else {
        return Ok(SolveReport {
            discovery,
            optimal: None,
            comparison: None,
        });
    };

    let outcome = OptimalPathFinder::new(graph).find(maze.entrance(), exit);
    let comparison = match &outcome {
        PathOutcome::Found(result) => {
            log::info!(
                "Optimal route to {}: {} steps (cost {:.1}, {} expanded)",
                exit,
                result.steps(),
                result.cost,
                result.expanded
            );
            Some(PathComparison::new(discovery.steps(), result.steps()))
        }
        PathOutcome::NoPath { expanded } => {
            log::warn!("No route from {} to {} ({} expanded)", maze.entrance(), exit, expanded);
            None
        }
    };

    Ok(SolveReport {
        discovery,
        optimal: Some(outcome),
        comparison,
    })
}
