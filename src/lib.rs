//! Maze Seeker - Exit discovery and optimal routing in grid mazes.
//!
//! This crate solves square grid mazes whose exit location is unknown to the
//! solver. It works in two stages:
//!
//! 1. A genetic algorithm evolves fixed-length movement sequences from the
//!    entrance until one of them walks onto the exit cell.
//! 2. An A* search with an octile heuristic re-derives the minimum-cost route
//!    from the entrance to the discovered exit.
//!
//! # Architecture
//!
//! - `schema`: Maze model and parser, configuration and result types
//! - `compute`: The maze graph, A* search and the genetic discovery engine
//! - `solver`: Runs both stages and compares their paths
//! - `report`: Plain-text rendering of paths and results
//!
//! # Example
//!
//! ```rust,no_run
//! use maze_seeker::{DiscoveryConfig, Maze, solve};
//!
//! let maze = Maze::parse("4\nE010\n0110\n0000\n1S01\n").unwrap();
//! let config = DiscoveryConfig {
//!     random_seed: Some(7),
//!     ..Default::default()
//! };
//!
//! let report = solve(&maze, &config).unwrap();
//! if let Some(comparison) = &report.comparison {
//!     println!(
//!         "Discovery took {} steps, the optimal route {}",
//!         comparison.discovery_steps, comparison.optimal_steps
//!     );
//! }
//! ```

pub mod compute;
pub mod report;
pub mod schema;
pub mod solver;

// Re-export commonly used types
pub use compute::evolution::DiscoveryEngine;
pub use compute::{MazeGraph, OptimalPathFinder};
pub use schema::{DiscoveryConfig, DiscoveryResult, Maze, MazeError, PathOutcome, Position};
pub use solver::{SolveError, SolveReport, solve, solve_with_callback};
