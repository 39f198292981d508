//! Genetic exit discovery.
//!
//! The discovery engine knows the entrance but not the exit. It evolves
//! fixed-length movement chromosomes until one of them walks onto the exit
//! cell.
//!
//! # Overview
//!
//! - **Chromosome operations** (`chromosome`): random generation, single-point
//!   crossover, per-gene mutation and tournament selection
//! - **Fitness** (`fitness`): simulated walks scored by exploration and by
//!   proximity to the exit
//! - **Diagnostics** (`diagnostics`): sampled diversity and convergence
//!   detection, reporting only
//! - **Search** (`search`): the generational loop with elitism
//!
//! # Example
//!
//! ```rust,no_run
//! use maze_seeker::compute::MazeGraph;
//! use maze_seeker::compute::evolution::DiscoveryEngine;
//! use maze_seeker::schema::{DiscoveryConfig, Maze};
//!
//! let maze = Maze::from_file("maze.txt").unwrap();
//! let config = DiscoveryConfig {
//!     random_seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let mut engine = DiscoveryEngine::new(config, MazeGraph::new(&maze)).unwrap();
//! let result = engine.run_with_callback(|report| {
//!     println!("Generation {}: best fitness = {:.1}",
//!         report.generation, report.best_fitness);
//! });
//!
//! if let Some(exit) = result.exit_position {
//!     println!("Exit at {} after {} moves", exit, result.steps());
//! }
//! ```

mod chromosome;
mod diagnostics;
mod fitness;
mod search;

pub use chromosome::{ChromosomeRng, chromosome_distance};
pub use diagnostics::{is_converged, population_diversity};
pub use fitness::{
    DISTANCE_WEIGHT, EXPLORATION_WEIGHT, Evaluation, FitnessEvaluator, MIN_FITNESS,
    MOVEMENT_WEIGHT, SUCCESS_FITNESS,
};
pub use search::DiscoveryEngine;
