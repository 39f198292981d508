//! Compute module - Search algorithms over a maze.

mod astar;
mod graph;

pub mod evolution;

pub use astar::*;
pub use graph::*;
