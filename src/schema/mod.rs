//! Schema module - Maze model, configuration and result types.

mod evolution;
mod maze;
mod path;

pub use evolution::*;
pub use maze::*;
pub use path::*;
