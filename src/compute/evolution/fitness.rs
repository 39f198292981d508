//! Fitness evaluation for discovery chromosomes.
//!
//! A chromosome is scored by walking it through the maze from the entrance.
//! Blocked genes are skipped, the walk stops on the exit, and unsuccessful
//! walks are rewarded for exploring and for ending close to the exit.

use std::collections::HashSet;

use crate::schema::{Cell, Chromosome, Position};

use crate::compute::graph::MazeGraph;

/// Reward per distinct cell visited.
pub const EXPLORATION_WEIGHT: f32 = 10.0;
/// Reward per position on the walked path.
pub const MOVEMENT_WEIGHT: f32 = 0.5;
/// Penalty per unit of Manhattan distance between the final cell and the exit.
pub const DISTANCE_WEIGHT: f32 = 5.0;
/// Lowest fitness an unsuccessful walk can score.
pub const MIN_FITNESS: f32 = 0.1;
/// Base fitness of a walk that reaches the exit.
pub const SUCCESS_FITNESS: f32 = 1_000_000.0;

/// Outcome of walking one chromosome.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub fitness: f32,
    /// Where the walk ended.
    pub final_position: Position,
    /// Positions occupied, starting at the entrance. Blocked genes add nothing.
    pub path: Vec<Position>,
    pub reached_exit: bool,
}

impl Evaluation {
    /// Number of moves actually taken.
    pub fn moves(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Scores chromosomes against one maze.
///
/// The exit coordinate is used only to shape the distance penalty; reaching
/// the exit is detected from the cell kind under the walker.
#[derive(Debug, Clone, Copy)]
pub struct FitnessEvaluator<'m> {
    graph: MazeGraph<'m>,
    chromosome_length: usize,
    success_floor: f32,
}

impl<'m> FitnessEvaluator<'m> {
    /// Create an evaluator for chromosomes of `chromosome_length` genes.
    pub fn new(graph: MazeGraph<'m>, chromosome_length: usize) -> Self {
        // Strictly above the best score any unsuccessful walk can reach.
        let ceiling = (EXPLORATION_WEIGHT + MOVEMENT_WEIGHT) * (chromosome_length + 1) as f32;
        Self {
            graph,
            chromosome_length,
            success_floor: SUCCESS_FITNESS.max(ceiling + 1.0),
        }
    }

    /// Fitness every successful walk scores at least.
    pub fn success_floor(&self) -> f32 {
        self.success_floor
    }

    /// Walk `chromosome` from the entrance and score it.
    pub fn evaluate(&self, chromosome: &Chromosome) -> Evaluation {
        let maze = self.graph.maze();
        let mut position = maze.entrance();
        let mut path = vec![position];
        let mut visited: HashSet<Position> = HashSet::from([position]);

        for &gene in chromosome.genes() {
            let Some(next) = self.graph.try_move_gene(position, gene) else {
                continue;
            };
            position = next;
            path.push(position);
            visited.insert(position);

            if self.graph.cell(position) == Some(Cell::Exit) {
                let moves = path.len() - 1;
                let bonus = self.chromosome_length.saturating_sub(moves) as f32;
                return Evaluation {
                    fitness: self.success_floor + bonus,
                    final_position: position,
                    path,
                    reached_exit: true,
                };
            }
        }

        let distance = position.manhattan(maze.exit()) as f32;
        let fitness = EXPLORATION_WEIGHT * visited.len() as f32
            + MOVEMENT_WEIGHT * path.len() as f32
            - DISTANCE_WEIGHT * distance;

        Evaluation {
            fitness: fitness.max(MIN_FITNESS),
            final_position: position,
            path,
            reached_exit: false,
        }
    }
}
