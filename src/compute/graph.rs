//! Read-only graph view over a maze.

use crate::schema::{Cell, Direction, Maze, Position};

/// Single source of truth for which positions and moves are legal.
///
/// `MazeGraph` borrows an immutable [`Maze`] and is `Copy`, so it can be
/// shared freely between the discovery engine, fitness evaluation workers and
/// the path finder.
#[derive(Debug, Clone, Copy)]
pub struct MazeGraph<'m> {
    maze: &'m Maze,
}

impl<'m> MazeGraph<'m> {
    pub fn new(maze: &'m Maze) -> Self {
        Self { maze }
    }

    #[inline]
    pub fn maze(&self) -> &'m Maze {
        self.maze
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.maze.size()
    }

    /// Whether both coordinates are within `[0, n)`.
    #[inline]
    pub fn is_valid(&self, p: Position) -> bool {
        self.maze.contains(p)
    }

    /// Whether `p` is in bounds and not a wall.
    #[inline]
    pub fn is_free(&self, p: Position) -> bool {
        self.maze.cell(p).is_some_and(Cell::is_passable)
    }

    /// Cell kind at `p`, or `None` when out of bounds.
    #[inline]
    pub fn cell(&self, p: Position) -> Option<Cell> {
        self.maze.cell(p)
    }

    /// Free neighbors of `p` with their move costs, in direction order.
    pub fn neighbors(&self, p: Position) -> impl Iterator<Item = (Position, f64)> + '_ {
        Direction::ALL.into_iter().filter_map(move |d| {
            let next = p.step(d);
            self.is_free(next).then(|| (next, d.cost()))
        })
    }

    /// Apply one step; `None` means the walker stays where it is.
    #[inline]
    pub fn try_move(&self, p: Position, direction: Direction) -> Option<Position> {
        let next = p.step(direction);
        self.is_free(next).then_some(next)
    }

    /// Apply one gene; out-of-range genes never move.
    #[inline]
    pub fn try_move_gene(&self, p: Position, gene: u8) -> Option<Position> {
        Direction::from_index(gene).and_then(|d| self.try_move(p, d))
    }
}
