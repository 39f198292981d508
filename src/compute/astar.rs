//! A* search for minimum-cost routes between two known positions.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::schema::{DIAGONAL_COST, ORTHOGONAL_COST, PathOutcome, PathResult, Position};

use super::graph::MazeGraph;

/// Octile distance between two positions.
///
/// Admissible and consistent for orthogonal cost 1.0 and diagonal cost 1.4.
#[inline]
pub fn octile(a: Position, b: Position) -> f64 {
    let drow = (a.row - b.row).abs();
    let dcol = (a.col - b.col).abs();
    let (lo, hi) = (drow.min(dcol), drow.max(dcol));
    (hi - lo) as f64 * ORTHOGONAL_COST + lo as f64 * DIAGONAL_COST
}

/// Node in the search arena.
#[derive(Debug, Clone)]
struct SearchNode {
    position: Position,
    parent: Option<usize>,
    g: f64,
}

/// Frontier heap entry.
///
/// Ordered so that the max-heap pops the smallest `f` first, and among equal
/// `f` the entry inserted earliest.
#[derive(Debug, Clone, Copy)]
struct FrontierEntry {
    f: f64,
    seq: u64,
    node: usize,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

/// Open set: a heap plus the live entry of each position.
#[derive(Debug, Default)]
struct Frontier {
    heap: BinaryHeap<FrontierEntry>,
    live: HashMap<Position, u64>,
    next_seq: u64,
}

impl Frontier {
    /// Queue `node`, superseding any earlier entry for `position`.
    fn push(&mut self, position: Position, f: f64, node: usize) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.live.insert(position, seq);
        self.heap.push(FrontierEntry { f, seq, node });
    }

    /// Pop the best live entry, discarding superseded ones.
    fn pop(&mut self, nodes: &[SearchNode]) -> Option<FrontierEntry> {
        while let Some(entry) = self.heap.pop() {
            let position = nodes[entry.node].position;
            if self.live.get(&position) == Some(&entry.seq) {
                self.live.remove(&position);
                return Some(entry);
            }
        }
        None
    }
}

/// Computes minimum-cost routes over a [`MazeGraph`].
///
/// Every position has at most one live frontier entry. Improving the best
/// known cost of a position supersedes its previous entry, which is then
/// skipped when popped. Ties on `f` go to the entry inserted first, which
/// makes the returned path independent of heap internals.
#[derive(Debug, Clone, Copy)]
pub struct OptimalPathFinder<'m> {
    graph: MazeGraph<'m>,
}

impl<'m> OptimalPathFinder<'m> {
    pub fn new(graph: MazeGraph<'m>) -> Self {
        Self { graph }
    }

    /// Find a minimum-cost path from `start` to `goal`.
    pub fn find(&self, start: Position, goal: Position) -> PathOutcome {
        let mut nodes: Vec<SearchNode> = Vec::new();
        let mut frontier = Frontier::default();
        let mut closed: HashSet<Position> = HashSet::new();
        let mut best_g: HashMap<Position, f64> = HashMap::new();
        let mut expanded = 0usize;

        let f = octile(start, goal);
        nodes.push(SearchNode {
            position: start,
            parent: None,
            g: 0.0,
        });
        frontier.push(start, f, 0);
        best_g.insert(start, 0.0);

        while let Some(entry) = frontier.pop(&nodes) {
            let (position, g) = (nodes[entry.node].position, nodes[entry.node].g);

            if position == goal {
                let path = reconstruct(&nodes, entry.node);
                log::debug!(
                    "A* reached {} from {} in {} steps (cost {:.1}, {} expanded)",
                    goal,
                    start,
                    path.len() - 1,
                    g,
                    expanded
                );
                return PathOutcome::Found(PathResult {
                    path,
                    cost: g,
                    expanded,
                });
            }

            closed.insert(position);
            expanded += 1;

            for (next, cost) in self.graph.neighbors(position) {
                if closed.contains(&next) {
                    continue;
                }

                let tentative_g = g + cost;
                if best_g.get(&next).is_some_and(|&known| tentative_g >= known) {
                    continue;
                }
                best_g.insert(next, tentative_g);

                let f = tentative_g + octile(next, goal);
                nodes.push(SearchNode {
                    position: next,
                    parent: Some(entry.node),
                    g: tentative_g,
                });
                frontier.push(next, f, nodes.len() - 1);
            }
        }

        log::debug!("A* found no path from {} to {} ({} expanded)", start, goal, expanded);
        PathOutcome::NoPath { expanded }
    }
}

/// Follow parent links back to the start and reverse.
fn reconstruct(nodes: &[SearchNode], goal: usize) -> Vec<Position> {
    let mut path = Vec::new();
    let mut cursor = Some(goal);
    while let Some(idx) = cursor {
        path.push(nodes[idx].position);
        cursor = nodes[idx].parent;
    }
    path.reverse();
    path
}
