//! Plain-text rendering of paths and solve results.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt::Write;
use std::fs;
use std::io;
use std::path::Path;

use crate::schema::{Cell, GenerationReport, Maze, PathOutcome, Position};
use crate::solver::SolveReport;

/// Marker drawn on path cells.
pub const PATH_MARKER: char = '*';

const RULE_WIDTH: usize = 60;

/// Format a path as `(r, c) -> (r, c) -> ...`.
pub fn format_path(path: &[Position]) -> String {
    if path.is_empty() {
        return "(empty)".to_string();
    }
    path.iter()
        .map(Position::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Draw the maze with `path` marked; entrance and exit keep their symbols.
pub fn render_path(maze: &Maze, path: &[Position]) -> String {
    let on_path: HashSet<Position> = path.iter().copied().collect();
    let mut out = String::with_capacity(maze.size() * maze.size() * 2);

    for (row, cells) in maze.rows().enumerate() {
        let line: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(col, &cell)| {
                let p = Position::new(row as i32, col as i32);
                let marked = cell == Cell::Free && on_path.contains(&p);
                if marked {
                    PATH_MARKER.to_string()
                } else {
                    cell.symbol().to_string()
                }
            })
            .collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }

    out
}

/// Column header matching [`generation_row`].
pub fn generation_header() -> String {
    format!(
        "{:<6}{:>14}{:>14}{:>12}{:>12}{:>8}  {:<12}{:>6}",
        "Gen", "Gen best", "Best", "Avg", "Min", "Div%", "Position", "Path"
    )
}

/// One progress table row.
pub fn generation_row(report: &GenerationReport) -> String {
    let diversity = report
        .diversity
        .map_or_else(|| "-".to_string(), |d| format!("{:.1}", d * 100.0));
    let mut row = format!(
        "{:<6}{:>14.2}{:>14.2}{:>12.2}{:>12.2}{:>8}  {:<12}{:>6}",
        report.generation,
        report.generation_best,
        report.best_fitness,
        report.avg_fitness,
        report.min_fitness,
        diversity,
        report.best_position.to_string(),
        report.path_length
    );
    if report.converged {
        row.push_str("  converged");
    }
    if report.exit_found {
        row.push_str("  EXIT FOUND");
    }
    row
}

fn section(out: &mut String, title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    let _ = writeln!(out, "{rule}\n{title}\n{rule}\n");
}

/// Full text report of a solve.
pub fn summary(maze: &Maze, report: &SolveReport) -> String {
    let mut out = String::new();
    let discovery = &report.discovery;

    section(&mut out, "MAZE SOLVE REPORT");
    let _ = writeln!(out, "Maze: {0} x {0}", maze.size());
    let _ = writeln!(out, "Entrance: {}", maze.entrance());
    let _ = writeln!(out, "Seed: {}\n", discovery.seed);

    section(&mut out, "STAGE 1: GENETIC DISCOVERY");
    match (discovery.generation_found, discovery.exit_position) {
        (Some(generation), Some(exit)) => {
            let _ = writeln!(out, "[OK] Exit found in generation {generation}");
            let _ = writeln!(out, "Exit position: {exit}");
        }
        _ => {
            let _ = writeln!(
                out,
                "[FAILED] No exit found ({:?} after {} generations)",
                discovery.stop_reason, discovery.generations_run
            );
            let reached = discovery.path.last().copied().unwrap_or(maze.entrance());
            let _ = writeln!(out, "Best position reached: {reached}");
        }
    }
    let _ = writeln!(out, "Fitness: {:.2}", discovery.fitness);
    let _ = writeln!(out, "Path length: {} steps", discovery.steps());
    let _ = writeln!(out, "Elapsed: {:.3}s\n", discovery.elapsed_seconds);
    let _ = writeln!(out, "{}\n", format_path(&discovery.path));
    out.push_str(&render_path(maze, &discovery.path));
    out.push('\n');

    match &report.optimal {
        Some(PathOutcome::Found(result)) => {
            section(&mut out, "STAGE 2: A* OPTIMAL ROUTE");
            let _ = writeln!(out, "[OK] Optimal route found");
            let _ = writeln!(out, "Path length: {} steps", result.steps());
            let _ = writeln!(out, "Cost: {:.1}", result.cost);
            let _ = writeln!(out, "Nodes expanded: {}\n", result.expanded);
            let _ = writeln!(out, "{}\n", format_path(&result.path));
            out.push_str(&render_path(maze, &result.path));
            out.push('\n');
        }
        Some(PathOutcome::NoPath { expanded }) => {
            section(&mut out, "STAGE 2: A* OPTIMAL ROUTE");
            let _ = writeln!(out, "[FAILED] No route ({expanded} nodes expanded)\n");
        }
        None => {}
    }

    if let Some(comparison) = &report.comparison {
        section(&mut out, "COMPARISON");
        let _ = writeln!(out, "Discovery steps: {}", comparison.discovery_steps);
        let _ = writeln!(out, "Optimal steps: {}", comparison.optimal_steps);
        let _ = writeln!(out, "Difference: {} steps", comparison.difference());
        match comparison.optimal_steps.cmp(&comparison.discovery_steps) {
            Ordering::Less => {
                let _ = writeln!(
                    out,
                    "Improvement: {:.1}% fewer steps with A*",
                    comparison.improvement_percent
                );
            }
            Ordering::Equal => {
                let _ = writeln!(out, "Both routes have the same length");
            }
            // A* minimizes cost, which can take more but cheaper steps.
            Ordering::Greater => {
                let _ = writeln!(out, "Discovery walk has fewer but costlier steps");
            }
        }
    }

    out
}

/// Write [`summary`] to a text file.
pub fn save_summary<P: AsRef<Path>>(path: P, maze: &Maze, report: &SolveReport) -> io::Result<()> {
    fs::write(path, summary(maze, report))
}
