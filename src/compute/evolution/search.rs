//! Genetic search for a maze exit.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::compute::graph::MazeGraph;
use crate::schema::{
    Chromosome, ConfigError, DiscoveryConfig, DiscoveryHistory, DiscoveryResult,
    GenerationReport, MAX_CHROMOSOME_LENGTH, Position, StopReason,
};

use super::chromosome::ChromosomeRng;
use super::diagnostics::{is_converged, population_diversity};
use super::fitness::{Evaluation, FitnessEvaluator};

/// Mixed into the run seed to derive the diagnostics generator.
const DIAGNOSTICS_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// An evaluated individual.
#[derive(Debug, Clone)]
struct Candidate {
    chromosome: Chromosome,
    fitness: f32,
    /// Where its walk ended.
    final_position: Position,
    /// Walked positions, starting at the entrance.
    path: Vec<Position>,
}

impl Candidate {
    fn new(chromosome: Chromosome, evaluation: Evaluation) -> Self {
        Self {
            chromosome,
            fitness: evaluation.fitness,
            final_position: evaluation.final_position,
            path: evaluation.path,
        }
    }
}

/// Evolves movement chromosomes until one walks onto the exit.
pub struct DiscoveryEngine<'m> {
    config: DiscoveryConfig,
    evaluator: FitnessEvaluator<'m>,
    chromosome_length: usize,
    rng: ChromosomeRng,
    diagnostics_rng: ChromosomeRng,
    cancelled: Arc<AtomicBool>,
}

impl<'m> DiscoveryEngine<'m> {
    /// Create an engine seeded from `config.random_seed`, or from entropy when
    /// no seed is configured.
    pub fn new(config: DiscoveryConfig, graph: MazeGraph<'m>) -> Result<Self, ConfigError> {
        let rng = match config.random_seed {
            Some(seed) => ChromosomeRng::new(seed),
            None => ChromosomeRng::random(),
        };
        Self::with_rng(config, graph, rng)
    }

    /// Create an engine driven by an explicit generator.
    pub fn with_rng(
        config: DiscoveryConfig,
        graph: MazeGraph<'m>,
        rng: ChromosomeRng,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let chromosome_length = config.chromosome_length_for(graph.size());
        if chromosome_length > MAX_CHROMOSOME_LENGTH {
            return Err(ConfigError::ChromosomeTooLong {
                length: chromosome_length,
                max: MAX_CHROMOSOME_LENGTH,
            });
        }
        let evaluator = FitnessEvaluator::new(graph, chromosome_length);
        let diagnostics_rng = ChromosomeRng::new(rng.seed() ^ DIAGNOSTICS_SALT);

        Ok(Self {
            config,
            evaluator,
            chromosome_length,
            rng,
            diagnostics_rng,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Get cancellation handle.
    ///
    /// Setting the flag stops the run after the current generation.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Genes per chromosome for this maze.
    pub fn chromosome_length(&self) -> usize {
        self.chromosome_length
    }

    /// Seed driving the algorithmic random stream.
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Evaluate all chromosomes, preserving order.
    #[cfg(feature = "parallel")]
    fn evaluate_population(&self, population: &[Chromosome]) -> Vec<Evaluation> {
        let evaluator = &self.evaluator;
        population
            .par_iter()
            .map(|chromosome| evaluator.evaluate(chromosome))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn evaluate_population(&self, population: &[Chromosome]) -> Vec<Evaluation> {
        population
            .iter()
            .map(|chromosome| self.evaluator.evaluate(chromosome))
            .collect()
    }

    /// Breed the next generation with `elite` in front.
    fn next_generation(
        &mut self,
        population: &[Chromosome],
        fitnesses: &[f32],
        elite: &Chromosome,
    ) -> Vec<Chromosome> {
        let size = self.config.population_size;
        let tournament = self.config.tournament_size;
        let crossover_rate = self.config.crossover_rate;
        let mutation_rate = self.config.mutation_rate;

        let mut next = Vec::with_capacity(size);
        next.push(elite.clone());

        while next.len() < size {
            let idx1 = self.rng.select_tournament(fitnesses, tournament);
            let idx2 = self.rng.select_tournament(fitnesses, tournament);

            let (mut child1, mut child2) =
                self.rng.crossover(&population[idx1], &population[idx2], crossover_rate);

            // Both children are mutated even when only one slot is left.
            self.rng.mutate(&mut child1, mutation_rate);
            self.rng.mutate(&mut child2, mutation_rate);

            next.push(child1);
            if next.len() < size {
                next.push(child2);
            }
        }

        next
    }

    /// Run the search with a per-generation progress callback.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> DiscoveryResult
    where
        F: FnMut(&GenerationReport),
    {
        let start_time = Instant::now();
        let inst = self.config.instrumentation.clone();
        let max_generations = self.config.max_generations;

        let mut population: Vec<Chromosome> = (0..self.config.population_size)
            .map(|_| self.rng.random_chromosome(self.chromosome_length))
            .collect();

        let mut history = DiscoveryHistory::default();
        let mut best: Option<Candidate> = None;
        let mut stagnation_count = 0usize;
        let mut generation = 0usize;

        log::debug!(
            "Starting discovery: population {}, chromosome length {}, seed {}",
            population.len(),
            self.chromosome_length,
            self.rng.seed()
        );

        let (best_ever, stop_reason) = loop {
            let evaluations = self.evaluate_population(&population);
            let fitnesses: Vec<f32> = evaluations.iter().map(|e| e.fitness).collect();

            // First maximum, so ties go to the lower index.
            let mut top = 0;
            for (idx, &fitness) in fitnesses.iter().enumerate() {
                if fitness > fitnesses[top] {
                    top = idx;
                }
            }
            let exit_found = evaluations.iter().any(|e| e.reached_exit);

            let n = fitnesses.len() as f32;
            let avg_fitness = fitnesses.iter().sum::<f32>() / n;
            let min_fitness = fitnesses.iter().copied().fold(f32::INFINITY, f32::min);
            let variance = fitnesses
                .iter()
                .map(|f| (f - avg_fitness).powi(2))
                .sum::<f32>()
                / n;

            let generation_best = Candidate::new(population[top].clone(), evaluations[top].clone());
            let best_position = generation_best.final_position;
            let path_length = generation_best.path.len();
            let generation_best_fitness = generation_best.fitness;

            let best_ever = match best.take() {
                Some(previous) if previous.fitness >= generation_best.fitness => {
                    stagnation_count += 1;
                    previous
                }
                _ => {
                    stagnation_count = 0;
                    generation_best
                }
            };

            let diversity = inst.track_diversity.then(|| {
                population_diversity(
                    &population,
                    inst.diversity_sample_size,
                    &mut self.diagnostics_rng,
                )
            });

            history.best_fitness.push(best_ever.fitness);
            history.generation_best.push(generation_best_fitness);
            history.avg_fitness.push(avg_fitness);
            history.fitness_std.push(variance.sqrt());
            if let Some(d) = diversity {
                history.diversity.push(d);
            }

            let converged = inst.detect_convergence
                && is_converged(
                    &history.best_fitness,
                    inst.convergence_window,
                    inst.convergence_epsilon,
                );

            let report = GenerationReport {
                generation,
                best_fitness: best_ever.fitness,
                generation_best: generation_best_fitness,
                avg_fitness,
                min_fitness,
                fitness_std: variance.sqrt(),
                diversity,
                best_position,
                path_length,
                stagnation_count,
                converged,
                exit_found,
            };

            if inst.verbose_interval > 0 && generation % inst.verbose_interval == 0 {
                log::debug!(
                    "Generation {}: best {:.1}, generation best {:.1}, avg {:.1}, at {} ({} positions), stagnation {}{}",
                    generation,
                    report.best_fitness,
                    report.generation_best,
                    report.avg_fitness,
                    report.best_position,
                    report.path_length,
                    stagnation_count,
                    if converged { ", converged" } else { "" }
                );
            }
            callback(&report);

            if exit_found {
                break (best_ever, StopReason::ExitFound);
            }
            if generation + 1 >= max_generations {
                break (best_ever, StopReason::MaxGenerations);
            }
            if self.cancelled.load(Ordering::Relaxed) {
                break (best_ever, StopReason::Cancelled);
            }

            population = self.next_generation(&population, &fitnesses, &best_ever.chromosome);
            best = Some(best_ever);
            generation += 1;
        };

        let generations_run = generation + 1;
        let success = stop_reason == StopReason::ExitFound;
        match stop_reason {
            StopReason::ExitFound => log::info!(
                "Exit found at {} in generation {} ({} moves)",
                best_ever.final_position,
                generation,
                best_ever.path.len().saturating_sub(1)
            ),
            StopReason::MaxGenerations => log::warn!(
                "No exit found after {} generations (best fitness {:.1} at {})",
                generations_run,
                best_ever.fitness,
                best_ever.final_position
            ),
            StopReason::Cancelled => log::warn!(
                "Discovery cancelled after {} generations",
                generations_run
            ),
        }

        DiscoveryResult {
            success,
            generation_found: success.then_some(generation),
            exit_position: success.then_some(best_ever.final_position),
            chromosome: best_ever.chromosome,
            path: best_ever.path,
            fitness: best_ever.fitness,
            generations_run,
            stop_reason,
            seed: self.rng.seed(),
            history,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        }
    }

    /// Run the search (blocking).
    pub fn run(&mut self) -> DiscoveryResult {
        self.run_with_callback(|_| {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Cell, InstrumentationConfig, Maze};

    // Exit sealed off from the entrance.
    const SEALED: &str = "\
6
E00100
000100
000100
111100
000000
00000S
";

    const OPEN: &str = "\
6
E00000
000000
001100
000100
000000
00000S
";

    fn config(seed: u64) -> DiscoveryConfig {
        DiscoveryConfig {
            population_size: 30,
            max_generations: 40,
            chromosome_length: Some(40),
            random_seed: Some(seed),
            ..Default::default()
        }
    }

    fn assert_legal_walk(maze: &Maze, path: &[Position]) {
        let graph = MazeGraph::new(maze);
        assert_eq!(path.first(), Some(&maze.entrance()));
        for pair in path.windows(2) {
            assert!(
                graph.neighbors(pair[0]).any(|(p, _)| p == pair[1]),
                "{} -> {} is not a legal move",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let maze = Maze::parse(OPEN).unwrap();
        let config = DiscoveryConfig {
            population_size: 0,
            ..Default::default()
        };
        let result = DiscoveryEngine::new(config, MazeGraph::new(&maze));
        assert!(matches!(result, Err(ConfigError::PopulationTooSmall(0))));
    }

    #[test]
    fn test_derived_chromosome_length() {
        let maze = Maze::parse(OPEN).unwrap();
        let config = DiscoveryConfig {
            random_seed: Some(1),
            ..Default::default()
        };
        let engine = DiscoveryEngine::new(config, MazeGraph::new(&maze)).unwrap();
        assert_eq!(engine.chromosome_length(), 50);
        assert_eq!(engine.seed(), 1);
    }

    #[test]
    fn test_derived_chromosome_length_is_capped() {
        // 1449^2 / 2 is just past the longest accepted chromosome.
        let size = 1449;
        let mut cells = vec![Cell::Free; size * size];
        cells[0] = Cell::Entrance;
        cells[size * size - 1] = Cell::Exit;
        let maze = Maze::new(size, cells).unwrap();

        let err = DiscoveryEngine::new(DiscoveryConfig::default(), MazeGraph::new(&maze))
            .err()
            .unwrap();
        assert_eq!(
            err,
            ConfigError::ChromosomeTooLong {
                length: size * size / 2,
                max: MAX_CHROMOSOME_LENGTH,
            }
        );
    }

    #[test]
    fn test_finds_exit_in_open_maze() {
        let maze = Maze::parse(OPEN).unwrap();
        let config = DiscoveryConfig {
            max_generations: 300,
            ..config(4)
        };
        let mut engine = DiscoveryEngine::new(config, MazeGraph::new(&maze)).unwrap();
        let result = engine.run();

        assert!(result.success);
        assert_eq!(result.stop_reason, StopReason::ExitFound);
        assert_eq!(result.exit_position, Some(maze.exit()));
        assert_eq!(result.path.last(), Some(&maze.exit()));
        assert_eq!(result.generation_found, Some(result.generations_run - 1));
        assert_eq!(result.chromosome.len(), 40);
        assert_eq!(result.seed, 4);
        assert_legal_walk(&maze, &result.path);
    }

    #[test]
    fn test_elitism_keeps_best_non_decreasing() {
        let maze = Maze::parse(SEALED).unwrap();
        let mut engine = DiscoveryEngine::new(config(9), MazeGraph::new(&maze)).unwrap();

        let mut reports = Vec::new();
        let result = engine.run_with_callback(|report| reports.push(report.clone()));

        assert!(!result.success);
        assert_eq!(result.stop_reason, StopReason::MaxGenerations);
        assert_eq!(result.generations_run, 40);
        assert_eq!(result.generation_found, None);
        assert_eq!(result.exit_position, None);
        assert_eq!(reports.len(), 40);

        for pair in reports.windows(2) {
            assert!(pair[1].best_fitness >= pair[0].best_fitness);
            assert_eq!(pair[1].generation, pair[0].generation + 1);
        }
        for report in &reports {
            assert!(report.best_fitness >= report.generation_best);
            assert!(report.generation_best >= report.avg_fitness);
            assert!(report.avg_fitness >= report.min_fitness);
            assert!(!report.exit_found);
        }

        let last = reports.last().unwrap();
        assert_eq!(result.fitness, last.best_fitness);
        assert_eq!(result.history.best_fitness.len(), 40);
        assert_eq!(result.history.diversity.len(), 40);
        assert_legal_walk(&maze, &result.path);
    }

    #[test]
    fn test_same_seed_same_run() {
        let maze = Maze::parse(OPEN).unwrap();
        let graph = MazeGraph::new(&maze);

        let a = DiscoveryEngine::new(config(21), graph).unwrap().run();
        let b = DiscoveryEngine::new(config(21), graph).unwrap().run();

        assert_eq!(a.success, b.success);
        assert_eq!(a.generation_found, b.generation_found);
        assert_eq!(a.chromosome, b.chromosome);
        assert_eq!(a.path, b.path);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_injected_rng_matches_configured_seed() {
        let maze = Maze::parse(SEALED).unwrap();
        let graph = MazeGraph::new(&maze);

        let configured = DiscoveryEngine::new(config(33), graph).unwrap().run();
        let injected = DiscoveryEngine::with_rng(
            DiscoveryConfig {
                random_seed: None,
                ..config(33)
            },
            graph,
            ChromosomeRng::new(33),
        )
        .unwrap()
        .run();

        assert_eq!(configured.chromosome, injected.chromosome);
        assert_eq!(configured.history, injected.history);
        assert_eq!(injected.seed, 33);
    }

    #[test]
    fn test_instrumentation_does_not_change_outcome() {
        let maze = Maze::parse(SEALED).unwrap();
        let graph = MazeGraph::new(&maze);

        let instrumented = DiscoveryEngine::new(config(5), graph).unwrap().run();
        let quiet = DiscoveryEngine::new(
            DiscoveryConfig {
                instrumentation: InstrumentationConfig {
                    track_diversity: false,
                    detect_convergence: false,
                    verbose_interval: 1,
                    ..Default::default()
                },
                ..config(5)
            },
            graph,
        )
        .unwrap()
        .run();

        assert_eq!(instrumented.chromosome, quiet.chromosome);
        assert_eq!(instrumented.path, quiet.path);
        assert_eq!(
            instrumented.history.best_fitness,
            quiet.history.best_fitness
        );
        assert!(quiet.history.diversity.is_empty());
    }

    #[test]
    fn test_adjacent_exit_found_immediately() {
        let maze = Maze::parse("5\nES000\n00000\n00000\n00000\n00000\n").unwrap();
        for seed in 0..5 {
            let config = DiscoveryConfig {
                random_seed: Some(seed),
                ..Default::default()
            };
            let result = DiscoveryEngine::new(config, MazeGraph::new(&maze))
                .unwrap()
                .run();
            assert!(result.success, "seed {seed} failed");
            assert_eq!(result.generation_found, Some(0));
            assert_eq!(result.generations_run, 1);
        }
    }

    #[test]
    fn test_cancellation() {
        let maze = Maze::parse(SEALED).unwrap();
        let config = DiscoveryConfig {
            max_generations: 100,
            ..config(2)
        };
        let mut engine = DiscoveryEngine::new(config, MazeGraph::new(&maze)).unwrap();
        let cancel = engine.cancel_handle();

        // Cancel immediately
        cancel.store(true, Ordering::Relaxed);

        let result = engine.run();
        assert_eq!(result.stop_reason, StopReason::Cancelled);
        assert!(!result.success);
        assert_eq!(result.generations_run, 1);
        assert_legal_walk(&maze, &result.path);
    }

    #[test]
    fn test_cancel_from_callback() {
        let maze = Maze::parse(SEALED).unwrap();
        let mut engine = DiscoveryEngine::new(config(8), MazeGraph::new(&maze)).unwrap();
        let cancel = engine.cancel_handle();

        let result = engine.run_with_callback(|report| {
            if report.generation == 4 {
                cancel.store(true, Ordering::Relaxed);
            }
        });
        assert_eq!(result.stop_reason, StopReason::Cancelled);
        assert_eq!(result.generations_run, 5);
    }

    #[test]
    fn test_next_generation_puts_elite_first() {
        let maze = Maze::parse(OPEN).unwrap();
        let config = DiscoveryConfig {
            population_size: 7,
            ..config(3)
        };
        let mut engine = DiscoveryEngine::new(config, MazeGraph::new(&maze)).unwrap();

        let population: Vec<_> = (0..7)
            .map(|_| engine.rng.random_chromosome(40))
            .collect();
        let fitnesses = vec![1.0; 7];
        let elite = Chromosome::from_genes(vec![2; 40]);

        let next = engine.next_generation(&population, &fitnesses, &elite);
        assert_eq!(next.len(), 7);
        assert_eq!(next[0], elite);
        assert!(next.iter().all(|c| c.len() == 40));
    }
}
