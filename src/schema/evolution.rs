//! Evolution configuration and result types for exit discovery.
//!
//! This module provides the configuration record for the genetic discovery
//! engine, the chromosome representation it evolves, and the structured
//! per-generation reports and final results it hands back to callers.

use serde::{Deserialize, Serialize};

use super::{Direction, Position};

/// Top-level configuration for the genetic discovery engine.
///
/// Every field has a documented default; call [`DiscoveryConfig::validate`]
/// (done by the engine constructor) before running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Candidates per generation. Must be at least 2.
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Per-gene probability of being replaced by a random direction (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f32,
    /// Probability that two parents are recombined rather than copied (0.0-1.0).
    #[serde(default = "default_crossover_rate")]
    pub crossover_rate: f32,
    /// Generation budget before the search gives up. Must be at least 1.
    #[serde(default = "default_max_generations")]
    pub max_generations: usize,
    /// Genes per chromosome. `None` derives `max(50, n * n / 2)` from the maze.
    #[serde(default)]
    pub chromosome_length: Option<usize>,
    /// Candidates drawn per tournament (1..=population_size).
    #[serde(default = "default_tournament_size")]
    pub tournament_size: usize,
    /// Random seed for reproducibility. `None` draws one from entropy.
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Reporting-only instrumentation.
    #[serde(default)]
    pub instrumentation: InstrumentationConfig,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            mutation_rate: default_mutation_rate(),
            crossover_rate: default_crossover_rate(),
            max_generations: default_max_generations(),
            chromosome_length: None,
            tournament_size: default_tournament_size(),
            random_seed: None,
            instrumentation: InstrumentationConfig::default(),
        }
    }
}

fn default_population_size() -> usize {
    100
}
fn default_mutation_rate() -> f32 {
    0.01
}
fn default_crossover_rate() -> f32 {
    0.8
}
fn default_max_generations() -> usize {
    500
}
fn default_tournament_size() -> usize {
    3
}

/// Minimum chromosome length when derived from the maze size.
pub const MIN_DERIVED_CHROMOSOME_LENGTH: usize = 50;

/// Longest chromosome accepted. Keeps every fitness value an exact `f32`
/// integer step apart, so success always outranks failure.
pub const MAX_CHROMOSOME_LENGTH: usize = 1 << 20;

impl DiscoveryConfig {
    /// Chromosome length used for a maze of dimension `maze_size`.
    pub fn chromosome_length_for(&self, maze_size: usize) -> usize {
        self.chromosome_length
            .unwrap_or_else(|| MIN_DERIVED_CHROMOSOME_LENGTH.max(maze_size * maze_size / 2))
    }
}

/// Instrumentation toggles.
///
/// These only shape what is reported; with a fixed seed they never change the
/// discovered exit, chromosome or path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentationConfig {
    /// Record population diversity each generation.
    #[serde(default = "default_true")]
    pub track_diversity: bool,
    /// Maximum number of candidates sampled for the diversity estimate.
    #[serde(default = "default_diversity_sample_size")]
    pub diversity_sample_size: usize,
    /// Flag generations where best fitness has stopped moving.
    #[serde(default = "default_true")]
    pub detect_convergence: bool,
    /// Trailing window (in generations) inspected for convergence.
    #[serde(default = "default_convergence_window")]
    pub convergence_window: usize,
    /// Largest best-fitness spread over the window still counted as converged.
    #[serde(default = "default_convergence_epsilon")]
    pub convergence_epsilon: f32,
    /// Log a progress line every N generations (0 disables).
    #[serde(default)]
    pub verbose_interval: usize,
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self {
            track_diversity: true,
            diversity_sample_size: default_diversity_sample_size(),
            detect_convergence: true,
            convergence_window: default_convergence_window(),
            convergence_epsilon: default_convergence_epsilon(),
            verbose_interval: 0,
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_diversity_sample_size() -> usize {
    20
}
fn default_convergence_window() -> usize {
    20
}
fn default_convergence_epsilon() -> f32 {
    1e-3
}

// ============================================================================
// Chromosome Representation
// ============================================================================

/// Fixed-length sequence of movement genes.
///
/// Each gene is a [`Direction`] index in `0..8`. The gene vector is never
/// resized after creation; operators only rewrite genes in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chromosome {
    genes: Vec<u8>,
}

impl Chromosome {
    /// Wrap an existing gene vector.
    pub fn from_genes(genes: Vec<u8>) -> Self {
        Self { genes }
    }

    #[inline]
    pub fn genes(&self) -> &[u8] {
        &self.genes
    }

    /// Mutable access to genes; the length is fixed.
    #[inline]
    pub fn genes_mut(&mut self) -> &mut [u8] {
        &mut self.genes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Genes decoded as directions (`None` for out-of-range values).
    pub fn directions(&self) -> impl Iterator<Item = Option<Direction>> + '_ {
        self.genes.iter().map(|&g| Direction::from_index(g))
    }
}

// ============================================================================
// Progress and Result Types
// ============================================================================

/// Per-generation metrics, delivered to progress callbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Zero-based generation number.
    pub generation: usize,
    /// Best fitness seen so far (elitism keeps this non-decreasing).
    pub best_fitness: f32,
    /// Best fitness within this generation.
    pub generation_best: f32,
    /// Average fitness of this generation.
    pub avg_fitness: f32,
    /// Lowest fitness of this generation.
    pub min_fitness: f32,
    /// Standard deviation of fitness in this generation.
    pub fitness_std: f32,
    /// Sampled diversity, when tracking is enabled.
    pub diversity: Option<f32>,
    /// Final position of this generation's best candidate.
    pub best_position: Position,
    /// Path length (in positions) of this generation's best candidate.
    pub path_length: usize,
    /// Generations since the best-ever fitness last improved.
    pub stagnation_count: usize,
    /// Whether best fitness has flattened over the convergence window.
    pub converged: bool,
    /// Whether some candidate reached the exit in this generation.
    pub exit_found: bool,
}

/// Evolution history for plotting and reports.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DiscoveryHistory {
    /// Best-ever fitness after each generation.
    pub best_fitness: Vec<f32>,
    /// Best fitness within each generation.
    pub generation_best: Vec<f32>,
    /// Average fitness per generation.
    pub avg_fitness: Vec<f32>,
    /// Standard deviation per generation.
    pub fitness_std: Vec<f32>,
    /// Diversity per generation (empty when tracking is disabled).
    pub diversity: Vec<f32>,
}

/// Reason the discovery run stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// A candidate reached the exit.
    ExitFound,
    /// The generation budget ran out.
    MaxGenerations,
    /// The caller cancelled between generations.
    Cancelled,
}

/// Final result of a discovery run.
///
/// On failure the chromosome, path and fitness describe the best candidate
/// ever observed, so callers can still report or resume from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryResult {
    /// Whether the exit was discovered.
    pub success: bool,
    /// Generation in which the exit was first reached.
    pub generation_found: Option<usize>,
    /// Discovered exit coordinate.
    pub exit_position: Option<Position>,
    /// Winning (or best-ever) chromosome.
    pub chromosome: Chromosome,
    /// Simulated path of `chromosome`, starting at the entrance.
    pub path: Vec<Position>,
    /// Fitness of `chromosome`.
    pub fitness: f32,
    /// Number of generations evaluated.
    pub generations_run: usize,
    /// Why the run stopped.
    pub stop_reason: StopReason,
    /// Seed the run was driven by.
    pub seed: u64,
    /// Per-generation history.
    pub history: DiscoveryHistory,
    /// Wall-clock time of the run (in seconds).
    pub elapsed_seconds: f64,
}

impl DiscoveryResult {
    /// Number of moves along the discovery path.
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Discovery configuration validation errors.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Population size must be at least 2 (got {0})")]
    PopulationTooSmall(usize),
    #[error("{name} must be within [0, 1] (got {value})")]
    InvalidRate { name: &'static str, value: f32 },
    #[error("Max generations must be at least 1")]
    NoGenerations,
    #[error("Chromosome length must be at least 2 (got {0})")]
    ChromosomeTooShort(usize),
    #[error("Chromosome length must be at most {max} (got {length})")]
    ChromosomeTooLong { length: usize, max: usize },
    #[error("Tournament size must be within 1..={population} (got {size})")]
    InvalidTournamentSize { size: usize, population: usize },
    #[error("Diversity sample size must be at least 2 (got {0})")]
    InvalidDiversitySample(usize),
    #[error("Convergence window must be at least 1")]
    InvalidConvergenceWindow,
    #[error("Convergence epsilon must be non-negative (got {0})")]
    InvalidConvergenceEpsilon(f32),
}

impl DiscoveryConfig {
    /// Validate discovery configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size < 2 {
            return Err(ConfigError::PopulationTooSmall(self.population_size));
        }

        let check_rate = |value: f32, name: &'static str| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::InvalidRate { name, value })
            }
        };
        check_rate(self.mutation_rate, "Mutation rate")?;
        check_rate(self.crossover_rate, "Crossover rate")?;

        if self.max_generations == 0 {
            return Err(ConfigError::NoGenerations);
        }

        if let Some(length) = self.chromosome_length
            && length < 2
        {
            return Err(ConfigError::ChromosomeTooShort(length));
        }
        if let Some(length) = self.chromosome_length
            && length > MAX_CHROMOSOME_LENGTH
        {
            return Err(ConfigError::ChromosomeTooLong {
                length,
                max: MAX_CHROMOSOME_LENGTH,
            });
        }

        if self.tournament_size == 0 || self.tournament_size > self.population_size {
            return Err(ConfigError::InvalidTournamentSize {
                size: self.tournament_size,
                population: self.population_size,
            });
        }

        let inst = &self.instrumentation;
        if inst.track_diversity && inst.diversity_sample_size < 2 {
            return Err(ConfigError::InvalidDiversitySample(
                inst.diversity_sample_size,
            ));
        }
        if inst.detect_convergence {
            if inst.convergence_window == 0 {
                return Err(ConfigError::InvalidConvergenceWindow);
            }
            if inst.convergence_epsilon.is_nan() || inst.convergence_epsilon < 0.0 {
                return Err(ConfigError::InvalidConvergenceEpsilon(
                    inst.convergence_epsilon,
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = DiscoveryConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_chromosome_length_derivation() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.chromosome_length_for(5), 50);
        assert_eq!(config.chromosome_length_for(20), 200);
        assert_eq!(config.chromosome_length_for(11), 60);

        let fixed = DiscoveryConfig {
            chromosome_length: Some(12),
            ..Default::default()
        };
        assert_eq!(fixed.chromosome_length_for(100), 12);
    }

    #[test]
    fn test_rejects_small_population() {
        let config = DiscoveryConfig {
            population_size: 1,
            tournament_size: 1,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::PopulationTooSmall(1)));
    }

    #[test]
    fn test_rejects_bad_rates() {
        let config = DiscoveryConfig {
            mutation_rate: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRate {
                name: "Mutation rate",
                ..
            })
        ));

        let config = DiscoveryConfig {
            crossover_rate: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRate {
                name: "Crossover rate",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_zero_generations() {
        let config = DiscoveryConfig {
            max_generations: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoGenerations));
    }

    #[test]
    fn test_rejects_short_chromosome() {
        let config = DiscoveryConfig {
            chromosome_length: Some(1),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ChromosomeTooShort(1)));
    }

    #[test]
    fn test_rejects_long_chromosome() {
        let at_limit = DiscoveryConfig {
            chromosome_length: Some(MAX_CHROMOSOME_LENGTH),
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());

        let config = DiscoveryConfig {
            chromosome_length: Some(20_000_000),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ChromosomeTooLong {
                length: 20_000_000,
                max: MAX_CHROMOSOME_LENGTH,
            })
        );
    }

    #[test]
    fn test_rejects_oversized_tournament() {
        let config = DiscoveryConfig {
            population_size: 4,
            tournament_size: 5,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidTournamentSize {
                size: 5,
                population: 4
            })
        );
    }

    #[test]
    fn test_instrumentation_checked_only_when_enabled() {
        let mut config = DiscoveryConfig::default();
        config.instrumentation.convergence_window = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidConvergenceWindow)
        );

        config.instrumentation.detect_convergence = false;
        assert!(config.validate().is_ok());

        config.instrumentation.diversity_sample_size = 1;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidDiversitySample(1))
        );
    }

    #[test]
    fn test_serialization_defaults() {
        let parsed: DiscoveryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, DiscoveryConfig::default());

        let parsed: DiscoveryConfig =
            serde_json::from_str(r#"{"population_size": 40, "random_seed": 7}"#).unwrap();
        assert_eq!(parsed.population_size, 40);
        assert_eq!(parsed.random_seed, Some(7));
        assert_eq!(parsed.tournament_size, 3);
    }

    #[test]
    fn test_chromosome_serializes_as_gene_list() {
        let chromosome = Chromosome::from_genes(vec![0, 2, 7]);
        assert_eq!(serde_json::to_string(&chromosome).unwrap(), "[0,2,7]");
        let decoded: Vec<_> = chromosome.directions().collect();
        assert_eq!(
            decoded,
            vec![Some(Direction::N), Some(Direction::E), Some(Direction::NW)]
        );
    }
}
