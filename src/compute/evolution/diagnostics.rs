//! Reporting-only population diagnostics.
//!
//! Nothing here feeds back into selection; diversity sampling draws from its
//! own generator so the algorithmic random stream is left untouched.

use crate::schema::Chromosome;

use super::chromosome::{ChromosomeRng, chromosome_distance};

/// Average pairwise distance over a random sample of the population.
///
/// At most `sample_size` members are drawn. Returns 0 for fewer than two.
pub fn population_diversity(
    population: &[Chromosome],
    sample_size: usize,
    rng: &mut ChromosomeRng,
) -> f32 {
    let sample = rng.sample_indices(population.len(), sample_size);
    if sample.len() < 2 {
        return 0.0;
    }

    let mut total_distance = 0.0f32;
    let mut count = 0usize;
    for (i, &a) in sample.iter().enumerate() {
        for &b in &sample[i + 1..] {
            total_distance += chromosome_distance(&population[a], &population[b]);
            count += 1;
        }
    }

    total_distance / count as f32
}

/// Whether the last `window` entries of `best_history` lie within `epsilon`.
///
/// A history shorter than the window is never converged.
pub fn is_converged(best_history: &[f32], window: usize, epsilon: f32) -> bool {
    if window == 0 || best_history.len() < window {
        return false;
    }
    let recent = &best_history[best_history.len() - window..];
    let (lo, hi) = recent
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    hi - lo <= epsilon
}
