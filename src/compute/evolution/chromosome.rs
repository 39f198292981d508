//! Chromosome manipulation utilities for the discovery engine.
//!
//! Provides random generation, crossover, mutation and tournament selection,
//! all driven by a single seedable generator.

use rand::prelude::*;
use rand::seq::index;

use crate::schema::{Chromosome, Direction};

/// Random number generator wrapper for chromosome operations.
///
/// Every algorithmic random draw of a discovery run goes through one
/// `ChromosomeRng`, so a fixed seed reproduces the run exactly.
#[derive(Debug, Clone)]
pub struct ChromosomeRng {
    rng: StdRng,
    seed: u64,
}

impl ChromosomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create with a seed drawn from entropy.
    pub fn random() -> Self {
        Self::new(rand::random())
    }

    /// Seed this generator was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniformly random direction gene.
    #[inline]
    pub fn random_gene(&mut self) -> u8 {
        self.rng.gen_range(0..Direction::COUNT as u8)
    }

    /// Generate a chromosome of `length` uniformly random genes.
    pub fn random_chromosome(&mut self, length: usize) -> Chromosome {
        Chromosome::from_genes((0..length).map(|_| self.random_gene()).collect())
    }

    /// Single-point crossover.
    ///
    /// With probability `1 - rate` the children are plain copies of the
    /// parents. Otherwise a cut point is drawn from `[1, len - 1]` and the
    /// tails are swapped, so each child takes genes from both parents.
    pub fn crossover(
        &mut self,
        parent1: &Chromosome,
        parent2: &Chromosome,
        rate: f32,
    ) -> (Chromosome, Chromosome) {
        let len = parent1.len().min(parent2.len());
        let draw = self.rng.r#gen::<f32>();
        if draw > rate || len < 2 {
            return (parent1.clone(), parent2.clone());
        }

        let cut = self.rng.gen_range(1..len);
        let (head1, tail1) = parent1.genes().split_at(cut);
        let (head2, tail2) = parent2.genes().split_at(cut);

        let child1 = head1.iter().chain(tail2).copied().collect();
        let child2 = head2.iter().chain(tail1).copied().collect();
        (
            Chromosome::from_genes(child1),
            Chromosome::from_genes(child2),
        )
    }

    /// Replace each gene with a random direction with probability `rate`.
    ///
    /// The replacement may equal the old gene.
    pub fn mutate(&mut self, chromosome: &mut Chromosome, rate: f32) {
        let rate = f64::from(rate);
        for gene in chromosome.genes_mut() {
            if self.rng.r#gen::<f64>() < rate {
                *gene = self.rng.gen_range(0..Direction::COUNT as u8);
            }
        }
    }

    /// Tournament selection over `fitnesses`.
    ///
    /// Draws `size` distinct indices uniformly and returns the first one
    /// holding the maximum fitness, in sampled order.
    pub fn select_tournament(&mut self, fitnesses: &[f32], size: usize) -> usize {
        if fitnesses.is_empty() {
            return 0;
        }
        let size = size.clamp(1, fitnesses.len());
        let mut best: Option<(usize, f32)> = None;
        for idx in index::sample(&mut self.rng, fitnesses.len(), size) {
            let fitness = fitnesses[idx];
            if best.is_none_or(|(_, top)| fitness > top) {
                best = Some((idx, fitness));
            }
        }
        best.map_or(0, |(idx, _)| idx)
    }

    /// Draw `amount` distinct indices from `0..len`, in random order.
    pub fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        index::sample(&mut self.rng, len, amount.min(len)).into_vec()
    }
}

/// Normalized Hamming distance between two chromosomes.
///
/// Returns the fraction of differing genes over the shorter length; two empty
/// chromosomes are at distance 0.
pub fn chromosome_distance(a: &Chromosome, b: &Chromosome) -> f32 {
    let len = a.len().min(b.len());
    if len == 0 {
        return 0.0;
    }
    let differing = a
        .genes()
        .iter()
        .zip(b.genes())
        .filter(|(x, y)| x != y)
        .count();
    differing as f32 / len as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_chromosome() {
        let mut rng = ChromosomeRng::new(42);
        let chromosome = rng.random_chromosome(200);

        assert_eq!(chromosome.len(), 200);
        assert!(chromosome.genes().iter().all(|&g| g < 8));
        // With 200 draws every direction should show up.
        for gene in 0..8u8 {
            assert!(chromosome.genes().contains(&gene));
        }
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = ChromosomeRng::new(7);
        let mut b = ChromosomeRng::new(7);
        assert_eq!(a.random_chromosome(64), b.random_chromosome(64));
        assert_eq!(a.sample_indices(100, 10), b.sample_indices(100, 10));
        assert_eq!(a.seed(), 7);
    }

    #[test]
    fn test_crossover_swaps_tails() {
        let mut rng = ChromosomeRng::new(3);
        let p1 = Chromosome::from_genes(vec![0; 10]);
        let p2 = Chromosome::from_genes(vec![5; 10]);

        for _ in 0..50 {
            let (c1, c2) = rng.crossover(&p1, &p2, 1.0);
            assert_eq!(c1.len(), 10);
            assert_eq!(c2.len(), 10);

            let cut = c1.genes().iter().position(|&g| g == 5).unwrap();
            assert!((1..10).contains(&cut));
            assert!(c1.genes()[..cut].iter().all(|&g| g == 0));
            assert!(c1.genes()[cut..].iter().all(|&g| g == 5));
            assert!(c2.genes()[..cut].iter().all(|&g| g == 5));
            assert!(c2.genes()[cut..].iter().all(|&g| g == 0));
        }
    }

    #[test]
    fn test_crossover_disabled_copies_parents() {
        let mut rng = ChromosomeRng::new(3);
        let p1 = Chromosome::from_genes(vec![1, 2, 3, 4]);
        let p2 = Chromosome::from_genes(vec![7, 6, 5, 4]);

        let (c1, c2) = rng.crossover(&p1, &p2, 0.0);
        assert_eq!(c1, p1);
        assert_eq!(c2, p2);
    }

    #[test]
    fn test_mutation() {
        let mut rng = ChromosomeRng::new(11);
        let original = Chromosome::from_genes(vec![0; 500]);

        let mut untouched = original.clone();
        rng.mutate(&mut untouched, 0.0);
        assert_eq!(untouched, original);

        let mut mutated = original.clone();
        rng.mutate(&mut mutated, 1.0);
        assert_eq!(mutated.len(), 500);
        assert!(mutated.genes().iter().all(|&g| g < 8));
        // Every gene is redrawn; roughly 7/8 of them change.
        let changed = mutated.genes().iter().filter(|&&g| g != 0).count();
        assert!(changed > 350, "only {changed} genes changed");
    }

    #[test]
    fn test_tournament_prefers_fitter() {
        let mut rng = ChromosomeRng::new(5);
        let fitnesses = [1.0, 9.0, 3.0, 2.0];

        // A full-size tournament always sees the maximum.
        for _ in 0..20 {
            assert_eq!(rng.select_tournament(&fitnesses, 4), 1);
        }

        // Size one degenerates to uniform choice.
        let mut seen = [false; 4];
        for _ in 0..200 {
            seen[rng.select_tournament(&fitnesses, 1)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_tournament_tie_keeps_first_sampled() {
        let mut rng = ChromosomeRng::new(9);
        let fitnesses = [4.0, 4.0, 4.0];
        let mut seen = [false; 3];
        for _ in 0..100 {
            seen[rng.select_tournament(&fitnesses, 3)] = true;
        }
        // Sampling order is random, so every tied index can win.
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_chromosome_distance() {
        let a = Chromosome::from_genes(vec![0, 1, 2, 3]);
        let b = Chromosome::from_genes(vec![0, 1, 2, 3]);
        let c = Chromosome::from_genes(vec![4, 5, 6, 7]);
        let d = Chromosome::from_genes(vec![0, 1, 6, 7]);

        assert_eq!(chromosome_distance(&a, &b), 0.0);
        assert_eq!(chromosome_distance(&a, &c), 1.0);
        assert_eq!(chromosome_distance(&a, &d), 0.5);
        assert_eq!(
            chromosome_distance(&Chromosome::from_genes(vec![]), &a),
            0.0
        );
    }
}
