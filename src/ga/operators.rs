//! Configurable genetic operators for integer decision vectors.
//!
//! Provides runtime-selectable crossover and mutation strategies
//! via [`GeneticOperators`]. Every operator keeps genes within
//! [`Bounds`]: crossover only exchanges genes position for position, and
//! mutation draws or steps within `0..=upper`.
//!
//! # Usage
//!
//! ```
//! use fog_placement::ga::operators::{GeneticOperators, CrossoverType, MutationType};
//!
//! let ops = GeneticOperators::default();
//! assert_eq!(ops.crossover_type, CrossoverType::Uniform);
//! assert_eq!(ops.mutation_type, MutationType::RandomReset);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Bounds;

/// Crossover strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossoverType {
    /// Each gene comes from either parent with equal probability.
    Uniform,
    /// Genes after one random cut point are exchanged.
    SinglePoint,
    /// Genes between two random cut points are exchanged.
    TwoPoint,
}

/// Mutation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationType {
    /// A mutated gene is redrawn uniformly within its bounds.
    RandomReset,
    /// A mutated gene moves one step up or down, clamped to its bounds.
    Creep,
}

/// Runtime-selectable genetic operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticOperators {
    /// Crossover strategy.
    pub crossover_type: CrossoverType,
    /// Mutation strategy.
    pub mutation_type: MutationType,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self {
            crossover_type: CrossoverType::Uniform,
            mutation_type: MutationType::RandomReset,
        }
    }
}

impl GeneticOperators {
    /// Performs crossover using the configured strategy.
    pub fn crossover<R: Rng>(
        &self,
        p1: &[usize],
        p2: &[usize],
        rng: &mut R,
    ) -> (Vec<usize>, Vec<usize>) {
        match self.crossover_type {
            CrossoverType::Uniform => uniform_crossover(p1, p2, rng),
            CrossoverType::SinglePoint => single_point_crossover(p1, p2, rng),
            CrossoverType::TwoPoint => two_point_crossover(p1, p2, rng),
        }
    }

    /// Mutates each gene independently with probability `rate`.
    pub fn mutate<R: Rng>(&self, genes: &mut [usize], bounds: &Bounds, rate: f64, rng: &mut R) {
        match self.mutation_type {
            MutationType::RandomReset => random_reset_mutation(genes, bounds, rate, rng),
            MutationType::Creep => creep_mutation(genes, bounds, rate, rng),
        }
    }
}

// ======================== Crossover operators ========================

/// Uniform crossover: swaps each gene between the children with p = 0.5.
pub fn uniform_crossover<R: Rng>(
    p1: &[usize],
    p2: &[usize],
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let mut c1 = p1.to_vec();
    let mut c2 = p2.to_vec();
    for i in 0..c1.len().min(c2.len()) {
        if rng.random_bool(0.5) {
            std::mem::swap(&mut c1[i], &mut c2[i]);
        }
    }
    (c1, c2)
}

/// Single-point crossover: exchanges the tails after a cut in `1..len`.
pub fn single_point_crossover<R: Rng>(
    p1: &[usize],
    p2: &[usize],
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let len = p1.len().min(p2.len());
    let mut c1 = p1.to_vec();
    let mut c2 = p2.to_vec();
    if len < 2 {
        return (c1, c2);
    }
    let cut = rng.random_range(1..len);
    c1[cut..len].swap_with_slice(&mut c2[cut..len]);
    (c1, c2)
}

/// Two-point crossover: exchanges the segment `[i, j)`.
pub fn two_point_crossover<R: Rng>(
    p1: &[usize],
    p2: &[usize],
    rng: &mut R,
) -> (Vec<usize>, Vec<usize>) {
    let len = p1.len().min(p2.len());
    let mut c1 = p1.to_vec();
    let mut c2 = p2.to_vec();
    if len < 2 {
        return (c1, c2);
    }
    let mut i = rng.random_range(0..len);
    let mut j = rng.random_range(0..=len);
    if i > j {
        std::mem::swap(&mut i, &mut j);
    }
    c1[i..j].swap_with_slice(&mut c2[i..j]);
    (c1, c2)
}

// ======================== Mutation operators ========================

/// Redraws each gene uniformly within its bounds with probability `rate`.
pub fn random_reset_mutation<R: Rng>(
    genes: &mut [usize],
    bounds: &Bounds,
    rate: f64,
    rng: &mut R,
) {
    for (i, gene) in genes.iter_mut().enumerate().take(bounds.len()) {
        let upper = bounds.upper(i);
        if upper > 0 && rng.random_bool(rate) {
            *gene = rng.random_range(0..=upper);
        }
    }
}

/// Steps each gene by ±1 with probability `rate`, clamped to its bounds.
pub fn creep_mutation<R: Rng>(genes: &mut [usize], bounds: &Bounds, rate: f64, rng: &mut R) {
    for (i, gene) in genes.iter_mut().enumerate().take(bounds.len()) {
        let upper = bounds.upper(i);
        if upper == 0 || !rng.random_bool(rate) {
            continue;
        }
        *gene = if *gene == 0 {
            1
        } else if *gene >= upper {
            upper - 1
        } else if rng.random_bool(0.5) {
            *gene + 1
        } else {
            *gene - 1
        };
    }
}
