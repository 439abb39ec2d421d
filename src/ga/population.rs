//! Decision vectors, bounds, and populations.
//!
//! # Encoding
//!
//! A decision vector holds one integer gene per task. Gene `i` indexes
//! task `i`'s candidate pool, so every gene lies in `0..=upper[i]` with
//! `upper[i] = pool_size - 1`. A task with an empty pool has `upper = 0`;
//! its gene carries no information and the cost model flags the task as
//! unplaceable.

use rand::Rng;

use crate::cost::Evaluation;

/// Per-variable inclusive upper bounds; every lower bound is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bounds {
    upper: Vec<usize>,
}

impl Bounds {
    /// Bounds from inclusive upper limits.
    pub fn new(upper: Vec<usize>) -> Self {
        Self { upper }
    }

    /// Bounds from candidate pool sizes (`upper = size - 1`, floored at 0).
    pub fn from_pool_sizes(sizes: &[usize]) -> Self {
        Self {
            upper: sizes.iter().map(|&s| s.saturating_sub(1)).collect(),
        }
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.upper.len()
    }

    /// Whether there are no variables.
    pub fn is_empty(&self) -> bool {
        self.upper.is_empty()
    }

    /// Inclusive upper bound of variable `i`.
    pub fn upper(&self, i: usize) -> usize {
        self.upper[i]
    }

    /// Whether `genes` has the right length and every gene is in range.
    pub fn contains(&self, genes: &[usize]) -> bool {
        genes.len() == self.upper.len() && genes.iter().zip(&self.upper).all(|(g, u)| g <= u)
    }

    /// Clamps every gene into range, padding or truncating to length.
    pub fn clamp(&self, genes: &[usize]) -> Vec<usize> {
        self.upper
            .iter()
            .enumerate()
            .map(|(i, &u)| genes.get(i).copied().unwrap_or(0).min(u))
            .collect()
    }

    /// Uniformly random vector within bounds.
    pub fn random_vector<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
        self.upper.iter().map(|&u| rng.random_range(0..=u)).collect()
    }

    /// Number of distinct vectors, saturating at `usize::MAX`.
    pub fn search_space(&self) -> usize {
        self.upper
            .iter()
            .fold(1usize, |acc, &u| acc.saturating_mul(u + 1))
    }
}

/// One generation: decision vectors and their evaluations, index-aligned.
#[derive(Debug, Clone, Default)]
pub struct Population {
    /// Decision vectors.
    pub vectors: Vec<Vec<usize>>,
    /// Evaluations; empty until the generation has been scored.
    pub evaluations: Vec<Evaluation>,
}

impl Population {
    /// Unscored population.
    pub fn new(vectors: Vec<Vec<usize>>) -> Self {
        Self {
            vectors,
            evaluations: Vec::new(),
        }
    }

    /// Number of individuals.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Whether every individual has an evaluation.
    pub fn is_evaluated(&self) -> bool {
        self.evaluations.len() == self.vectors.len()
    }

    /// Index of the best individual (lowest violation, then lowest cost).
    pub fn best(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, eval) in self.evaluations.iter().enumerate() {
            match best {
                Some(b) if !eval.is_better_than(&self.evaluations[b]) => {}
                _ => best = Some(i),
            }
        }
        best
    }

    /// Individual indices sorted best first.
    pub fn ranked(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.evaluations.len()).collect();
        order.sort_by(|&a, &b| {
            let (ea, eb) = (&self.evaluations[a], &self.evaluations[b]);
            ea.violation
                .total_cmp(&eb.violation)
                .then(ea.cost.total_cmp(&eb.cost))
        });
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_bounds_from_pool_sizes() {
        let bounds = Bounds::from_pool_sizes(&[3, 1, 0]);
        assert_eq!(bounds.len(), 3);
        assert_eq!(bounds.upper(0), 2);
        assert_eq!(bounds.upper(1), 0);
        assert_eq!(bounds.upper(2), 0);
        assert_eq!(bounds.search_space(), 3);
    }

    #[test]
    fn test_random_vectors_within_bounds() {
        let bounds = Bounds::from_pool_sizes(&[4, 2, 1, 7]);
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..200 {
            let v = bounds.random_vector(&mut rng);
            assert!(bounds.contains(&v));
        }
    }

    #[test]
    fn test_contains_and_clamp() {
        let bounds = Bounds::new(vec![1, 3]);
        assert!(bounds.contains(&[1, 3]));
        assert!(!bounds.contains(&[2, 0]));
        assert!(!bounds.contains(&[0]));
        assert_eq!(bounds.clamp(&[5, 2, 9]), vec![1, 2]);
        assert_eq!(bounds.clamp(&[0]), vec![0, 0]);
    }

    #[test]
    fn test_best_and_ranked() {
        let mut pop = Population::new(vec![vec![0], vec![1], vec![2], vec![3]]);
        assert!(!pop.is_evaluated());
        pop.evaluations = vec![
            Evaluation::feasible(5.0),
            Evaluation {
                cost: 0.1,
                violation: 3.0,
            },
            Evaluation::feasible(2.0),
            Evaluation::feasible(2.0),
        ];
        assert!(pop.is_evaluated());
        assert_eq!(pop.best(), Some(2));
        assert_eq!(pop.ranked(), vec![2, 3, 0, 1]);
    }

    #[test]
    fn test_best_of_unscored() {
        assert_eq!(Population::new(vec![vec![0]]).best(), None);
    }
}
