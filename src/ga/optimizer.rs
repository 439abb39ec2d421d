//! Generational genetic search over decision vectors.
//!
//! # Algorithm
//!
//! 1. Initialize a random population within bounds (optionally seeded).
//! 2. Score the whole generation through a [`GenerationEvaluator`].
//! 3. Track the best individual ever seen, lexicographically by
//!    (constraint violation, cost), and record the generation's best.
//! 4. Ask the [`TerminationPolicy`]; stop or breed the next generation:
//!    elites are copied unchanged, the rest come from tournament-selected
//!    parents through crossover and per-gene mutation.
//!
//! Every vector the optimizer produces lies within its [`Bounds`].
//!
//! # Reference
//! Goldberg (1989), "Genetic Algorithms in Search, Optimization, and Machine Learning"

use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::operators::GeneticOperators;
use super::selection::tournament;
use super::termination::{OptimizerState, TerminationPolicy, TerminationReason};
use super::{Bounds, Population};
use crate::cost::Evaluation;
use crate::error::ConfigError;
use crate::evaluation::GenerationEvaluator;

/// Genetic search parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Probability that two selected parents are recombined.
    pub crossover_probability: f64,
    /// Per-gene mutation probability.
    pub mutation_probability: f64,
    /// Entrants per tournament.
    pub tournament_size: usize,
    /// Best individuals copied unchanged into the next generation.
    pub elite_count: usize,
    /// Generations without improvement before stopping.
    pub stagnation_generations: usize,
    /// Hard generation limit.
    pub max_generations: usize,
    /// Crossover and mutation strategies.
    pub operators: GeneticOperators,
    /// RNG seed; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            crossover_probability: 0.9,
            mutation_probability: 0.1,
            tournament_size: 2,
            elite_count: 1,
            stagnation_generations: 30,
            max_generations: 500,
            operators: GeneticOperators::default(),
            seed: None,
        }
    }
}

impl OptimizerConfig {
    /// Sets the crossover probability.
    pub fn with_crossover_probability(mut self, p: f64) -> Self {
        self.crossover_probability = p;
        self
    }

    /// Sets the per-gene mutation probability.
    pub fn with_mutation_probability(mut self, p: f64) -> Self {
        self.mutation_probability = p;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    /// Sets the elite count.
    pub fn with_elite_count(mut self, count: usize) -> Self {
        self.elite_count = count;
        self
    }

    /// Sets the stagnation window.
    pub fn with_stagnation_generations(mut self, generations: usize) -> Self {
        self.stagnation_generations = generations;
        self
    }

    /// Sets the generation limit.
    pub fn with_max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets the genetic operators.
    pub fn with_operators(mut self, operators: GeneticOperators) -> Self {
        self.operators = operators;
        self
    }

    /// Fixes the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("crossover_probability", self.crossover_probability),
            ("mutation_probability", self.mutation_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }
        if self.tournament_size == 0 {
            return Err(ConfigError::ZeroTournament);
        }
        Ok(())
    }
}

/// Outcome of one optimization run.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Best decision vector seen.
    pub best: Vec<usize>,
    /// Its evaluation.
    pub evaluation: Evaluation,
    /// Generations evaluated.
    pub generations: usize,
    /// Objective evaluations performed.
    pub evaluations: usize,
    /// Best evaluation of each generation, in order.
    pub history: Vec<Evaluation>,
    /// Why the run stopped.
    pub reason: TerminationReason,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

/// Genetic optimizer for one bounded integer problem.
#[derive(Debug, Clone)]
pub struct EvolutionaryOptimizer {
    bounds: Bounds,
    population_size: usize,
    config: OptimizerConfig,
}

impl EvolutionaryOptimizer {
    /// Creates an optimizer; `population_size` is raised to at least 1.
    pub fn new(bounds: Bounds, population_size: usize, config: OptimizerConfig) -> Self {
        Self {
            bounds,
            population_size: population_size.max(1),
            config,
        }
    }

    /// Variable bounds.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Random initial population; `seeds` (clamped to bounds) take the
    /// first slots.
    pub fn initialize<R: Rng>(&self, seeds: &[Vec<usize>], rng: &mut R) -> Population {
        let mut vectors: Vec<Vec<usize>> = seeds
            .iter()
            .take(self.population_size)
            .map(|s| self.bounds.clamp(s))
            .collect();
        while vectors.len() < self.population_size {
            vectors.push(self.bounds.random_vector(rng));
        }
        Population::new(vectors)
    }

    /// Scores every individual of `population` in place.
    pub fn evaluate_generation<E: GenerationEvaluator + ?Sized>(
        &self,
        population: &mut Population,
        evaluator: &E,
    ) {
        population.evaluations = evaluator.evaluate_all(&population.vectors);
    }

    /// Breeds the next generation from a scored population.
    pub fn next_generation<R: Rng>(&self, population: &Population, rng: &mut R) -> Population {
        let mut vectors = Vec::with_capacity(self.population_size);
        for &i in population.ranked().iter().take(self.config.elite_count) {
            vectors.push(population.vectors[i].clone());
        }

        let ops = &self.config.operators;
        while vectors.len() < self.population_size {
            let a = tournament(&population.evaluations, self.config.tournament_size, rng);
            let b = tournament(&population.evaluations, self.config.tournament_size, rng);
            let (mut c1, mut c2) = if rng.random_bool(self.config.crossover_probability) {
                ops.crossover(&population.vectors[a], &population.vectors[b], rng)
            } else {
                (population.vectors[a].clone(), population.vectors[b].clone())
            };
            ops.mutate(&mut c1, &self.bounds, self.config.mutation_probability, rng);
            ops.mutate(&mut c2, &self.bounds, self.config.mutation_probability, rng);
            vectors.push(c1);
            if vectors.len() < self.population_size {
                vectors.push(c2);
            }
        }
        Population::new(vectors)
    }

    /// Runs generations until `policy` stops the search.
    ///
    /// At least one generation is always scored, so a result exists even
    /// when the policy's deadline has already passed.
    pub fn run<E, P, R>(
        &self,
        evaluator: &E,
        policy: &P,
        seeds: &[Vec<usize>],
        rng: &mut R,
    ) -> OptimizationResult
    where
        E: GenerationEvaluator + ?Sized,
        P: TerminationPolicy + ?Sized,
        R: Rng,
    {
        let started = Instant::now();
        let mut population = self.initialize(seeds, rng);
        let mut best: Option<(Vec<usize>, Evaluation)> = None;
        let mut history = Vec::new();
        let mut stagnant_generations = 0;
        let mut evaluations = 0;

        loop {
            self.evaluate_generation(&mut population, evaluator);
            evaluations += population.len();

            if let Some(i) = population.best() {
                let candidate = population.evaluations[i];
                history.push(candidate);
                match &best {
                    Some((_, current)) if !candidate.is_better_than(current) => {
                        stagnant_generations += 1;
                    }
                    _ => {
                        best = Some((population.vectors[i].clone(), candidate));
                        stagnant_generations = 0;
                    }
                }
                debug!(
                    generation = history.len(),
                    cost = candidate.cost,
                    violation = candidate.violation,
                    "generation scored"
                );
            }

            let state = OptimizerState {
                generation: history.len(),
                best: best
                    .as_ref()
                    .map_or(Evaluation::penalized(), |(_, eval)| *eval),
                stagnant_generations,
                evaluations,
            };
            if let Some(reason) = policy.check(&state) {
                let (best, evaluation) =
                    best.unwrap_or_else(|| (self.bounds.clamp(&[]), Evaluation::penalized()));
                return OptimizationResult {
                    best,
                    evaluation,
                    generations: history.len(),
                    evaluations,
                    history,
                    reason,
                    elapsed: started.elapsed(),
                };
            }

            population = self.next_generation(&population, rng);
        }
    }
}
