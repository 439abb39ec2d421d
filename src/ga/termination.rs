//! Termination policies.
//!
//! A policy is consulted once per generation, after the generation has
//! been scored. [`Stagnation`] is the baseline convergence criterion;
//! [`WallClock`] wraps any policy with a hard deadline that overrides it.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::cost::Evaluation;

/// Why an optimization run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Best objective did not improve for the configured window.
    Stagnation,
    /// Generation limit reached.
    MaxGenerations,
    /// Wall-clock budget exhausted.
    Deadline,
}

/// Snapshot of optimizer progress handed to a policy.
#[derive(Debug, Clone, Copy)]
pub struct OptimizerState {
    /// Generations evaluated so far.
    pub generation: usize,
    /// Best evaluation seen in any generation.
    pub best: Evaluation,
    /// Consecutive generations without improvement of `best`.
    pub stagnant_generations: usize,
    /// Objective evaluations performed so far.
    pub evaluations: usize,
}

/// Decides whether the optimizer runs another generation.
pub trait TerminationPolicy {
    /// Returns the reason to stop, or `None` to continue.
    fn check(&self, state: &OptimizerState) -> Option<TerminationReason>;

    /// Whether another generation should run.
    fn should_continue(&self, state: &OptimizerState) -> bool {
        self.check(state).is_none()
    }
}

/// Stops after `window` generations without improvement, or after
/// `max_generations` generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stagnation {
    /// Generations without improvement tolerated.
    pub window: usize,
    /// Hard generation limit.
    pub max_generations: usize,
}

impl Stagnation {
    /// Creates the criterion.
    pub fn new(window: usize, max_generations: usize) -> Self {
        Self {
            window,
            max_generations,
        }
    }
}

impl TerminationPolicy for Stagnation {
    fn check(&self, state: &OptimizerState) -> Option<TerminationReason> {
        if state.generation >= self.max_generations {
            Some(TerminationReason::MaxGenerations)
        } else if state.stagnant_generations >= self.window {
            Some(TerminationReason::Stagnation)
        } else {
            None
        }
    }
}

/// Wraps a policy with a wall-clock ceiling.
///
/// The clock starts at construction. Once the ceiling is exceeded the run
/// stops regardless of the inner policy's verdict.
#[derive(Debug, Clone)]
pub struct WallClock<P> {
    inner: P,
    started: Instant,
    max_duration: Duration,
}

impl<P: TerminationPolicy> WallClock<P> {
    /// Starts the clock now.
    pub fn new(inner: P, max_duration: Duration) -> Self {
        Self {
            inner,
            started: Instant::now(),
            max_duration,
        }
    }

    /// Time since construction.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time left before the ceiling, zero once exceeded.
    pub fn remaining(&self) -> Duration {
        self.max_duration.saturating_sub(self.elapsed())
    }
}

impl<P: TerminationPolicy> TerminationPolicy for WallClock<P> {
    fn check(&self, state: &OptimizerState) -> Option<TerminationReason> {
        if self.elapsed() >= self.max_duration {
            return Some(TerminationReason::Deadline);
        }
        self.inner.check(state)
    }
}
