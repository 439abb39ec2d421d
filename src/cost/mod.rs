//! Cost model for candidate placements.
//!
//! Maps a decision vector (one candidate index per task) plus the current
//! profiles to an estimated response time and a constraint violation.
//!
//! # Model
//!
//! - **Processing**: `median_processing_time × (reference_frequency / worker_frequency)`,
//!   optionally divided by the worker's free CPU share.
//! - **Communication**: `median_package_size / transfer_speed` for every
//!   edge whose endpoints run on different workers; zero otherwise.
//! - **Aggregation**: critical path through the DAG (default) or serial sum.
//! - **Constraints**: tasks without candidates and workers whose free
//!   memory is exceeded contribute to the constraint violation.
//!
//! # Submodules
//!
//! - [`CandidatePools`]: per-task ordered worker lists from discovery
//! - [`CostEstimator`]: the estimator itself

mod candidates;
mod estimator;

pub use candidates::{CandidatePool, CandidatePools};
pub use estimator::{CostBreakdown, CostEstimator, EdgeDelay, TaskTiming};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Fitness of one decision vector.
///
/// Lower is better on both axes; a zero violation means feasible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Estimated response time (seconds).
    pub cost: f64,
    /// Non-negative constraint violation.
    pub violation: f64,
}

impl Evaluation {
    /// A feasible evaluation with the given cost.
    pub fn feasible(cost: f64) -> Self {
        Self {
            cost,
            violation: 0.0,
        }
    }

    /// The worst possible evaluation, assigned when scoring fails.
    pub fn penalized() -> Self {
        Self {
            cost: f64::MAX,
            violation: f64::MAX,
        }
    }

    /// Whether the placement satisfies every constraint.
    pub fn is_feasible(&self) -> bool {
        self.violation == 0.0
    }

    /// Lexicographic (violation, cost) comparison, used to track the best
    /// individual.
    pub fn is_better_than(&self, other: &Evaluation) -> bool {
        match self.violation.total_cmp(&other.violation) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => self.cost < other.cost,
        }
    }
}

/// Which observed speed converts package size into transfer delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransferSpeedPolicy {
    /// Slowest observed speed (conservative).
    #[default]
    Worst,
    /// Fastest observed speed.
    Best,
    /// Midpoint of slowest and fastest.
    Mean,
}

impl TransferSpeedPolicy {
    /// Picks the speed from an observed range.
    pub fn speed(&self, min_speed: f64, max_speed: f64) -> f64 {
        match self {
            Self::Worst => min_speed,
            Self::Best => max_speed,
            Self::Mean => (min_speed + max_speed) / 2.0,
        }
    }
}

/// How per-task times combine into the total cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AggregationPolicy {
    /// Longest dependency chain (independent tasks run in parallel).
    #[default]
    CriticalPath,
    /// Sum of all processing and communication times.
    SerialSum,
}

/// Cost model parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostModelConfig {
    /// Transfer speed choice per edge.
    pub speed_policy: TransferSpeedPolicy,
    /// Aggregation of task times.
    pub aggregation: AggregationPolicy,
    /// Stretch processing time by the worker's free CPU share.
    pub load_aware: bool,
    /// Violation added per task without candidates.
    pub infeasibility_penalty: f64,
}

impl Default for CostModelConfig {
    fn default() -> Self {
        Self {
            speed_policy: TransferSpeedPolicy::Worst,
            aggregation: AggregationPolicy::CriticalPath,
            load_aware: false,
            infeasibility_penalty: 1e6,
        }
    }
}

impl CostModelConfig {
    /// Sets the transfer speed policy.
    pub fn with_speed_policy(mut self, policy: TransferSpeedPolicy) -> Self {
        self.speed_policy = policy;
        self
    }

    /// Sets the aggregation policy.
    pub fn with_aggregation(mut self, aggregation: AggregationPolicy) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Enables or disables load awareness.
    pub fn with_load_aware(mut self, load_aware: bool) -> Self {
        self.load_aware = load_aware;
        self
    }

    /// Sets the per-task infeasibility penalty.
    pub fn with_infeasibility_penalty(mut self, penalty: f64) -> Self {
        self.infeasibility_penalty = penalty;
        self
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.infeasibility_penalty.is_finite() || self.infeasibility_penalty <= 0.0 {
            return Err(ConfigError::InvalidPenalty(self.infeasibility_penalty));
        }
        Ok(())
    }
}
