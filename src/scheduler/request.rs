//! Scheduling request parameters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cost::CostModelConfig;
use crate::error::ConfigError;
use crate::ga::OptimizerConfig;

/// Input parameters for one scheduling run.
///
/// # Example
/// ```
/// use fog_placement::scheduler::ScheduleRequest;
///
/// let request = ScheduleRequest::new(40, 4, 0.5);
/// assert!(request.validate().is_ok());
/// assert!(ScheduleRequest::new(0, 4, 0.5).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleRequest {
    /// Individuals per generation.
    pub population_size: usize,
    /// Concurrent cost evaluations.
    pub evaluator_threads: usize,
    /// Wall-clock budget (seconds).
    pub max_duration_secs: f64,
    /// Genetic search parameters.
    pub optimizer: OptimizerConfig,
    /// Cost model options.
    pub cost_model: CostModelConfig,
}

impl Default for ScheduleRequest {
    fn default() -> Self {
        Self {
            population_size: 50,
            evaluator_threads: 4,
            max_duration_secs: 1.0,
            optimizer: OptimizerConfig::default(),
            cost_model: CostModelConfig::default(),
        }
    }
}

impl ScheduleRequest {
    /// Creates a request with default optimizer and cost model settings.
    pub fn new(population_size: usize, evaluator_threads: usize, max_duration_secs: f64) -> Self {
        Self {
            population_size,
            evaluator_threads,
            max_duration_secs,
            ..Default::default()
        }
    }

    /// Sets the optimizer configuration.
    pub fn with_optimizer(mut self, optimizer: OptimizerConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Sets the cost model configuration.
    pub fn with_cost_model(mut self, cost_model: CostModelConfig) -> Self {
        self.cost_model = cost_model;
        self
    }

    /// Wall-clock budget as a [`Duration`].
    ///
    /// Only meaningful after [`validate`](Self::validate) succeeds.
    pub fn max_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.max_duration_secs).unwrap_or(Duration::ZERO)
    }

    /// Checks every precondition, including nested configs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::ZeroPopulation);
        }
        if self.evaluator_threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        if !self.max_duration_secs.is_finite() || self.max_duration_secs <= 0.0 {
            return Err(ConfigError::InvalidDuration(self.max_duration_secs));
        }
        self.optimizer.validate()?;
        self.cost_model.validate()
    }
}
