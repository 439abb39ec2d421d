//! Error types.
//!
//! Infeasible placements are not errors: they surface as
//! `feasible == false` on the result. Errors here are either precondition
//! violations rejected before any generation runs, or failures inside a
//! single cost evaluation, which the evaluation pool absorbs.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors returned by [`PlacementScheduler::schedule`](crate::scheduler::PlacementScheduler::schedule).
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Scheduling parameters are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The application graph failed validation.
    #[error("invalid task graph: {}", summarize(.0))]
    InvalidGraph(Vec<ValidationError>),

    /// The operating system refused to start an evaluator thread.
    #[error("failed to spawn evaluator thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}

/// Configuration precondition violations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Population size must be positive.
    #[error("population size must be at least 1")]
    ZeroPopulation,

    /// At least one evaluator thread is required.
    #[error("evaluator thread count must be at least 1")]
    ZeroThreads,

    /// Wall-clock budget must be finite and positive.
    #[error("maximum duration must be finite and positive, got {0}")]
    InvalidDuration(f64),

    /// A probability parameter is outside `0.0..=1.0`.
    #[error("{name} must be within 0.0..=1.0, got {value}")]
    InvalidProbability {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// Infeasibility penalty must be finite and positive.
    #[error("infeasibility penalty must be finite and positive, got {0}")]
    InvalidPenalty(f64),

    /// Tournament size must be positive.
    #[error("tournament size must be at least 1")]
    ZeroTournament,
}

/// Failure while estimating the cost of one decision vector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    /// A candidate worker has no profile (deregistered mid-run).
    #[error("no profile for worker '{0}'")]
    UnknownWorker(String),

    /// A worker profile holds values the cost model cannot use.
    #[error("invalid profile for worker '{worker}': {reason}")]
    InvalidProfile {
        /// Worker id.
        worker: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A profiled task or edge weight holds values the cost model cannot use.
    #[error("invalid weight for '{key}': {reason}")]
    InvalidWeight {
        /// Task name, or `source -> destination` for an edge.
        key: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A gene indexes past the end of its candidate pool.
    #[error("gene {index} out of bounds for task '{task}' with {len} candidates")]
    GeneOutOfBounds {
        /// Task name.
        task: String,
        /// Offending index.
        index: usize,
        /// Candidate pool size.
        len: usize,
    },

    /// Decision vector length differs from the task count.
    #[error("decision vector has {actual} genes, expected {expected}")]
    LengthMismatch {
        /// Task count.
        expected: usize,
        /// Vector length.
        actual: usize,
    },
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_config_error_message() {
        let err = SchedulerError::from(ConfigError::ZeroThreads);
        assert_eq!(
            err.to_string(),
            "invalid configuration: evaluator thread count must be at least 1"
        );
    }

    #[test]
    fn test_graph_error_joins_messages() {
        let err = SchedulerError::InvalidGraph(vec![
            ValidationError::new(ValidationErrorKind::EmptyGraph, "no tasks"),
            ValidationError::new(ValidationErrorKind::UnknownTask, "unknown 'X'"),
        ]);
        assert_eq!(err.to_string(), "invalid task graph: no tasks; unknown 'X'");
    }
}
