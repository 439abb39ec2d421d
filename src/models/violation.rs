//! Constraint violations of a candidate placement.
//!
//! A placement may be infeasible without being an error: a task may have no
//! capable worker yet, or a worker may lack the memory for what is placed
//! on it. Each violation carries a non-negative amount; the sum is the
//! constraint violation used by selection.

use serde::{Deserialize, Serialize};

/// A constraint violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity (task name or worker id).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Penalty contributed to the total constraint violation.
    pub amount: f64,
}

/// Classification of constraint violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// No worker is currently capable of running the task.
    NoCandidates,
    /// Tasks placed on a worker demand more memory than it has free.
    MemoryExceeded,
}

impl Violation {
    /// Creates a missing-candidates violation.
    pub fn no_candidates(task: impl Into<String>, penalty: f64) -> Self {
        let task = task.into();
        Self {
            violation_type: ViolationType::NoCandidates,
            message: format!("No worker can run task '{task}'"),
            entity_id: task,
            amount: penalty,
        }
    }

    /// Creates a memory violation; `excess` is in bytes, the amount in MiB.
    pub fn memory_exceeded(worker: impl Into<String>, excess: f64) -> Self {
        let worker = worker.into();
        Self {
            violation_type: ViolationType::MemoryExceeded,
            message: format!("Worker '{worker}' over-committed by {excess:.0} bytes"),
            entity_id: worker,
            amount: excess / (1024.0 * 1024.0),
        }
    }
}

/// Sum of violation amounts; `+0.0` when there are none.
pub fn total_violation(violations: &[Violation]) -> f64 {
    violations.iter().fold(0.0, |acc, v| acc + v.amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_violation_in_mib() {
        let v = Violation::memory_exceeded("w1", 2.0 * 1024.0 * 1024.0);
        assert_eq!(v.violation_type, ViolationType::MemoryExceeded);
        assert_eq!(v.entity_id, "w1");
        assert!((v.amount - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_total_violation() {
        let vs = vec![
            Violation::no_candidates("B", 1e6),
            Violation::memory_exceeded("w1", 1024.0 * 1024.0),
        ];
        assert!((total_violation(&vs) - 1_000_001.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_violations_is_positive_zero() {
        let total = total_violation(&[]);
        assert_eq!(total, 0.0);
        assert!(total.is_sign_positive());
        assert_eq!(total.total_cmp(&0.0), std::cmp::Ordering::Equal);
    }
}
