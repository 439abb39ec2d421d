//! Placement decisions handed to the dispatch collaborator.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ga::TerminationReason;

/// Diagnostics for one scheduling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Individuals per generation.
    pub population_size: usize,
    /// Evaluator threads used.
    pub evaluator_threads: usize,
    /// Generations evaluated.
    pub generations: usize,
    /// Cost evaluations performed.
    pub evaluations: usize,
    /// Best cost of each generation.
    pub cost_history: Vec<f64>,
    /// Why the search stopped.
    pub termination: TerminationReason,
    /// Wall-clock time of the whole run.
    pub elapsed: Duration,
}

/// Best task-to-worker assignment found for an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Application name.
    pub application: String,
    /// Task name to worker id, for every placeable task.
    pub assignment: BTreeMap<String, String>,
    /// Tasks with no candidate worker.
    pub unplaced: Vec<String>,
    /// Estimated end-to-end response time (seconds).
    pub estimated_cost: f64,
    /// Total constraint violation of the chosen assignment.
    pub constraint_violation: f64,
    /// Whether every task is placed and no constraint is violated.
    pub feasible: bool,
    /// Run diagnostics.
    pub stats: RunStats,
}

impl Placement {
    /// Worker assigned to `task`, if any.
    pub fn worker_for(&self, task: &str) -> Option<&str> {
        self.assignment.get(task).map(String::as_str)
    }

    /// Number of placed tasks.
    pub fn placed_count(&self) -> usize {
        self.assignment.len()
    }

    /// Tasks grouped by assigned worker.
    pub fn by_worker(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (task, worker) in &self.assignment {
            groups.entry(worker.as_str()).or_default().push(task.as_str());
        }
        groups
    }
}
