//! Response-time estimator.
//!
//! # Algorithm
//!
//! 1. Resolve each gene to a worker through the candidate pools.
//! 2. Read each distinct worker's profile once; rescale each task's
//!    profiled processing time to that worker's CPU frequency.
//! 3. Walk tasks in topological order. A task starts when its last parent's
//!    output has arrived: `start = max(finish(parent) + delay(parent, task))`.
//! 4. Cost is the latest finish time (critical path), or the plain sum of
//!    all processing and transfer times under `SerialSum`.
//!
//! Memory demand per worker is summed and compared with the worker's free
//! memory; tasks without candidates are charged a fixed penalty. Neither
//! raises an error.
//!
//! # Complexity
//! O(n + e) per evaluation, n = tasks, e = dependency edges.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{AggregationPolicy, CandidatePools, CostModelConfig, Evaluation};
use crate::error::EstimateError;
use crate::evaluation::Objective;
use crate::models::{Application, Violation, WorkerProfile, total_violation};
use crate::profile::ProfileSource;

/// Lower bound on the free CPU share used by load-aware scaling.
const MIN_CPU_SHARE: f64 = 0.05;

/// Timing of one task under a candidate placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskTiming {
    /// Task name.
    pub task: String,
    /// Chosen worker, `None` if the task has no candidates.
    pub worker: Option<String>,
    /// Earliest start (seconds from application start).
    pub start: f64,
    /// Processing time on the chosen worker (seconds).
    pub processing: f64,
    /// Finish time (seconds).
    pub finish: f64,
}

/// Transfer delay of one dependency edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDelay {
    /// Source task name.
    pub source: String,
    /// Destination task name.
    pub destination: String,
    /// Delay (seconds); zero when both ends share a worker.
    pub delay: f64,
}

/// Full diagnostic breakdown of one estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Per-task timings, in application task order.
    pub tasks: Vec<TaskTiming>,
    /// Per-edge delays.
    pub edges: Vec<EdgeDelay>,
    /// Constraint violations.
    pub violations: Vec<Violation>,
    /// Total estimated cost (seconds).
    pub cost: f64,
}

impl CostBreakdown {
    /// Reduces the breakdown to an [`Evaluation`].
    pub fn evaluation(&self) -> Evaluation {
        Evaluation {
            cost: self.cost,
            violation: total_violation(&self.violations),
        }
    }
}

/// Estimates the response time of candidate placements.
///
/// Holds the task graph and candidate pools fixed for one scheduling run,
/// and reads profiles and weights live from the shared source. It has no
/// mutable state, so evaluator threads can share one instance.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use fog_placement::cost::{CandidatePools, CostEstimator, CostModelConfig};
/// use fog_placement::models::{Application, TaskWeight, Worker, WorkerProfile};
/// use fog_placement::profile::ProfileStore;
///
/// let app = Application::from_edges("app", &["A"], &[]);
/// let store = Arc::new(ProfileStore::new());
/// store.register_worker(
///     Worker::new("w").with_profile(WorkerProfile::new(2, 2000.0)).with_capability("A"),
/// );
/// store.record_task_weight("app", "A", TaskWeight::new(1.0, 1000.0));
///
/// let pools = CandidatePools::discover(&app, store.as_ref());
/// let estimator = CostEstimator::new(&app, pools, store, CostModelConfig::default());
/// let eval = estimator.estimate(&[0]).unwrap();
/// assert!((eval.cost - 0.5).abs() < 1e-9);
/// assert!(eval.is_feasible());
/// ```
pub struct CostEstimator<S: ProfileSource + ?Sized> {
    app_name: String,
    task_names: Vec<String>,
    /// Parent positions per task.
    parents: Vec<Vec<usize>>,
    /// Topological order; falls back to insertion order for cyclic input.
    order: Vec<usize>,
    pools: CandidatePools,
    source: Arc<S>,
    config: CostModelConfig,
}

impl<S: ProfileSource + ?Sized> CostEstimator<S> {
    /// Creates an estimator for one application.
    ///
    /// `pools` must be in the application's task order.
    pub fn new(
        app: &Application,
        pools: CandidatePools,
        source: Arc<S>,
        config: CostModelConfig,
    ) -> Self {
        let n = app.task_count();
        let mut parents = vec![Vec::new(); n];
        for (p, c) in app.edges() {
            parents[c].push(p);
        }
        let order = app.topological_order().unwrap_or_else(|| (0..n).collect());

        Self {
            app_name: app.name.clone(),
            task_names: app.tasks().iter().map(|t| t.name.clone()).collect(),
            parents,
            order,
            pools,
            source,
            config,
        }
    }

    /// Candidate pools this estimator resolves genes against.
    pub fn pools(&self) -> &CandidatePools {
        &self.pools
    }

    /// Number of decision variables.
    pub fn task_count(&self) -> usize {
        self.task_names.len()
    }

    /// Estimates cost and constraint violation of a decision vector.
    pub fn estimate(&self, genes: &[usize]) -> Result<Evaluation, EstimateError> {
        self.breakdown(genes).map(|b| b.evaluation())
    }

    /// Estimates with per-task and per-edge detail.
    pub fn breakdown(&self, genes: &[usize]) -> Result<CostBreakdown, EstimateError> {
        let n = self.task_names.len();
        if genes.len() != n {
            return Err(EstimateError::LengthMismatch {
                expected: n,
                actual: genes.len(),
            });
        }

        let mut workers: Vec<Option<&str>> = Vec::with_capacity(n);
        for (task, &gene) in genes.iter().enumerate() {
            workers.push(self.pools.resolve(task, gene)?);
        }

        let mut profiles: HashMap<&str, WorkerProfile> = HashMap::new();
        for &worker in workers.iter().flatten() {
            if !profiles.contains_key(worker) {
                profiles.insert(worker, self.load_profile(worker)?);
            }
        }

        let mut violations = Vec::new();
        let mut processing = vec![0.0; n];
        let mut memory_demand: HashMap<&str, f64> = HashMap::new();

        for task in 0..n {
            let name = &self.task_names[task];
            let Some(worker) = workers[task] else {
                violations.push(Violation::no_candidates(
                    name.as_str(),
                    self.config.infeasibility_penalty,
                ));
                continue;
            };
            let profile = &profiles[worker];
            let Some(weight) = self.source.task_weight(&self.app_name, name) else {
                trace!(task = %name, "no task weight, assuming zero processing time");
                continue;
            };
            weight
                .validate()
                .map_err(|reason| EstimateError::InvalidWeight {
                    key: name.clone(),
                    reason,
                })?;

            let mut time = weight.scaled_time(profile.cpu_frequency);
            if self.config.load_aware {
                time /= profile.cpu_available().max(MIN_CPU_SHARE);
            }
            processing[task] = time;
            *memory_demand.entry(worker).or_insert(0.0) += weight.memory_demand as f64;
        }

        for (worker, demand) in &memory_demand {
            let available = profiles[worker].memory_available();
            if *demand > available {
                violations.push(Violation::memory_exceeded(*worker, demand - available));
            }
        }

        let mut start = vec![0.0_f64; n];
        let mut finish = vec![0.0_f64; n];
        let mut edges = Vec::new();
        for &task in &self.order {
            for &parent in &self.parents[task] {
                let delay = self.transfer_delay(parent, task, workers[parent], workers[task])?;
                start[task] = start[task].max(finish[parent] + delay);
                edges.push(EdgeDelay {
                    source: self.task_names[parent].clone(),
                    destination: self.task_names[task].clone(),
                    delay,
                });
            }
            finish[task] = start[task] + processing[task];
        }

        let cost = match self.config.aggregation {
            AggregationPolicy::CriticalPath => finish.iter().copied().fold(0.0, f64::max),
            AggregationPolicy::SerialSum => {
                processing.iter().sum::<f64>() + edges.iter().map(|e| e.delay).sum::<f64>()
            }
        };

        let tasks = (0..n)
            .map(|i| TaskTiming {
                task: self.task_names[i].clone(),
                worker: workers[i].map(str::to_string),
                start: start[i],
                processing: processing[i],
                finish: finish[i],
            })
            .collect();

        Ok(CostBreakdown {
            tasks,
            edges,
            violations,
            cost,
        })
    }

    fn load_profile(&self, worker: &str) -> Result<WorkerProfile, EstimateError> {
        let profile = self
            .source
            .worker_profile(worker)
            .ok_or_else(|| EstimateError::UnknownWorker(worker.to_string()))?;
        if !profile.cpu_frequency.is_finite() || profile.cpu_frequency <= 0.0 {
            return Err(EstimateError::InvalidProfile {
                worker: worker.to_string(),
                reason: format!("cpu frequency {}", profile.cpu_frequency),
            });
        }
        Ok(profile)
    }

    /// Delay of moving `parent`'s output to `task`.
    ///
    /// Zero when both run on the same worker, when either has no worker, or
    /// when the edge has not been profiled yet. If the policy's speed is not
    /// positive the fastest observed speed is used instead.
    fn transfer_delay(
        &self,
        parent: usize,
        task: usize,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<f64, EstimateError> {
        match (from, to) {
            (Some(a), Some(b)) if a != b => {}
            _ => return Ok(0.0),
        }
        let (source, destination) = (&self.task_names[parent], &self.task_names[task]);
        let Some(edge) = self.source.edge_weight(&self.app_name, source, destination) else {
            return Ok(0.0);
        };
        edge.validate()
            .map_err(|reason| EstimateError::InvalidWeight {
                key: format!("{source} -> {destination}"),
                reason,
            })?;

        let mut speed = self.config.speed_policy.speed(edge.min_speed, edge.max_speed);
        if speed <= 0.0 {
            speed = edge.max_speed;
        }
        if speed <= 0.0 || edge.median_package_size <= 0.0 {
            return Ok(0.0);
        }
        Ok(edge.median_package_size / speed)
    }
}

impl<S: ProfileSource + ?Sized> Objective for CostEstimator<S> {
    fn evaluate(&self, genes: &[usize]) -> Result<Evaluation, EstimateError> {
        self.estimate(genes)
    }
}
