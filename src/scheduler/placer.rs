//! Evolutionary placement scheduler.
//!
//! # Algorithm
//!
//! 1. Reject invalid parameters and malformed task graphs.
//! 2. Start the wall clock, then discover candidate pools for every task.
//! 3. Bound each gene by its pool size and seed the population with the
//!    fastest-CPU candidate per task.
//! 4. Run genetic search, scoring each generation on a bounded evaluator
//!    pool, until stagnation or the deadline.
//! 5. Resolve the best vector into task-to-worker pairs.
//!
//! A task without candidates never aborts a run. It is listed as unplaced
//! and the placement is reported infeasible, so the caller can retry once
//! new workers register.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info};

use super::{Placement, RunStats, ScheduleRequest};
use crate::cost::{CandidatePools, CostEstimator};
use crate::error::SchedulerError;
use crate::evaluation::EvaluationPool;
use crate::ga::{Bounds, EvolutionaryOptimizer, Stagnation, WallClock};
use crate::models::Application;
use crate::profile::ProfileSource;
use crate::validation::validate_application;

/// Places application tasks on workers known to a profile source.
///
/// Holds only a shared handle to the source, so one scheduler (or clones
/// of it) can serve concurrent requests while profilers keep writing.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use fog_placement::models::{Application, TaskWeight, Worker, WorkerProfile};
/// use fog_placement::profile::ProfileStore;
/// use fog_placement::scheduler::{PlacementScheduler, ScheduleRequest};
///
/// let store = Arc::new(ProfileStore::new());
/// for (id, freq) in [("edge-1", 1200.0), ("edge-2", 2400.0)] {
///     store.register_worker(
///         Worker::new(id)
///             .with_profile(WorkerProfile::new(4, freq))
///             .with_capability("detect")
///             .with_capability("classify"),
///     );
/// }
/// store.record_task_weight("vision", "detect", TaskWeight::new(0.4, 2400.0));
/// store.record_task_weight("vision", "classify", TaskWeight::new(0.2, 2400.0));
///
/// let app = Application::from_edges(
///     "vision",
///     &["detect", "classify"],
///     &[("detect", "classify")],
/// );
/// let scheduler = PlacementScheduler::new(store);
/// let placement = scheduler.schedule(&app, &ScheduleRequest::new(16, 2, 0.5)).unwrap();
///
/// assert!(placement.feasible);
/// assert_eq!(placement.worker_for("detect"), Some("edge-2"));
/// assert_eq!(placement.worker_for("classify"), Some("edge-2"));
/// ```
pub struct PlacementScheduler<S: ProfileSource + ?Sized> {
    source: Arc<S>,
}

impl<S: ProfileSource + ?Sized> Clone for PlacementScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<S: ProfileSource + ?Sized + 'static> PlacementScheduler<S> {
    /// Creates a scheduler over a shared profile source.
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Profile source this scheduler reads.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Finds a placement for `app` within the request's time budget.
    ///
    /// # Errors
    /// Fails before any generation runs if the request parameters are out
    /// of range, the graph is empty or malformed, or evaluator threads
    /// cannot be spawned.
    pub fn schedule(
        &self,
        app: &Application,
        request: &ScheduleRequest,
    ) -> Result<Placement, SchedulerError> {
        request.validate()?;
        validate_application(app).map_err(SchedulerError::InvalidGraph)?;

        let started = Instant::now();
        let policy = WallClock::new(
            Stagnation::new(
                request.optimizer.stagnation_generations,
                request.optimizer.max_generations,
            ),
            request.max_duration(),
        );

        let pools = CandidatePools::discover(app, self.source.as_ref());
        let bounds = Bounds::from_pool_sizes(&pools.sizes());
        let greedy: Vec<usize> = pools
            .pools()
            .iter()
            .map(|pool| pool.fastest().unwrap_or(0))
            .collect();
        let unplaceable = pools.unplaceable().len();

        info!(
            application = %app.name,
            tasks = app.task_count(),
            unplaceable,
            search_space = bounds.search_space(),
            population = request.population_size,
            threads = request.evaluator_threads,
            "placement started"
        );

        let estimator = Arc::new(CostEstimator::new(
            app,
            pools,
            Arc::clone(&self.source),
            request.cost_model.clone(),
        ));
        let evaluator = EvaluationPool::new(request.evaluator_threads, Arc::clone(&estimator))?;

        let mut rng = match request.optimizer.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let optimizer =
            EvolutionaryOptimizer::new(bounds, request.population_size, request.optimizer.clone());
        let result = optimizer.run(&evaluator, &policy, &[greedy], &mut rng);
        drop(evaluator);

        let mut assignment = BTreeMap::new();
        let mut unplaced = Vec::new();
        for (task, (&gene, node)) in result.best.iter().zip(app.tasks()).enumerate() {
            match estimator.pools().resolve(task, gene) {
                Ok(Some(worker)) => {
                    assignment.insert(node.name.clone(), worker.to_string());
                }
                Ok(None) => unplaced.push(node.name.clone()),
                Err(err) => {
                    debug!(task = %node.name, error = %err, "best vector gene unresolvable");
                    unplaced.push(node.name.clone());
                }
            }
        }

        let feasible = unplaced.is_empty() && result.evaluation.is_feasible();
        let elapsed = started.elapsed();
        info!(
            application = %app.name,
            generations = result.generations,
            evaluations = result.evaluations,
            cost = result.evaluation.cost,
            violation = result.evaluation.violation,
            feasible,
            reason = ?result.reason,
            elapsed_ms = elapsed.as_millis() as u64,
            "placement finished"
        );

        Ok(Placement {
            application: app.name.clone(),
            assignment,
            unplaced,
            estimated_cost: result.evaluation.cost,
            constraint_violation: result.evaluation.violation,
            feasible,
            stats: RunStats {
                population_size: request.population_size,
                evaluator_threads: request.evaluator_threads,
                generations: result.generations,
                evaluations: result.evaluations,
                cost_history: result.history.iter().map(|e| e.cost).collect(),
                termination: result.reason,
                elapsed,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::ga::{OptimizerConfig, TerminationReason};
    use crate::models::{EdgeWeight, TaskWeight, Worker, WorkerProfile};
    use crate::profile::ProfileStore;
    use crate::validation::ValidationErrorKind;
    use std::thread;
    use std::time::Duration;

    fn worker(id: &str, freq: f64, tasks: &[&str]) -> Worker {
        tasks.iter().fold(
            Worker::new(id).with_profile(WorkerProfile::new(4, freq)),
            |w, t| w.with_capability(*t),
        )
    }

    fn chain() -> Application {
        Application::from_edges("chain", &["A", "B", "C"], &[("A", "B"), ("B", "C")])
    }

    fn weighted_store(app: &str) -> Arc<ProfileStore> {
        let store = Arc::new(ProfileStore::new());
        for task in ["A", "B", "C"] {
            store.record_task_weight(app, task, TaskWeight::new(1.0, 1000.0));
        }
        store
    }

    fn seeded(population: usize, threads: usize, secs: f64) -> ScheduleRequest {
        ScheduleRequest::new(population, threads, secs)
            .with_optimizer(OptimizerConfig::default().with_seed(42))
    }

    #[test]
    fn test_equal_workers_any_assignment_is_optimal() {
        let store = weighted_store("chain");
        store.register_worker(worker("w1", 1000.0, &["A", "B", "C"]));
        store.register_worker(worker("w2", 1000.0, &["A", "B", "C"]));

        let placement = PlacementScheduler::new(store)
            .schedule(&chain(), &seeded(20, 4, 2.0))
            .unwrap();

        assert!(placement.feasible);
        assert_eq!(placement.constraint_violation, 0.0);
        assert!((placement.estimated_cost - 3.0).abs() < 1e-9);
        assert_eq!(placement.placed_count(), 3);
        assert!(placement.unplaced.is_empty());
        assert_eq!(placement.stats.termination, TerminationReason::Stagnation);
    }

    #[test]
    fn test_equal_workers_every_vector_costs_the_same() {
        let store = weighted_store("chain");
        store.register_worker(worker("w1", 1000.0, &["A", "B", "C"]));
        store.register_worker(worker("w2", 1000.0, &["A", "B", "C"]));
        let app = chain();
        let pools = CandidatePools::discover(&app, store.as_ref());
        let bounds = Bounds::from_pool_sizes(&pools.sizes());
        assert_eq!(bounds.search_space(), 8);
        let estimator = CostEstimator::new(&app, pools, store, Default::default());

        for a in 0..2 {
            for b in 0..2 {
                for c in 0..2 {
                    let eval = estimator.estimate(&[a, b, c]).unwrap();
                    assert!((eval.cost - 3.0).abs() < 1e-9, "[{a}, {b}, {c}] cost {}", eval.cost);
                    assert_eq!(eval.violation, 0.0);
                    assert!(eval.is_feasible());
                }
            }
        }
    }

    #[test]
    fn test_task_without_candidates_is_infeasible() {
        let store = weighted_store("chain");
        store.register_worker(worker("w1", 1000.0, &["A", "C"]));
        store.register_worker(worker("w2", 2000.0, &["A", "C"]));

        let placement = PlacementScheduler::new(store)
            .schedule(&chain(), &seeded(20, 4, 2.0))
            .unwrap();

        assert!(!placement.feasible);
        assert_eq!(placement.unplaced, vec!["B".to_string()]);
        assert!(placement.worker_for("A").is_some());
        assert!(placement.worker_for("C").is_some());
        assert_eq!(placement.worker_for("B"), None);
        assert!(placement.constraint_violation >= 1e6);
    }

    #[test]
    fn test_colocates_on_fast_worker_when_network_is_slow() {
        let store = weighted_store("chain");
        store.register_worker(worker("fast", 2000.0, &["A", "B", "C"]));
        store.register_worker(worker("slow", 1000.0, &["A", "B", "C"]));
        store.register_worker(worker("mid", 1500.0, &["A", "B", "C"]));
        store.record_edge_weight("chain", "A", "B", EdgeWeight::new(1e6, 1e3, 1e4));
        store.record_edge_weight("chain", "B", "C", EdgeWeight::new(1e6, 1e3, 1e4));

        let placement = PlacementScheduler::new(store)
            .schedule(&chain(), &seeded(16, 2, 2.0))
            .unwrap();

        assert!(placement.feasible);
        for task in ["A", "B", "C"] {
            assert_eq!(placement.worker_for(task), Some("fast"));
        }
        assert!((placement.estimated_cost - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_deadline_bounds_runtime() {
        let tasks: Vec<String> = (0..40).map(|i| format!("t{i}")).collect();
        let names: Vec<&str> = tasks.iter().map(String::as_str).collect();
        let edges: Vec<(&str, &str)> = names.windows(2).map(|w| (w[0], w[1])).collect();
        let app = Application::from_edges("wide", &names, &edges);

        let store = Arc::new(ProfileStore::new());
        for w in 0..8 {
            store.register_worker(worker(&format!("w{w}"), 1000.0 + w as f64 * 100.0, &names));
        }
        for name in &names {
            store.record_task_weight("wide", name, TaskWeight::new(0.1, 1000.0));
        }

        let request = ScheduleRequest::new(200, 2, 0.01).with_optimizer(
            OptimizerConfig::default()
                .with_stagnation_generations(1_000_000)
                .with_max_generations(1_000_000),
        );
        let started = Instant::now();
        let placement = PlacementScheduler::new(store).schedule(&app, &request).unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(placement.stats.termination, TerminationReason::Deadline);
        assert!(placement.stats.generations >= 1);
        assert_eq!(placement.placed_count(), 40);
    }

    #[test]
    fn test_rejects_bad_config() {
        let store = weighted_store("chain");
        let scheduler = PlacementScheduler::new(store);
        let err = scheduler
            .schedule(&chain(), &ScheduleRequest::new(0, 4, 1.0))
            .unwrap_err();
        assert!(matches!(
            err,
            SchedulerError::InvalidConfig(ConfigError::ZeroPopulation)
        ));
        let err = scheduler
            .schedule(&chain(), &ScheduleRequest::new(10, 0, 1.0))
            .unwrap_err();
        assert!(matches!(
            err,
            SchedulerError::InvalidConfig(ConfigError::ZeroThreads)
        ));
    }

    #[test]
    fn test_rejects_empty_graph() {
        let scheduler = PlacementScheduler::new(Arc::new(ProfileStore::new()));
        let err = scheduler
            .schedule(&Application::new("empty"), &ScheduleRequest::default())
            .unwrap_err();
        match err {
            SchedulerError::InvalidGraph(errors) => {
                assert_eq!(errors[0].kind, ValidationErrorKind::EmptyGraph);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_concurrent_requests_share_store() {
        let store = weighted_store("chain");
        store.register_worker(worker("w1", 2000.0, &["A", "B", "C"]));
        store.register_worker(worker("w2", 1000.0, &["A", "B", "C"]));
        let scheduler = PlacementScheduler::new(Arc::clone(&store));

        thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let scheduler = scheduler.clone();
                    scope.spawn(move || scheduler.schedule(&chain(), &seeded(12, 2, 1.0)))
                })
                .collect();

            // A profiler keeps refreshing while the runs execute.
            for i in 0..50 {
                store.update_profile("w2", WorkerProfile::new(4, 1000.0 + i as f64));
            }

            for handle in handles {
                let placement = handle.join().unwrap().unwrap();
                assert!(placement.feasible);
                assert_eq!(placement.placed_count(), 3);
            }
        });
    }
}
