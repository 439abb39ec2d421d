//! In-memory profile store.
//!
//! Shared by profiling collaborators (writers) and concurrent scheduler
//! runs (readers). Each table sits behind its own `RwLock` so a profile
//! refresh does not block weight lookups.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ProfileSource;
use crate::models::{EdgeWeight, TaskWeight, Worker, WorkerProfile};

/// Key of an edge weight: (application, source task, destination task).
pub type EdgeKey = (String, String, String);

/// Task weight entry of a [`ProfileSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskWeightRecord {
    /// Application name.
    pub app: String,
    /// Task name.
    pub task: String,
    /// Profiled weight.
    pub weight: TaskWeight,
}

/// Edge weight entry of a [`ProfileSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeWeightRecord {
    /// Application name.
    pub app: String,
    /// Producing task.
    pub source: String,
    /// Consuming task.
    pub destination: String,
    /// Profiled weight.
    pub weight: EdgeWeight,
}

/// Serializable copy of the store's contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    /// Registered workers.
    pub workers: Vec<Worker>,
    /// Task weights, ordered by (app, task).
    pub task_weights: Vec<TaskWeightRecord>,
    /// Edge weights, ordered by (app, source, destination).
    pub edge_weights: Vec<EdgeWeightRecord>,
}

/// Thread-safe in-memory [`ProfileSource`].
///
/// # Example
/// ```
/// use fog_placement::models::{Worker, WorkerProfile, TaskWeight};
/// use fog_placement::profile::{ProfileSource, ProfileStore};
///
/// let store = ProfileStore::new();
/// store.register_worker(
///     Worker::new("edge-1")
///         .with_profile(WorkerProfile::new(4, 2000.0))
///         .with_capability("ocr"),
/// );
/// store.record_task_weight("reader", "ocr", TaskWeight::new(0.8, 1000.0));
///
/// assert_eq!(store.candidate_workers("ocr").len(), 1);
/// assert!(store.task_weight("reader", "ocr").is_some());
/// ```
#[derive(Debug, Default)]
pub struct ProfileStore {
    workers: RwLock<BTreeMap<String, Worker>>,
    task_weights: RwLock<BTreeMap<(String, String), TaskWeight>>,
    edge_weights: RwLock<BTreeMap<EdgeKey, EdgeWeight>>,
}

// Profile tables hold plain data; a panic mid-write leaves them usable.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl ProfileStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a store from a snapshot.
    pub fn from_snapshot(snapshot: ProfileSnapshot) -> Self {
        let store = Self::new();
        for worker in snapshot.workers {
            store.register_worker(worker);
        }
        {
            let mut tasks = write(&store.task_weights);
            for r in snapshot.task_weights {
                tasks.insert((r.app, r.task), r.weight);
            }
        }
        {
            let mut edges = write(&store.edge_weights);
            for r in snapshot.edge_weights {
                edges.insert((r.app, r.source, r.destination), r.weight);
            }
        }
        store
    }

    /// Copies the current contents into a serializable snapshot.
    pub fn snapshot(&self) -> ProfileSnapshot {
        ProfileSnapshot {
            workers: read(&self.workers).values().cloned().collect(),
            task_weights: read(&self.task_weights)
                .iter()
                .map(|((app, task), weight)| TaskWeightRecord {
                    app: app.clone(),
                    task: task.clone(),
                    weight: weight.clone(),
                })
                .collect(),
            edge_weights: read(&self.edge_weights)
                .iter()
                .map(|((app, source, destination), weight)| EdgeWeightRecord {
                    app: app.clone(),
                    source: source.clone(),
                    destination: destination.clone(),
                    weight: weight.clone(),
                })
                .collect(),
        }
    }

    /// Registers a worker, replacing any worker with the same id.
    pub fn register_worker(&self, worker: Worker) {
        debug!(worker = %worker.id, capabilities = worker.capabilities.len(), "worker registered");
        write(&self.workers).insert(worker.id.clone(), worker);
    }

    /// Removes a worker. Returns the removed worker, if any.
    pub fn deregister_worker(&self, worker_id: &str) -> Option<Worker> {
        let removed = write(&self.workers).remove(worker_id);
        if removed.is_some() {
            debug!(worker = worker_id, "worker deregistered");
        }
        removed
    }

    /// Replaces a worker's profile. Returns `false` if the worker is unknown.
    pub fn update_profile(&self, worker_id: &str, profile: WorkerProfile) -> bool {
        match write(&self.workers).get_mut(worker_id) {
            Some(worker) => {
                worker.profile = profile;
                true
            }
            None => false,
        }
    }

    /// Number of registered workers.
    pub fn worker_count(&self) -> usize {
        read(&self.workers).len()
    }

    /// Sets the processing weight of a task.
    pub fn record_task_weight(&self, app: &str, task: &str, weight: TaskWeight) {
        write(&self.task_weights).insert((app.to_string(), task.to_string()), weight);
    }

    /// Sets the transfer weight of an edge.
    pub fn record_edge_weight(
        &self,
        app: &str,
        source: &str,
        destination: &str,
        weight: EdgeWeight,
    ) {
        write(&self.edge_weights).insert(
            (app.to_string(), source.to_string(), destination.to_string()),
            weight,
        );
    }

    /// Folds one observed transfer into an edge weight, creating it if needed.
    pub fn observe_transfer(
        &self,
        app: &str,
        source: &str,
        destination: &str,
        package_size: f64,
        speed: f64,
    ) {
        write(&self.edge_weights)
            .entry((app.to_string(), source.to_string(), destination.to_string()))
            .or_default()
            .observe(package_size, speed);
    }
}

impl ProfileSource for ProfileStore {
    fn candidate_workers(&self, task: &str) -> Vec<Worker> {
        read(&self.workers)
            .values()
            .filter(|w| w.can_run(task))
            .cloned()
            .collect()
    }

    fn worker_profile(&self, worker_id: &str) -> Option<WorkerProfile> {
        read(&self.workers).get(worker_id).map(|w| w.profile.clone())
    }

    fn edge_weight(&self, app: &str, source: &str, destination: &str) -> Option<EdgeWeight> {
        read(&self.edge_weights)
            .get(&(app.to_string(), source.to_string(), destination.to_string()))
            .cloned()
    }

    fn task_weight(&self, app: &str, task: &str) -> Option<TaskWeight> {
        read(&self.task_weights)
            .get(&(app.to_string(), task.to_string()))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn sample_store() -> ProfileStore {
        let store = ProfileStore::new();
        store.register_worker(
            Worker::new("w2")
                .with_profile(WorkerProfile::new(2, 1500.0))
                .with_capability("detect"),
        );
        store.register_worker(
            Worker::new("w1")
                .with_profile(WorkerProfile::new(4, 3000.0))
                .with_capability("detect")
                .with_capability("track"),
        );
        store.record_task_weight("vision", "detect", TaskWeight::new(1.0, 1500.0));
        store.record_edge_weight("vision", "detect", "track", EdgeWeight::new(4096.0, 1e5, 1e6));
        store
    }

    #[test]
    fn test_candidates_in_id_order() {
        let store = sample_store();
        let ids: Vec<String> = store
            .candidate_workers("detect")
            .into_iter()
            .map(|w| w.id)
            .collect();
        assert_eq!(ids, vec!["w1".to_string(), "w2".to_string()]);
        assert_eq!(store.candidate_workers("track").len(), 1);
        assert!(store.candidate_workers("ocr").is_empty());
    }

    #[test]
    fn test_update_and_deregister() {
        let store = sample_store();
        assert!(store.update_profile("w1", WorkerProfile::new(8, 3600.0)));
        assert!(!store.update_profile("ghost", WorkerProfile::default()));
        assert_eq!(store.worker_profile("w1").unwrap().cpu_cores, 8);

        assert!(store.deregister_worker("w1").is_some());
        assert!(store.worker_profile("w1").is_none());
        assert_eq!(store.worker_count(), 1);
    }

    #[test]
    fn test_observe_transfer_creates_edge() {
        let store = ProfileStore::new();
        store.observe_transfer("vision", "a", "b", 2048.0, 5e5);
        store.observe_transfer("vision", "a", "b", 2048.0, 1e5);
        let e = store.edge_weight("vision", "a", "b").unwrap();
        assert_eq!(e.samples, 2);
        assert!((e.min_speed - 1e5).abs() < 1e-6);
        assert!((e.max_speed - 5e5).abs() < 1e-6);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let store = sample_store();
        let json = serde_json::to_string(&store.snapshot()).unwrap();
        let restored = ProfileStore::from_snapshot(serde_json::from_str(&json).unwrap());

        assert_eq!(restored.worker_count(), 2);
        assert_eq!(
            restored.task_weight("vision", "detect"),
            store.task_weight("vision", "detect")
        );
        assert_eq!(
            restored.edge_weight("vision", "detect", "track"),
            store.edge_weight("vision", "detect", "track")
        );
    }

    #[test]
    fn test_snapshot_keeps_names_with_separators() {
        let store = ProfileStore::new();
        let edge = EdgeWeight::new(512.0, 1e4, 1e5);
        store.record_edge_weight("vision", "cam/left", "merge", edge);
        store.record_task_weight("fog/app", "ocr", TaskWeight::new(0.5, 2000.0));

        let json = serde_json::to_string(&store.snapshot()).unwrap();
        let restored = ProfileStore::from_snapshot(serde_json::from_str(&json).unwrap());

        assert_eq!(
            restored.edge_weight("vision", "cam/left", "merge"),
            store.edge_weight("vision", "cam/left", "merge")
        );
        assert!(restored.edge_weight("vision", "cam", "left/merge").is_none());
        assert_eq!(
            restored.task_weight("fog/app", "ocr"),
            store.task_weight("fog/app", "ocr")
        );
        assert_eq!(restored.snapshot(), store.snapshot());
    }

    #[test]
    fn test_concurrent_readers_and_writer() {
        let store = Arc::new(sample_store());
        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..100 {
                    store.update_profile("w1", WorkerProfile::new(4, 3000.0 + i as f64));
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..100 {
                        assert!(store.worker_profile("w1").is_some());
                    }
                })
            })
            .collect();
        writer.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }
        assert!((store.worker_profile("w1").unwrap().cpu_frequency - 3099.0).abs() < 1e-10);
    }
}
