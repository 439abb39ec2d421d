//! Resource profiles consumed by the cost model.
//!
//! Discovery and profiling collaborators keep worker profiles and
//! task/edge weights fresh; the scheduler only reads them through
//! [`ProfileSource`]. Reads are not transactional: values may change
//! between two reads of the same optimizer run.

mod store;

pub use store::{EdgeKey, EdgeWeightRecord, ProfileSnapshot, ProfileStore, TaskWeightRecord};

use crate::models::{EdgeWeight, TaskWeight, Worker, WorkerProfile};

/// Read access to discovery and profiling state.
///
/// Implementations must be safe to query from several evaluator threads at
/// once.
pub trait ProfileSource: Send + Sync {
    /// Workers currently capable of running `task`, in a stable order.
    fn candidate_workers(&self, task: &str) -> Vec<Worker>;

    /// Latest profile of a worker, or `None` if it is no longer registered.
    fn worker_profile(&self, worker_id: &str) -> Option<WorkerProfile>;

    /// Transfer weight of the `source → destination` edge of an application.
    fn edge_weight(&self, app: &str, source: &str, destination: &str) -> Option<EdgeWeight>;

    /// Processing weight of a task of an application.
    fn task_weight(&self, app: &str, task: &str) -> Option<TaskWeight>;
}
