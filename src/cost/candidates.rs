//! Candidate pools: which workers may run which task.
//!
//! Built once per scheduling request from discovery. The order of each
//! pool is fixed for the run, so a gene value keeps meaning the same
//! worker across generations.

use crate::error::EstimateError;
use crate::models::{Application, Worker};
use crate::profile::ProfileSource;

/// Ordered workers eligible to run one task.
#[derive(Debug, Clone)]
pub struct CandidatePool {
    /// Task name.
    pub task: String,
    /// Eligible workers, as discovered.
    pub workers: Vec<Worker>,
}

impl CandidatePool {
    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Whether no worker can run the task.
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Index of the candidate with the highest profiled CPU frequency.
    pub fn fastest(&self) -> Option<usize> {
        self.workers
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.profile.cpu_frequency.total_cmp(&b.profile.cpu_frequency))
            .map(|(i, _)| i)
    }
}

/// Candidate pools for every task of an application, in task order.
#[derive(Debug, Clone)]
pub struct CandidatePools {
    pools: Vec<CandidatePool>,
}

impl CandidatePools {
    /// Queries discovery for each task of the application.
    pub fn discover<S: ProfileSource + ?Sized>(app: &Application, source: &S) -> Self {
        let pools = app
            .tasks()
            .iter()
            .map(|task| CandidatePool {
                task: task.name.clone(),
                workers: source.candidate_workers(&task.name),
            })
            .collect();
        Self { pools }
    }

    /// Creates pools directly (task order must match the application).
    pub fn from_pools(pools: Vec<CandidatePool>) -> Self {
        Self { pools }
    }

    /// Pools in task order.
    pub fn pools(&self) -> &[CandidatePool] {
        &self.pools
    }

    /// Number of tasks covered.
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Whether there are no pools.
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Pool size per task.
    pub fn sizes(&self) -> Vec<usize> {
        self.pools.iter().map(CandidatePool::len).collect()
    }

    /// Names of tasks nobody can run.
    pub fn unplaceable(&self) -> Vec<&str> {
        self.pools
            .iter()
            .filter(|p| p.is_empty())
            .map(|p| p.task.as_str())
            .collect()
    }

    /// Resolves a gene to a worker id.
    ///
    /// Returns `Ok(None)` for a task with an empty pool; any gene value is
    /// accepted there since there is nothing to index.
    pub fn resolve(&self, task: usize, gene: usize) -> Result<Option<&str>, EstimateError> {
        let pool = &self.pools[task];
        if pool.is_empty() {
            return Ok(None);
        }
        pool.workers
            .get(gene)
            .map(|w| Some(w.id.as_str()))
            .ok_or_else(|| EstimateError::GeneOutOfBounds {
                task: pool.task.clone(),
                index: gene,
                len: pool.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkerProfile;
    use crate::profile::ProfileStore;

    fn sample() -> (Application, ProfileStore) {
        let app = Application::from_edges("app", &["A", "B"], &[("A", "B")]);
        let store = ProfileStore::new();
        store.register_worker(
            Worker::new("slow")
                .with_profile(WorkerProfile::new(1, 800.0))
                .with_capability("A"),
        );
        store.register_worker(
            Worker::new("fast")
                .with_profile(WorkerProfile::new(8, 3200.0))
                .with_capability("A"),
        );
        (app, store)
    }

    #[test]
    fn test_discover() {
        let (app, store) = sample();
        let pools = CandidatePools::discover(&app, &store);
        assert_eq!(pools.len(), 2);
        assert_eq!(pools.sizes(), vec![2, 0]);
        assert_eq!(pools.unplaceable(), vec!["B"]);
    }

    #[test]
    fn test_resolve() {
        let (app, store) = sample();
        let pools = CandidatePools::discover(&app, &store);
        assert_eq!(pools.resolve(0, 0).unwrap(), Some("fast"));
        assert_eq!(pools.resolve(0, 1).unwrap(), Some("slow"));
        assert_eq!(pools.resolve(1, 0).unwrap(), None);
        assert!(matches!(
            pools.resolve(0, 2),
            Err(EstimateError::GeneOutOfBounds { index: 2, len: 2, .. })
        ));
    }

    #[test]
    fn test_fastest() {
        let (app, store) = sample();
        let pools = CandidatePools::discover(&app, &store);
        assert_eq!(pools.pools()[0].fastest(), Some(0));
        assert_eq!(pools.pools()[1].fastest(), None);
    }
}
