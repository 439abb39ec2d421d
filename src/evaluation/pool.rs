//! Fixed-size evaluator thread pool.
//!
//! # Design
//!
//! - N named threads drain a bounded `crossbeam-channel` queue of
//!   `(index, genes)` jobs for the lifetime of the pool.
//! - Each generation allocates one result slot per individual. A slot is
//!   a `OnceLock`, so it can be written exactly once.
//! - Every job carries a clone of one `WaitGroup`; dropping it is the
//!   per-individual completion signal. The caller waits once for all of
//!   them instead of holding one event per individual.
//!
//! The number of concurrent objective calls is bounded by N regardless of
//! population size.

use std::io;
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, SendError, Sender, bounded};
use crossbeam_utils::sync::WaitGroup;
use tracing::{error, trace, warn};

use super::{GenerationEvaluator, Objective, score};
use crate::cost::Evaluation;

type Slots = Arc<Vec<OnceLock<Evaluation>>>;

struct Job {
    index: usize,
    genes: Vec<usize>,
    slots: Slots,
    /// Dropped once the slot is written.
    done: WaitGroup,
}

/// Pool of evaluator threads sharing one objective.
///
/// Threads are joined when the pool is dropped.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use fog_placement::cost::Evaluation;
/// use fog_placement::error::EstimateError;
/// use fog_placement::evaluation::{EvaluationPool, GenerationEvaluator, Objective};
///
/// struct Count;
/// impl Objective for Count {
///     fn evaluate(&self, genes: &[usize]) -> Result<Evaluation, EstimateError> {
///         Ok(Evaluation::feasible(genes.len() as f64))
///     }
/// }
///
/// let pool = EvaluationPool::new(2, Arc::new(Count)).unwrap();
/// let results = pool.evaluate_all(&[vec![0], vec![0, 1]]);
/// assert_eq!(results[1].cost, 2.0);
/// ```
pub struct EvaluationPool {
    sender: Option<Sender<Job>>,
    handles: Vec<JoinHandle<()>>,
}

impl EvaluationPool {
    /// Spawns `threads` evaluator threads (at least one).
    pub fn new<O: Objective + ?Sized + 'static>(
        threads: usize,
        objective: Arc<O>,
    ) -> io::Result<Self> {
        let threads = threads.max(1);
        let (sender, receiver) = bounded::<Job>(threads * 2);
        let mut handles = Vec::with_capacity(threads);

        for id in 0..threads {
            let receiver = receiver.clone();
            let objective = Arc::clone(&objective);
            let handle = thread::Builder::new()
                .name(format!("evaluator-{id}"))
                .spawn(move || run_worker(id, objective.as_ref(), receiver))?;
            handles.push(handle);
        }

        Ok(Self {
            sender: Some(sender),
            handles,
        })
    }

    /// Number of evaluator threads.
    pub fn threads(&self) -> usize {
        self.handles.len()
    }
}

impl GenerationEvaluator for EvaluationPool {
    fn evaluate_all(&self, vectors: &[Vec<usize>]) -> Vec<Evaluation> {
        let slots: Slots = Arc::new((0..vectors.len()).map(|_| OnceLock::new()).collect());
        let done = WaitGroup::new();

        if let Some(sender) = &self.sender {
            for (index, genes) in vectors.iter().enumerate() {
                let job = Job {
                    index,
                    genes: genes.clone(),
                    slots: Arc::clone(&slots),
                    done: done.clone(),
                };
                if let Err(SendError(job)) = sender.send(job) {
                    warn!(index = job.index, "evaluator pool closed, individual penalized");
                    let _ = job.slots[job.index].set(Evaluation::penalized());
                }
            }
        }

        done.wait();

        slots
            .iter()
            .map(|slot| slot.get().copied().unwrap_or_else(Evaluation::penalized))
            .collect()
    }
}

impl Drop for EvaluationPool {
    fn drop(&mut self) {
        // Closing the queue ends every worker's receive loop.
        drop(self.sender.take());
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                error!("evaluator thread panicked outside an evaluation");
            }
        }
    }
}

fn run_worker<O: Objective + ?Sized>(id: usize, objective: &O, jobs: Receiver<Job>) {
    trace!(worker = id, "evaluator started");
    for job in jobs.iter() {
        let evaluation = score(objective, job.index, &job.genes);
        if job.slots[job.index].set(evaluation).is_err() {
            error!(index = job.index, "individual scored twice, keeping first result");
        }
        drop(job.done);
    }
    trace!(worker = id, "evaluator stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EstimateError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Objective that records the peak number of concurrent calls.
    #[derive(Default)]
    struct Instrumented {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl Objective for Instrumented {
        fn evaluate(&self, genes: &[usize]) -> Result<Evaluation, EstimateError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(2));
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Evaluation::feasible(genes[0] as f64))
        }
    }

    struct Faulty;

    impl Objective for Faulty {
        fn evaluate(&self, genes: &[usize]) -> Result<Evaluation, EstimateError> {
            match genes[0] % 3 {
                0 => Ok(Evaluation::feasible(genes[0] as f64)),
                1 => Err(EstimateError::UnknownWorker("gone".into())),
                _ => panic!("evaluation bug"),
            }
        }
    }

    #[test]
    fn test_results_aligned_with_population() {
        let objective = Arc::new(Instrumented::default());
        let pool = EvaluationPool::new(4, Arc::clone(&objective)).unwrap();
        let vectors: Vec<Vec<usize>> = (0..20).map(|i| vec![i]).collect();

        let results = pool.evaluate_all(&vectors);
        assert_eq!(results.len(), 20);
        for (i, r) in results.iter().enumerate() {
            assert_eq!(r.cost, i as f64);
        }
        assert_eq!(objective.calls.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn test_concurrency_bounded_by_threads() {
        let objective = Arc::new(Instrumented::default());
        let pool = EvaluationPool::new(4, Arc::clone(&objective)).unwrap();
        let vectors: Vec<Vec<usize>> = (0..20).map(|i| vec![i]).collect();

        for _ in 0..3 {
            pool.evaluate_all(&vectors);
        }
        let peak = objective.peak.load(Ordering::SeqCst);
        assert!(peak <= 4, "peak concurrency {peak} exceeds 4 threads");
        assert!(peak >= 1);
        assert_eq!(objective.calls.load(Ordering::SeqCst), 60);
    }

    #[test]
    fn test_failures_do_not_stop_generation() {
        let pool = EvaluationPool::new(3, Arc::new(Faulty)).unwrap();
        let vectors: Vec<Vec<usize>> = (0..9).map(|i| vec![i]).collect();

        let results = pool.evaluate_all(&vectors);
        assert_eq!(results.len(), 9);
        for (i, r) in results.iter().enumerate() {
            if i % 3 == 0 {
                assert_eq!(*r, Evaluation::feasible(i as f64));
            } else {
                assert_eq!(*r, Evaluation::penalized());
            }
        }

        // Pool is still usable after panics.
        let again = pool.evaluate_all(&[vec![3]]);
        assert_eq!(again[0], Evaluation::feasible(3.0));
        assert_eq!(pool.threads(), 3);
    }

    #[test]
    fn test_empty_generation() {
        let pool = EvaluationPool::new(2, Arc::new(Instrumented::default())).unwrap();
        assert!(pool.evaluate_all(&[]).is_empty());
    }

    #[test]
    fn test_zero_threads_spawns_one() {
        let pool = EvaluationPool::new(0, Arc::new(Instrumented::default())).unwrap();
        assert_eq!(pool.threads(), 1);
    }
}
