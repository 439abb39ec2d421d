//! Fitness evaluation of whole generations.
//!
//! The optimizer hands over every decision vector of a generation and
//! gets back one [`Evaluation`] per vector, index for index. A failure
//! while scoring one vector never aborts the generation: the vector is
//! given [`Evaluation::penalized`] and the failure is logged.
//!
//! # Submodules
//!
//! - [`EvaluationPool`]: fixed pool of evaluator threads fed by a bounded queue

mod pool;

pub use pool::EvaluationPool;

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::warn;

use crate::cost::Evaluation;
use crate::error::EstimateError;

/// Scores one decision vector.
///
/// Implementations are shared by evaluator threads and must not rely on
/// exclusive access.
pub trait Objective: Send + Sync {
    /// Cost and constraint violation of `genes`.
    fn evaluate(&self, genes: &[usize]) -> Result<Evaluation, EstimateError>;
}

/// Scores a full generation.
pub trait GenerationEvaluator {
    /// Returns one evaluation per vector, aligned by index.
    fn evaluate_all(&self, vectors: &[Vec<usize>]) -> Vec<Evaluation>;
}

/// Evaluates on the calling thread, one vector at a time.
pub struct SerialEvaluator<'a, O: Objective + ?Sized> {
    objective: &'a O,
}

impl<'a, O: Objective + ?Sized> SerialEvaluator<'a, O> {
    /// Wraps an objective.
    pub fn new(objective: &'a O) -> Self {
        Self { objective }
    }
}

impl<O: Objective + ?Sized> GenerationEvaluator for SerialEvaluator<'_, O> {
    fn evaluate_all(&self, vectors: &[Vec<usize>]) -> Vec<Evaluation> {
        vectors
            .iter()
            .enumerate()
            .map(|(index, genes)| score(self.objective, index, genes))
            .collect()
    }
}

/// Scores one vector, converting errors and panics into the maximal penalty.
pub(crate) fn score<O: Objective + ?Sized>(
    objective: &O,
    index: usize,
    genes: &[usize],
) -> Evaluation {
    match catch_unwind(AssertUnwindSafe(|| objective.evaluate(genes))) {
        Ok(Ok(evaluation)) => evaluation,
        Ok(Err(err)) => {
            warn!(index, error = %err, "evaluation failed, individual penalized");
            Evaluation::penalized()
        }
        Err(payload) => {
            warn!(
                index,
                panic = panic_message(payload.as_ref()),
                "evaluation panicked, individual penalized"
            );
            Evaluation::penalized()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
