//! Genetic search over task-to-worker assignments.
//!
//! # Encoding
//!
//! One integer gene per task, indexing that task's candidate pool (see
//! [`population`]). Search runs generationally: tournament selection with
//! the constrained [`tie_break`] rule, crossover and mutation from
//! [`operators`], elitism, and a pluggable [`TerminationPolicy`].
//!
//! # Submodules
//!
//! - [`operators`]: Runtime-selectable crossover and mutation strategies
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization, and Machine Learning"
//! - Deb (2000), "An efficient constraint handling method for genetic algorithms"

pub mod operators;
mod optimizer;
mod population;
mod selection;
mod termination;

pub use operators::{CrossoverType, GeneticOperators, MutationType};
pub use optimizer::{EvolutionaryOptimizer, OptimizationResult, OptimizerConfig};
pub use population::{Bounds, Population};
pub use selection::{tie_break, tournament};
pub use termination::{OptimizerState, Stagnation, TerminationPolicy, TerminationReason, WallClock};
