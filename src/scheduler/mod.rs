//! Placement scheduling entry point.
//!
//! [`PlacementScheduler::schedule`] turns an application graph and a
//! [`ScheduleRequest`] into a [`Placement`]: the best task-to-worker
//! assignment found within the time budget, its estimated response time,
//! and whether it is feasible.
//!
//! # Guarantees
//!
//! - Returns within a small overhead of the request's wall-clock budget.
//! - Infeasibility (a task nobody can run, memory over-commitment) is
//!   reported through [`Placement::feasible`], never as an error.

mod placement;
mod placer;
mod request;

pub use placement::{Placement, RunStats};
pub use placer::PlacementScheduler;
pub use request::ScheduleRequest;
