//! Placement domain models.
//!
//! Provides the data types the scheduler reads: the application task graph,
//! worker profiles, profiled task/edge weights, and the violations a
//! candidate placement can incur.
//!
//! # Units
//!
//! | Quantity | Unit |
//! |----------|------|
//! | Processing time, cost | seconds |
//! | CPU frequency | MHz |
//! | Package size, memory | bytes |
//! | Transfer speed | bytes/second |

mod task;
mod violation;
mod weight;
mod worker;

pub use task::{Application, Task};
pub use violation::{Violation, ViolationType, total_violation};
pub use weight::{EdgeWeight, TaskWeight};
pub use worker::{Worker, WorkerProfile};
