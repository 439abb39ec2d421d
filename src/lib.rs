//! Resource-aware task placement for fog computing.
//!
//! Decides which worker node runs each task of an application graph so as
//! to minimize estimated end-to-end response time under live CPU, memory
//! and network conditions.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Application`, `Task`, `Worker`,
//!   `WorkerProfile`, `TaskWeight`, `EdgeWeight`, `Violation`
//! - **`validation`**: Task graph integrity checks (duplicate IDs, unknown
//!   references, asymmetric edges, cycles)
//! - **`profile`**: `ProfileSource` seam and the in-memory `ProfileStore`
//! - **`cost`**: Candidate pools and the `CostEstimator`
//! - **`evaluation`**: Serial and thread-pool generation evaluators
//! - **`ga`**: Evolutionary optimizer, selection and termination policies
//! - **`scheduler`**: `PlacementScheduler`, the single entry point
//!
//! # Architecture
//!
//! Profiling collaborators write into a shared [`profile::ProfileStore`].
//! Each scheduling request snapshots candidate pools once, then lets the
//! optimizer score whole generations on a bounded evaluator pool that
//! reads profiles live. Transport, dispatch and subscriber setup live
//! outside this crate.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use fog_placement::models::{Application, TaskWeight, Worker, WorkerProfile};
//! use fog_placement::profile::ProfileStore;
//! use fog_placement::scheduler::{PlacementScheduler, ScheduleRequest};
//!
//! let store = Arc::new(ProfileStore::new());
//! store.register_worker(
//!     Worker::new("gateway")
//!         .with_profile(WorkerProfile::new(2, 1500.0))
//!         .with_capability("ingest"),
//! );
//! store.record_task_weight("pipeline", "ingest", TaskWeight::new(0.3, 1500.0));
//!
//! let app = Application::from_edges("pipeline", &["ingest"], &[]);
//! let placement = PlacementScheduler::new(store)
//!     .schedule(&app, &ScheduleRequest::new(8, 2, 0.2))
//!     .unwrap();
//! assert_eq!(placement.worker_for("ingest"), Some("gateway"));
//! ```
//!
//! # References
//!
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization, and Machine Learning"
//! - Deb (2000), "An efficient constraint handling method for genetic algorithms"

pub mod cost;
pub mod error;
pub mod evaluation;
pub mod ga;
pub mod models;
pub mod profile;
pub mod scheduler;
pub mod validation;

pub use error::{ConfigError, EstimateError, SchedulerError};
pub use scheduler::{Placement, PlacementScheduler, ScheduleRequest};
