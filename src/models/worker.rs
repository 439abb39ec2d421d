//! Worker (actor) model.
//!
//! Workers are fog/edge nodes that execute task kernels. Each worker has a
//! live resource profile, refreshed by periodic profiling, and the set of
//! task names it can run (derived from the compute images it hosts).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Profiled CPU and memory state of a worker.
///
/// Utilization values are fractions in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerProfile {
    /// Number of CPU cores.
    pub cpu_cores: u32,
    /// CPU frequency (MHz).
    pub cpu_frequency: f64,
    /// Current CPU utilization.
    pub cpu_utilization: f64,
    /// Peak CPU utilization observed in the last profiling window.
    pub cpu_peak_utilization: f64,
    /// Memory capacity (bytes).
    pub memory_capacity: u64,
    /// Current memory utilization.
    pub memory_utilization: f64,
}

impl Default for WorkerProfile {
    fn default() -> Self {
        Self {
            cpu_cores: 1,
            cpu_frequency: 1000.0,
            cpu_utilization: 0.0,
            cpu_peak_utilization: 0.0,
            memory_capacity: 0,
            memory_utilization: 0.0,
        }
    }
}

impl WorkerProfile {
    /// Creates a profile with the given core count and frequency (MHz).
    pub fn new(cpu_cores: u32, cpu_frequency: f64) -> Self {
        Self {
            cpu_cores,
            cpu_frequency,
            ..Default::default()
        }
    }

    /// Sets CPU utilization (current and peak).
    pub fn with_cpu_utilization(mut self, current: f64, peak: f64) -> Self {
        self.cpu_utilization = current.clamp(0.0, 1.0);
        self.cpu_peak_utilization = peak.clamp(0.0, 1.0);
        self
    }

    /// Sets memory capacity (bytes) and utilization.
    pub fn with_memory(mut self, capacity: u64, utilization: f64) -> Self {
        self.memory_capacity = capacity;
        self.memory_utilization = utilization.clamp(0.0, 1.0);
        self
    }

    /// Memory not currently in use (bytes).
    pub fn memory_available(&self) -> f64 {
        self.memory_capacity as f64 * (1.0 - self.memory_utilization.clamp(0.0, 1.0))
    }

    /// Fraction of CPU not currently in use.
    pub fn cpu_available(&self) -> f64 {
        1.0 - self.cpu_utilization.clamp(0.0, 1.0)
    }
}

/// A worker node known to discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    /// Unique worker identifier.
    pub id: String,
    /// Latest resource profile.
    pub profile: WorkerProfile,
    /// Names of tasks this worker can execute.
    pub capabilities: BTreeSet<String>,
}

impl Worker {
    /// Creates a worker with a default profile and no capabilities.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            profile: WorkerProfile::default(),
            capabilities: BTreeSet::new(),
        }
    }

    /// Sets the resource profile.
    pub fn with_profile(mut self, profile: WorkerProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Adds a task this worker can execute.
    pub fn with_capability(mut self, task: impl Into<String>) -> Self {
        self.capabilities.insert(task.into());
        self
    }

    /// Whether this worker can execute the given task.
    pub fn can_run(&self, task: &str) -> bool {
        self.capabilities.contains(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_builder() {
        let w = Worker::new("edge-1")
            .with_profile(
                WorkerProfile::new(4, 2400.0)
                    .with_cpu_utilization(0.25, 0.6)
                    .with_memory(4 << 30, 0.5),
            )
            .with_capability("face_detection")
            .with_capability("ocr");

        assert_eq!(w.id, "edge-1");
        assert!(w.can_run("ocr"));
        assert!(!w.can_run("color_tracking"));
        assert_eq!(w.profile.cpu_cores, 4);
        assert!((w.profile.cpu_available() - 0.75).abs() < 1e-10);
        assert!((w.profile.memory_available() - (2u64 << 30) as f64).abs() < 1.0);
    }

    #[test]
    fn test_utilization_clamping() {
        let p = WorkerProfile::new(1, 1000.0)
            .with_cpu_utilization(1.5, -0.2)
            .with_memory(1024, 2.0);
        assert!((p.cpu_utilization - 1.0).abs() < 1e-10);
        assert!((p.cpu_peak_utilization - 0.0).abs() < 1e-10);
        assert!((p.memory_available() - 0.0).abs() < 1e-10);
    }
}
