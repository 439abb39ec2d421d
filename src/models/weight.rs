//! Profiled task and edge weights.
//!
//! Weights are long-lived aggregates of observed executions, keyed by
//! application and task (or task pair). They are refreshed by profiling
//! collaborators while optimizer runs read them.

use serde::{Deserialize, Serialize};

/// Processing profile of one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskWeight {
    /// Median processing time of one execution (seconds).
    pub median_processing_time: f64,
    /// Median number of invocations per application run.
    ///
    /// Informational: the cost model charges one execution per task,
    /// since `median_processing_time` is profiled per application run.
    pub median_calls: f64,
    /// CPU frequency (MHz) at which the processing time was measured.
    pub cpu_frequency: f64,
    /// Memory required while the task runs (bytes).
    #[serde(default)]
    pub memory_demand: u64,
}

impl TaskWeight {
    /// Creates a task weight measured at `cpu_frequency` MHz.
    pub fn new(median_processing_time: f64, cpu_frequency: f64) -> Self {
        Self {
            median_processing_time,
            median_calls: 1.0,
            cpu_frequency,
            memory_demand: 0,
        }
    }

    /// Sets the median invocation count.
    pub fn with_calls(mut self, median_calls: f64) -> Self {
        self.median_calls = median_calls;
        self
    }

    /// Sets the memory demand (bytes).
    pub fn with_memory_demand(mut self, bytes: u64) -> Self {
        self.memory_demand = bytes;
        self
    }

    /// Processing time rescaled to a worker running at `frequency` MHz.
    ///
    /// A zero reference frequency means "unknown"; the raw time is returned.
    pub fn scaled_time(&self, frequency: f64) -> f64 {
        if self.cpu_frequency <= 0.0 || frequency <= 0.0 {
            return self.median_processing_time;
        }
        self.median_processing_time * (self.cpu_frequency / frequency)
    }

    /// Checks that the measurements the cost model reads are finite and
    /// non-negative.
    pub fn validate(&self) -> Result<(), String> {
        check_measure("median processing time", self.median_processing_time)?;
        check_measure("cpu frequency", self.cpu_frequency)
    }
}

/// Transfer profile of one dependency edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeWeight {
    /// Median package size sent from source to destination (bytes).
    pub median_package_size: f64,
    /// Slowest observed transfer speed (bytes/second).
    pub min_speed: f64,
    /// Fastest observed transfer speed (bytes/second).
    pub max_speed: f64,
    /// Number of observations folded into this weight.
    #[serde(default)]
    pub samples: u64,
}

impl EdgeWeight {
    /// Creates an edge weight from a package size and speed range.
    pub fn new(median_package_size: f64, min_speed: f64, max_speed: f64) -> Self {
        Self {
            median_package_size,
            min_speed,
            max_speed,
            samples: 1,
        }
    }

    /// Folds one observed transfer into the weight.
    ///
    /// The speed range widens to cover the sample; the package size moves
    /// toward the sample by a step that shrinks with the sample count,
    /// which tracks the median without keeping history.
    pub fn observe(&mut self, package_size: f64, speed: f64) {
        if self.samples == 0 {
            *self = Self::new(package_size, speed, speed);
            return;
        }
        self.min_speed = self.min_speed.min(speed);
        self.max_speed = self.max_speed.max(speed);
        let step = (self.median_package_size.abs().max(1.0)) / (self.samples as f64 + 1.0);
        if package_size > self.median_package_size {
            self.median_package_size = (self.median_package_size + step).min(package_size);
        } else if package_size < self.median_package_size {
            self.median_package_size = (self.median_package_size - step).max(package_size);
        }
        self.samples += 1;
    }
}

impl EdgeWeight {
    /// Checks that package size and speeds are finite and non-negative.
    pub fn validate(&self) -> Result<(), String> {
        check_measure("median package size", self.median_package_size)?;
        check_measure("min speed", self.min_speed)?;
        check_measure("max speed", self.max_speed)
    }
}

fn check_measure(name: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(format!("{name} is {value}"))
    }
}

impl Default for EdgeWeight {
    fn default() -> Self {
        Self {
            median_package_size: 0.0,
            min_speed: 0.0,
            max_speed: 0.0,
            samples: 0,
        }
    }
}
