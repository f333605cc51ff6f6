//! Run-time solver configuration.

use serde::{Deserialize, Serialize};

/// Recognized solver controls for one solve invocation.
///
/// `None` means the engine default (unlimited, where a limit is concerned).
/// Options are read-only once handed to `solve`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunOptions {
    /// Wall-clock time limit in seconds.
    pub time_limit: Option<f64>,
    /// Relative MIP optimality gap tolerance.
    pub mip_gap: Option<f64>,
    /// Worker thread count for the engine.
    pub threads: Option<u32>,
    /// Emit the engine's own log output.
    pub verbose: bool,
    /// Stop after this many incumbent solutions.
    pub solution_limit: Option<u32>,
    /// Stop after exploring this many nodes.
    pub node_limit: Option<u64>,
}

impl RunOptions {
    /// All engine defaults, quiet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Set the relative MIP gap tolerance.
    pub fn with_mip_gap(mut self, gap: f64) -> Self {
        self.mip_gap = Some(gap);
        self
    }

    /// Set the number of threads.
    pub fn with_threads(mut self, count: u32) -> Self {
        self.threads = Some(count);
        self
    }

    /// Enable or disable engine log output.
    pub fn with_verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    /// Set the incumbent solution limit.
    pub fn with_solution_limit(mut self, count: u32) -> Self {
        self.solution_limit = Some(count);
        self
    }

    /// Set the node limit.
    pub fn with_node_limit(mut self, count: u64) -> Self {
        self.node_limit = Some(count);
        self
    }

    /// Preset for a quick feasibility check: one minute, loose gap, one
    /// thread, quiet.
    pub fn quick() -> Self {
        Self::new()
            .with_time_limit(60.0)
            .with_mip_gap(0.1)
            .with_threads(1)
    }

    /// Preset for a high-precision solve: one hour, tight gap, verbose.
    pub fn precise() -> Self {
        Self::new()
            .with_time_limit(3600.0)
            .with_mip_gap(1e-6)
            .with_verbose(true)
    }

    /// Check if every field is at its engine default.
    pub fn is_empty(&self) -> bool {
        self.time_limit.is_none()
            && self.mip_gap.is_none()
            && self.threads.is_none()
            && !self.verbose
            && self.solution_limit.is_none()
            && self.node_limit.is_none()
    }
}
