//! Structured outcome of one solve invocation.

use crate::status::SolveStatus;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of a solve: created empty when the solve starts, populated as
/// phases complete, and returned frozen. Never mutated after return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveReport {
    /// The build and solve sequence completed without error.
    pub success: bool,
    /// Engine-reported termination status.
    pub status: SolveStatus,
    /// Best objective value found; 0.0 when no solution was available.
    pub objective: f64,
    /// Wall time spent building and solving.
    pub elapsed: Duration,
    /// Nodes explored, when the engine reports them.
    pub node_count: Option<u64>,
    /// Final relative optimality gap, when the engine reports it.
    pub gap: Option<f64>,
    /// Human-readable failure description; empty on success.
    pub message: String,
}

impl SolveReport {
    /// A failed report carrying whatever timing was measured before the
    /// failure.
    pub fn failure(message: String, elapsed: Duration) -> Self {
        Self {
            success: false,
            message,
            elapsed,
            ..Self::default()
        }
    }

    /// Check if the solve proved optimality.
    pub fn is_optimal(&self) -> bool {
        self.success && self.status.is_optimal()
    }

    /// Check if a usable (possibly non-optimal) solution was found.
    pub fn has_solution(&self) -> bool {
        self.success && self.status.has_solution()
    }
}

impl Default for SolveReport {
    fn default() -> Self {
        Self {
            success: false,
            status: SolveStatus::Unknown,
            objective: 0.0,
            elapsed: Duration::ZERO,
            node_count: None,
            gap: None,
            message: String::new(),
        }
    }
}
