//! Memory instrumentation for model build and solve stages.

use std::time::Instant;
use sysinfo::System;

/// A snapshot of resident memory at a named stage.
#[derive(Debug, Clone)]
pub struct MemorySnapshot {
    /// Resident set size in bytes
    pub rss_bytes: u64,
    /// When this snapshot was captured
    pub timestamp: Instant,
    /// Stage name (e.g. "variables", "optimize")
    pub stage: String,
}

/// Errors produced by memory instrumentation.
#[derive(Debug, Clone)]
pub enum MemoryError {
    ProcessNotFound { pid: u32 },
}

impl std::fmt::Display for MemoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryError::ProcessNotFound { pid } => {
                write!(f, "failed to locate process {}", pid)
            }
        }
    }
}

impl std::error::Error for MemoryError {}

impl MemorySnapshot {
    /// Capture the current process's memory state for a stage.
    ///
    /// # Errors
    ///
    /// Returns an error if the current process cannot be located.
    pub fn capture(stage: &str) -> Result<Self, MemoryError> {
        let pid = sysinfo::Pid::from(std::process::id() as usize);

        // Refresh only this process, not the whole system.
        let mut sys = System::new();
        sys.refresh_processes_specifics(
            sysinfo::ProcessesToUpdate::Some(&[pid]),
            true,
            sysinfo::ProcessRefreshKind::nothing().with_memory(),
        );

        let process = sys.process(pid).ok_or(MemoryError::ProcessNotFound {
            pid: std::process::id(),
        })?;

        Ok(MemorySnapshot {
            rss_bytes: process.memory(),
            timestamp: Instant::now(),
            stage: stage.to_string(),
        })
    }

    /// Difference in RSS bytes against another snapshot (positive means
    /// growth relative to `other`).
    pub fn diff(&self, other: &Self) -> i64 {
        self.rss_bytes as i64 - other.rss_bytes as i64
    }
}

/// Accumulates snapshots across the stages of one solve. Capture failures
/// are swallowed; a probe with missing stages still answers what it can.
#[derive(Debug, Default)]
pub struct MemoryProbe {
    snapshots: Vec<MemorySnapshot>,
}

impl MemoryProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture and store a snapshot for a stage.
    pub fn record(&mut self, stage: &str) {
        if let Ok(snapshot) = MemorySnapshot::capture(stage) {
            self.snapshots.push(snapshot);
        }
    }

    /// All recorded snapshots, in capture order.
    pub fn snapshots(&self) -> &[MemorySnapshot] {
        &self.snapshots
    }

    /// RSS growth from the first to the last recorded stage.
    pub fn growth(&self) -> Option<i64> {
        let first = self.snapshots.first()?;
        let last = self.snapshots.last()?;
        Some(last.diff(first))
    }
}
