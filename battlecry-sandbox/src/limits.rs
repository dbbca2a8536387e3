//! Resource limits for compiler invocations and temp-root sweeping

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Limits applied to every compile request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileLimits {
    /// Wall-clock time before the compiler is killed
    pub timeout: Duration,

    /// Combined stdout + stderr bytes captured before the compiler is killed
    pub max_output_bytes: usize,

    /// Maximum source length in characters
    pub max_source_chars: usize,

    /// Upper bound on simultaneous compiler processes (None = unbounded)
    pub max_concurrent: Option<usize>,
}

impl Default for CompileLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_output_bytes: 10 * 1024 * 1024,
            max_source_chars: 100_000,
            max_concurrent: None,
        }
    }
}

impl CompileLimits {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_output_bytes(mut self, bytes: usize) -> Self {
        self.max_output_bytes = bytes;
        self
    }

    pub fn with_max_concurrent(mut self, permits: Option<usize>) -> Self {
        self.max_concurrent = permits;
        self
    }
}

/// Retention policy for the background temp-root sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPolicy {
    /// Entries whose mtime is older than this are deleted
    pub retention: Duration,

    /// Time between sweeps
    pub interval: Duration,
}

impl Default for SweepPolicy {
    fn default() -> Self {
        Self {
            retention: Duration::from_secs(60 * 60),
            interval: Duration::from_secs(60 * 60),
        }
    }
}

/// Timeout for the `dart --version` health probe
pub const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(10);
