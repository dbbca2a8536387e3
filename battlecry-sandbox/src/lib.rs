//! Battlecry Sandbox - isolated Dart compilation
//!
//! Each compile request gets a private workspace under a shared temp root,
//! runs exactly one bounded compiler process, and is cleaned up on every
//! exit path. A periodic sweeper removes anything a crashed request left
//! behind.

mod limits;
mod runtime;
mod service;
mod sweep;
mod types;
mod validation;
mod workspace;

pub use limits::{CompileLimits, SweepPolicy, HEALTH_PROBE_TIMEOUT};
pub use runtime::{run_bounded, DartToolchain, ProcessEnding, ProcessOutput, Toolchain};
pub use service::CompileService;
pub use sweep::{SweepReport, TempSweeper};
pub use types::{native_summary, CompileOutcome, CompileRequest, Target};
pub use validation::{PatternScanner, RequestValidator, ValidationError, DANGEROUS_PATTERNS};
pub use workspace::{Workspace, WorkspaceId, WorkspaceManager};
