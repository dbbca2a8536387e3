//! Toolchain trait and implementations

mod dart;
pub mod process;

use crate::limits::CompileLimits;
use crate::types::Target;
use crate::workspace::Workspace;
use async_trait::async_trait;

pub use dart::DartToolchain;
pub use process::{run_bounded, ProcessEnding, ProcessOutput};

/// External compiler abstraction
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Compile the workspace source for `target` into the workspace output
    /// directory, as exactly one bounded child process
    async fn compile(
        &self,
        workspace: &Workspace,
        target: Target,
        limits: &CompileLimits,
    ) -> ProcessOutput;

    /// Live check that the compiler binary is reachable
    async fn probe(&self) -> bool;

    /// Get toolchain name
    fn name(&self) -> &str;
}
