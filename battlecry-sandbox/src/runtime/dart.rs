//! Dart SDK toolchain - `dart compile js|exe`

use super::process::{run_bounded, ProcessOutput};
use super::Toolchain;
use crate::limits::{CompileLimits, HEALTH_PROBE_TIMEOUT};
use crate::types::Target;
use crate::workspace::Workspace;
use async_trait::async_trait;
use std::ffi::OsString;

/// Version probes print one short line
const PROBE_OUTPUT_BYTES: usize = 64 * 1024;

/// Invokes the `dart` CLI as a direct child process (no shell)
#[derive(Debug, Clone)]
pub struct DartToolchain {
    program: String,
    /// Arguments placed before the `compile` subcommand
    leading_args: Vec<String>,
}

impl DartToolchain {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Prefix every invocation with `args`, e.g. a script path when the
    /// program is an interpreter
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// `[leading..] compile <js|exe> -o <artifact> <source>`
    pub fn compile_args(&self, workspace: &Workspace, target: Target) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.leading_args.iter().map(OsString::from).collect();
        args.push("compile".into());
        args.push(target.subcommand().into());
        args.push("-o".into());
        args.push(workspace.artifact_path(target).into_os_string());
        args.push(workspace.source_path().as_os_str().to_os_string());
        args
    }
}

impl Default for DartToolchain {
    fn default() -> Self {
        Self::new("dart")
    }
}

#[async_trait]
impl Toolchain for DartToolchain {
    async fn compile(
        &self,
        workspace: &Workspace,
        target: Target,
        limits: &CompileLimits,
    ) -> ProcessOutput {
        let args = self.compile_args(workspace, target);

        tracing::info!(
            workspace_id = %workspace.id(),
            program = %self.program,
            args = ?args,
            "Executing compiler"
        );

        let output = run_bounded(
            &self.program,
            &args,
            limits.timeout,
            limits.max_output_bytes,
        )
        .await;

        tracing::debug!(
            workspace_id = %workspace.id(),
            ending = ?output.ending,
            duration_ms = output.duration_ms,
            "Compiler finished"
        );

        output
    }

    async fn probe(&self) -> bool {
        let mut args = self.leading_args.clone();
        args.push("--version".to_string());

        let output = run_bounded(
            &self.program,
            &args,
            HEALTH_PROBE_TIMEOUT,
            PROBE_OUTPUT_BYTES,
        )
        .await;

        if output.succeeded() {
            // dart prints its version banner on stderr
            let banner = if output.stderr.trim().is_empty() {
                output.stdout.trim()
            } else {
                output.stderr.trim()
            };
            tracing::info!(version = banner, "Dart SDK detected");
            true
        } else {
            tracing::error!(
                program = %self.program,
                ending = ?output.ending,
                "Dart SDK not found in PATH"
            );
            false
        }
    }

    fn name(&self) -> &str {
        "dart"
    }
}
