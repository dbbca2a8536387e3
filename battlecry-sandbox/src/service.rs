//! Compile service - main entry point

use crate::limits::CompileLimits;
use crate::runtime::{ProcessEnding, ProcessOutput, Toolchain};
use crate::types::{native_summary, CompileOutcome, CompileRequest, Target};
use crate::validation::{RequestValidator, ValidationError};
use crate::workspace::{Workspace, WorkspaceManager};
use battlecry_common::{BattlecryError, Result};
use serde_json::Value;
use std::io;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Validates, stages, compiles and classifies compile requests
pub struct CompileService {
    workspaces: WorkspaceManager,
    toolchain: Arc<dyn Toolchain>,
    validator: RequestValidator,
    limits: CompileLimits,
    /// Admission limit on concurrent compiler processes
    permits: Option<Arc<Semaphore>>,
}

impl CompileService {
    /// Create a new compile service with the given toolchain
    pub fn new(
        workspaces: WorkspaceManager,
        toolchain: impl Toolchain + 'static,
        limits: CompileLimits,
    ) -> Result<Self> {
        let validator = RequestValidator::new(limits.max_source_chars)
            .map_err(|e| BattlecryError::InternalError(format!("Invalid source pattern: {}", e)))?;
        let permits = limits
            .max_concurrent
            .map(|permits| Arc::new(Semaphore::new(permits.max(1))));

        Ok(Self {
            workspaces,
            toolchain: Arc::new(toolchain),
            validator,
            limits,
            permits,
        })
    }

    /// Validate a raw JSON body without allocating anything
    pub fn validate(&self, body: &Value) -> std::result::Result<CompileRequest, ValidationError> {
        self.validator.validate(body)
    }

    /// Compile a validated request
    ///
    /// Only workspace allocation failures are returned as errors; every
    /// compiler failure is folded into [`CompileOutcome::Failure`]. The
    /// workspace is released before this returns, on every path.
    pub async fn compile(&self, request: CompileRequest) -> Result<CompileOutcome> {
        let _permit = match &self.permits {
            Some(semaphore) => Some(
                semaphore
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|e| BattlecryError::InternalError(e.to_string()))?,
            ),
            None => None,
        };

        let workspace = self.workspaces.allocate(&request.source_text).await?;

        tracing::info!(
            workspace_id = %workspace.id(),
            target = %request.target,
            toolchain = self.toolchain.name(),
            "Compilation request received"
        );

        let output = self
            .toolchain
            .compile(&workspace, request.target, &self.limits)
            .await;
        let outcome = classify(&workspace, request.target, output, &self.limits).await;

        match &outcome {
            CompileOutcome::Success { output, .. } => tracing::info!(
                workspace_id = %workspace.id(),
                output_len = output.len(),
                "Compilation succeeded"
            ),
            CompileOutcome::Failure { reason, .. } => tracing::warn!(
                workspace_id = %workspace.id(),
                "Compilation error: {}",
                reason
            ),
        }

        Ok(outcome)
    }

    /// Live check that the compiler binary is reachable
    pub async fn probe_toolchain(&self) -> bool {
        self.toolchain.probe().await
    }
}

/// Map a finished process to an outcome
///
/// Process failure is checked before artifact existence, and existence
/// before reading, so a zero-exit run without a complete artifact is never
/// reported as success.
async fn classify(
    workspace: &Workspace,
    target: Target,
    output: ProcessOutput,
    limits: &CompileLimits,
) -> CompileOutcome {
    let ProcessOutput {
        ending,
        stdout,
        stderr,
        ..
    } = output;

    let failure_message = match ending {
        ProcessEnding::Exited { code: Some(0) } => None,
        ProcessEnding::TimedOut => {
            return CompileOutcome::Failure {
                reason: format!("Compilation timed out after {:?}", limits.timeout),
                stdout: Some(stdout),
                stderr: None,
            };
        }
        ProcessEnding::OutputLimitExceeded => {
            return CompileOutcome::Failure {
                reason: format!(
                    "Compiler output exceeded {} bytes",
                    limits.max_output_bytes
                ),
                stdout: Some(stdout),
                stderr: None,
            };
        }
        ProcessEnding::Exited { code: Some(code) } => {
            Some(format!("Compiler exited with status {}", code))
        }
        ProcessEnding::Exited { code: None } => Some("Compiler terminated by signal".to_string()),
        ProcessEnding::Failed(message) => Some(message),
    };

    if let Some(message) = failure_message {
        let stderr = stderr.trim_end();
        let reason = if stderr.is_empty() {
            message
        } else {
            stderr.to_string()
        };
        return CompileOutcome::Failure {
            reason,
            stdout: Some(stdout),
            stderr: None,
        };
    }

    let artifact = workspace.artifact_path(target);
    let metadata = match tokio::fs::metadata(&artifact).await {
        Ok(metadata) if metadata.is_file() => metadata,
        Ok(_) => return artifact_missing(stdout, stderr),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return artifact_missing(stdout, stderr),
        Err(e) => return read_failure(e),
    };

    let compiled = if target.is_textual() {
        match tokio::fs::read(&artifact).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => return read_failure(e),
        }
    } else {
        native_summary(metadata.len())
    };

    CompileOutcome::Success {
        output: compiled,
        stdout,
        stderr,
    }
}

fn artifact_missing(stdout: String, stderr: String) -> CompileOutcome {
    CompileOutcome::Failure {
        reason: "Compilation completed but output file not found".to_string(),
        stdout: Some(stdout),
        stderr: Some(stderr),
    }
}

fn read_failure(err: io::Error) -> CompileOutcome {
    CompileOutcome::Failure {
        reason: format!("Failed to read compiled output: {}", err),
        stdout: None,
        stderr: None,
    }
}
