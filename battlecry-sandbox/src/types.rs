//! Core types for compile requests and outcomes

use battlecry_common::types::CompileResponse;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Compilation mode selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// `dart compile js`, textual output returned to the client
    Js,
    /// `dart compile exe`, binary output summarised by size
    Native,
}

impl Target {
    /// Parse the exact wire name ("js" or "native")
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "js" => Some(Target::Js),
            "native" => Some(Target::Native),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Target::Js => "js",
            Target::Native => "native",
        }
    }

    /// `dart compile` subcommand
    pub fn subcommand(self) -> &'static str {
        match self {
            Target::Js => "js",
            Target::Native => "exe",
        }
    }

    /// File name of the compiler artifact inside the output directory
    pub fn artifact_name(self) -> &'static str {
        match self {
            Target::Js => "output.js",
            Target::Native => "output.exe",
        }
    }

    /// Whether the artifact is returned verbatim
    pub fn is_textual(self) -> bool {
        matches!(self, Target::Js)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated compile request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    pub source_text: String,
    pub target: Target,
}

impl CompileRequest {
    pub fn new(source_text: impl Into<String>, target: Target) -> Self {
        Self {
            source_text: source_text.into(),
            target,
        }
    }
}

/// Result of one compiler invocation, already classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    Success {
        output: String,
        stdout: String,
        stderr: String,
    },
    Failure {
        reason: String,
        stdout: Option<String>,
        stderr: Option<String>,
    },
}

impl CompileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CompileOutcome::Success { .. })
    }

    pub fn into_response(self, target: Target) -> CompileResponse {
        match self {
            CompileOutcome::Success {
                output,
                stdout,
                stderr,
            } => CompileResponse::success(output, stdout, stderr, target.as_str()),
            CompileOutcome::Failure {
                reason,
                stdout,
                stderr,
            } => CompileResponse::failure(reason, stdout, stderr),
        }
    }
}

/// Summary returned in place of a native executable
pub fn native_summary(size: u64) -> String {
    format!(
        "Native executable compiled successfully!\n\nOutput file size: {} bytes\n\nNote: Binary executables cannot be displayed in the editor.",
        size
    )
}
