//! Compile request validation
//!
//! Requests are checked in a fixed order (format, size, pattern scan,
//! target) before any workspace or process is allocated. The pattern scan
//! is advisory: matches are logged and never reject a request.

use crate::types::{CompileRequest, Target};
use battlecry_common::BattlecryError;
use regex::RegexSet;
use serde_json::Value;
use thiserror::Error;

/// Reason a compile request was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `code` missing, empty, or not a string
    #[error("Invalid code format")]
    InvalidFormat,

    #[error("Code exceeds maximum size ({}KB)", .max_chars / 1000)]
    TooLarge { max_chars: usize },

    #[error("Invalid target. Must be \"js\" or \"native\"")]
    InvalidTarget,
}

impl From<ValidationError> for BattlecryError {
    fn from(err: ValidationError) -> Self {
        BattlecryError::InvalidRequest(err.to_string())
    }
}

/// Identifiers associated with process spawning, FFI and destructive file access
pub const DANGEROUS_PATTERNS: &[(&str, &str)] = &[
    ("dart:ffi", r"(?i)dart:ffi"),
    ("file-delete", r"(?i)dart:io.*File.*delete"),
    ("Process.run", r"(?i)Process\.run"),
    ("Process.start", r"(?i)Process\.start"),
];

/// Detection-only scanner for dangerous capabilities in Dart source
pub struct PatternScanner {
    set: RegexSet,
}

impl PatternScanner {
    pub fn new() -> Result<Self, regex::Error> {
        let set = RegexSet::new(DANGEROUS_PATTERNS.iter().map(|(_, pattern)| *pattern))?;
        Ok(Self { set })
    }

    /// Names of every pattern that matches `source`
    pub fn scan(&self, source: &str) -> Vec<&'static str> {
        self.set
            .matches(source)
            .into_iter()
            .map(|index| DANGEROUS_PATTERNS[index].0)
            .collect()
    }
}

/// Turns raw request bodies into [`CompileRequest`]s
pub struct RequestValidator {
    max_source_chars: usize,
    scanner: PatternScanner,
}

impl RequestValidator {
    pub fn new(max_source_chars: usize) -> Result<Self, regex::Error> {
        Ok(Self {
            max_source_chars,
            scanner: PatternScanner::new()?,
        })
    }

    pub fn validate(&self, body: &Value) -> Result<CompileRequest, ValidationError> {
        let code = match body.get("code") {
            Some(Value::String(code)) if !code.is_empty() => code,
            _ => return Err(ValidationError::InvalidFormat),
        };

        // Byte length bounds character count from above
        if code.len() > self.max_source_chars && code.chars().count() > self.max_source_chars {
            return Err(ValidationError::TooLarge {
                max_chars: self.max_source_chars,
            });
        }

        let matched = self.scanner.scan(code);
        if !matched.is_empty() {
            tracing::warn!(
                patterns = ?matched,
                "Potentially dangerous code pattern detected"
            );
        }

        let target = body
            .get("target")
            .and_then(Value::as_str)
            .and_then(Target::from_wire)
            .ok_or(ValidationError::InvalidTarget)?;

        Ok(CompileRequest::new(code.clone(), target))
    }
}
