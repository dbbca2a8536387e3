//! HTTP contract types for the Battlecry editor backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Response body of `POST /compile`
///
/// A failed compilation of user code is a routine outcome and is carried in
/// a 200 response with `success: false`; only validation and server faults
/// use error statuses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,

    /// Wire name of the compilation target (success only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl CompileResponse {
    pub fn success(
        output: impl Into<String>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            output: Some(output.into()),
            error: None,
            stdout: Some(stdout.into()),
            stderr: Some(stderr.into()),
            target: Some(target.into()),
        }
    }

    pub fn failure(
        error: impl Into<String>,
        stdout: Option<String>,
        stderr: Option<String>,
    ) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
            stdout,
            stderr,
            target: None,
        }
    }
}

/// Response body of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,

    /// Whether the `dart` binary answered a live version probe
    #[serde(rename = "dartSDK")]
    pub dart_sdk: bool,

    pub message: String,
}

impl HealthResponse {
    pub fn from_probe(dart_sdk: bool) -> Self {
        let message = if dart_sdk {
            "Dart SDK available"
        } else {
            "Dart SDK not found in PATH"
        };

        Self {
            status: "ok".to_string(),
            dart_sdk,
            message: message.to_string(),
        }
    }
}

/// Kind of entry in the virtual file store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    #[default]
    File,
    Directory,
}

impl FileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::File => "file",
            FileKind::Directory => "directory",
        }
    }

    /// Unix-style permission string given to new entries
    pub fn default_permissions(self) -> &'static str {
        match self {
            FileKind::File => "-rw-r--r--",
            FileKind::Directory => "drwxr-xr-x",
        }
    }
}

/// Size reported for directory entries
pub const DIRECTORY_SIZE: i32 = 4096;

/// Stored virtual file or directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub id: i32,

    pub path: String,

    pub content: String,

    /// "file" or "directory"
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,

    pub permissions: String,

    pub size: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Values for a new file store entry
#[derive(Debug, Clone, PartialEq)]
pub struct NewFileEntry {
    pub path: String,
    pub content: String,
    pub kind: FileKind,
    pub permissions: String,
    pub size: i32,
}

impl NewFileEntry {
    pub fn file(
        path: String,
        content: String,
        kind: FileKind,
        permissions: Option<String>,
    ) -> Self {
        let permissions = permissions.unwrap_or_else(|| kind.default_permissions().to_string());
        let size = content_size(&content);
        Self {
            path,
            content,
            kind,
            permissions,
            size,
        }
    }

    pub fn directory(path: String) -> Self {
        Self {
            path,
            content: String::new(),
            kind: FileKind::Directory,
            permissions: FileKind::Directory.default_permissions().to_string(),
            size: DIRECTORY_SIZE,
        }
    }
}

/// Partial update of a file store entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateFileRequest {
    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub permissions: Option<String>,
}

/// Request body of `POST /api/files`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFileRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub path: String,

    #[serde(default)]
    pub content: String,

    #[serde(default, rename = "type")]
    pub kind: FileKind,

    #[serde(default)]
    pub permissions: Option<String>,
}

impl From<CreateFileRequest> for NewFileEntry {
    fn from(request: CreateFileRequest) -> Self {
        NewFileEntry::file(request.path, request.content, request.kind, request.permissions)
    }
}

/// Request body of `POST /api/directories`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDirectoryRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub path: String,
}

/// Query string of `GET /api/files`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListFilesQuery {
    pub path: Option<String>,
}

/// Size recorded for file content, in characters
pub fn content_size(content: &str) -> i32 {
    i32::try_from(content.chars().count()).unwrap_or(i32::MAX)
}
