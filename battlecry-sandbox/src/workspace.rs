//! Per-request scratch workspaces
//!
//! A [`Workspace`] is the `<root>/<id>.dart` source file plus the
//! `<root>/<id>/` output directory staged for one compiler invocation. The
//! value is a scope guard: dropping it deletes both paths, so every exit
//! path of a request releases its workspace.

use crate::types::Target;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Unique workspace identifier (128 random bits, hex encoded)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    pub fn random() -> Self {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Allocates workspaces under a shared temp root
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the temp root if it does not exist yet
    pub async fn ensure_root(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Create a fresh workspace holding `source` as UTF-8
    pub async fn allocate(&self, source: &str) -> io::Result<Workspace> {
        let id = WorkspaceId::random();
        let workspace = Workspace {
            source_path: self.root.join(format!("{}.dart", id)),
            output_dir: self.root.join(id.as_str()),
            id,
        };

        // The guard already owns both paths, a failure below still cleans up.
        tokio::fs::create_dir_all(&workspace.output_dir).await?;
        tokio::fs::write(&workspace.source_path, source.as_bytes()).await?;

        tracing::debug!(
            workspace_id = %workspace.id,
            source_len = source.len(),
            "Workspace allocated"
        );

        Ok(workspace)
    }
}

/// Scratch file and output directory owned by a single request
#[derive(Debug)]
pub struct Workspace {
    id: WorkspaceId,
    source_path: PathBuf,
    output_dir: PathBuf,
}

impl Workspace {
    pub fn id(&self) -> &WorkspaceId {
        &self.id
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path the compiler writes its artifact to for `target`
    pub fn artifact_path(&self, target: Target) -> PathBuf {
        self.output_dir.join(target.artifact_name())
    }

    fn release(&self) {
        if let Err(e) = std::fs::remove_file(&self.source_path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(
                    workspace_id = %self.id,
                    path = %self.source_path.display(),
                    "Cleanup error: {}",
                    e
                );
            }
        }

        if let Err(e) = std::fs::remove_dir_all(&self.output_dir) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(
                    workspace_id = %self.id,
                    path = %self.output_dir.display(),
                    "Cleanup error: {}",
                    e
                );
            }
        }

        tracing::debug!(workspace_id = %self.id, "Workspace released");
    }
}

// Removal is synchronous on the calling worker so both paths are gone before
// the response is written. Artifacts are bounded by what one compile emits.
impl Drop for Workspace {
    fn drop(&mut self) {
        self.release();
    }
}
