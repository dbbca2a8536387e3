//! Periodic sweep of the temp root
//!
//! Backstop for workspaces whose owning request never ran its cleanup.
//! Any entry under the root whose mtime is older than the retention window
//! is deleted; per-entry failures are logged and the sweep moves on.

use crate::limits::SweepPolicy;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::task::JoinHandle;

/// Counts from one sweep pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: usize,
    pub failed: usize,
}

/// Deletes stale entries from a temp root
#[derive(Debug, Clone)]
pub struct TempSweeper {
    root: PathBuf,
    policy: SweepPolicy,
}

impl TempSweeper {
    pub fn new(root: impl Into<PathBuf>, policy: SweepPolicy) -> Self {
        Self {
            root: root.into(),
            policy,
        }
    }

    /// Run one pass, deleting entries last modified before `now - retention`
    pub async fn sweep_once(&self) -> SweepReport {
        let mut report = SweepReport::default();

        let Some(cutoff) = SystemTime::now().checked_sub(self.policy.retention) else {
            return report;
        };

        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return report,
            Err(e) => {
                tracing::error!(root = %self.root.display(), "Failed to list temp root: {}", e);
                report.failed += 1;
                return report;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(
                        root = %self.root.display(),
                        "Failed to read temp root entry: {}",
                        e
                    );
                    report.failed += 1;
                    break;
                }
            };

            let path = entry.path();
            match remove_if_stale(&path, cutoff).await {
                Ok(true) => {
                    tracing::info!(path = %path.display(), "Cleaned up old temp file");
                    report.removed += 1;
                }
                Ok(false) => {}
                // Removed by its owning request between listing and deletion
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), "Error cleaning up temp entry: {}", e);
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Sweep immediately, then every `policy.interval`
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.policy.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let report = self.sweep_once().await;
                tracing::debug!(
                    removed = report.removed,
                    failed = report.failed,
                    "Temp sweep complete"
                );
            }
        })
    }
}

async fn remove_if_stale(path: &Path, cutoff: SystemTime) -> io::Result<bool> {
    let metadata = tokio::fs::symlink_metadata(path).await?;
    if metadata.modified()? >= cutoff {
        return Ok(false);
    }

    if metadata.is_dir() {
        tokio::fs::remove_dir_all(path).await?;
    } else {
        tokio::fs::remove_file(path).await?;
    }
    Ok(true)
}
