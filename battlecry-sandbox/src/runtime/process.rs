//! Bounded child-process execution
//!
//! Runs one process to completion under a wall-clock deadline and a cap on
//! combined stdout + stderr bytes. Whichever limit trips first kills the
//! child; the captured output up to that point is still returned.
//!
//! On unix the child leads its own process group, and the whole group is
//! killed once the run ends, so helpers the compiler forks never outlive
//! the request.

use std::ffi::OsStr;
use std::process::Stdio;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// How a bounded process run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEnding {
    /// Process exited on its own (`code` is None when killed by a signal)
    Exited { code: Option<i32> },

    /// Process could not be spawned or waited on
    Failed(String),

    TimedOut,

    OutputLimitExceeded,
}

/// Captured result of a bounded process run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub ending: ProcessEnding,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl ProcessOutput {
    /// Exited on its own with status 0
    pub fn succeeded(&self) -> bool {
        self.ending == ProcessEnding::Exited { code: Some(0) }
    }
}

/// Run `program` with `args`, stdin closed, bounded by `timeout` and
/// `max_output_bytes`
pub async fn run_bounded<I, S>(
    program: &str,
    args: I,
    timeout: Duration,
    max_output_bytes: usize,
) -> ProcessOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let start = Instant::now();
    let deadline = start + timeout;

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            return ProcessOutput {
                ending: ProcessEnding::Failed(format!("Failed to spawn {}: {}", program, e)),
                stdout: String::new(),
                stderr: String::new(),
                duration_ms: start.elapsed().as_millis() as u64,
            };
        }
    };

    // Dropped on every exit path, including cancellation of this future
    let group = ProcessGroup::of(&child);

    let captured = Arc::new(AtomicUsize::new(0));
    let stop = CancellationToken::new();

    let stdout_task = drain(
        child.stdout.take(),
        captured.clone(),
        max_output_bytes,
        stop.clone(),
        deadline,
    );
    let stderr_task = drain(
        child.stderr.take(),
        captured.clone(),
        max_output_bytes,
        stop.clone(),
        deadline,
    );

    let supervise = async {
        let ending = tokio::select! {
            status = child.wait() => match status {
                Ok(status) => ProcessEnding::Exited { code: status.code() },
                Err(e) => ProcessEnding::Failed(format!("Process wait error: {}", e)),
            },
            () = stop.cancelled() => ProcessEnding::OutputLimitExceeded,
            () = tokio::time::sleep_until(deadline) => ProcessEnding::TimedOut,
        };

        // Leftover helpers would otherwise hold the output pipes open
        group.kill();

        if !matches!(ending, ProcessEnding::Exited { .. }) {
            if let Err(e) = child.kill().await {
                tracing::warn!(program, "Failed to kill process: {}", e);
            }
            stop.cancel();
        }

        ending
    };

    let (mut ending, stdout, stderr) = tokio::join!(supervise, stdout_task, stderr_task);

    // A stream can overflow in the same instant the process exits
    if captured.load(Ordering::SeqCst) > max_output_bytes {
        ending = ProcessEnding::OutputLimitExceeded;
    }

    ProcessOutput {
        ending,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

/// Process group led by a spawned child
///
/// The group id outlives the leader while any member is alive, so signalling
/// it after the leader has been reaped only reaches our own descendants.
struct ProcessGroup {
    id: Option<i32>,
}

impl ProcessGroup {
    fn of(child: &Child) -> Self {
        Self {
            id: child.id().and_then(|pid| i32::try_from(pid).ok()),
        }
    }

    #[cfg(unix)]
    fn kill(&self) {
        if let Some(id) = self.id {
            // SAFETY: kill(2) has no memory effects; a negative pid targets the group
            unsafe {
                libc::kill(-id, libc::SIGKILL);
            }
        }
    }

    #[cfg(not(unix))]
    fn kill(&self) {
        let _ = self.id;
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Read `reader` to EOF, stopping early on cancellation, deadline, or once
/// the shared byte budget is exhausted
async fn drain<R>(
    reader: Option<R>,
    captured: Arc<AtomicUsize>,
    max_output_bytes: usize,
    stop: CancellationToken,
    deadline: Instant,
) -> Vec<u8>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let Some(mut reader) = reader else {
        return buf;
    };

    let mut chunk = [0u8; 8192];
    loop {
        tokio::select! {
            () = stop.cancelled() => break,
            () = tokio::time::sleep_until(deadline) => break,
            read = reader.read(&mut chunk) => match read {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    buf.extend_from_slice(&chunk[..n]);
                    let total = captured.fetch_add(n, Ordering::SeqCst) + n;
                    if total > max_output_bytes {
                        stop.cancel();
                        break;
                    }
                }
            },
        }
    }

    buf
}
