//! Subject invocation.
//!
//! Runs the executable under test once, inside a sandbox, and captures both
//! standard streams as text.

use crate::error::InvokeError;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

/// Argument passed to the subject: the fixture's input file, relative to the sandbox.
pub const INPUT_NAME: &str = "input";

/// Interval between exit checks when a timeout is configured.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Captured output of one subject run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// How to invoke the subject.
#[derive(Debug, Clone)]
pub struct Invoker {
    executable: PathBuf,
    timeout: Option<Duration>,
}

impl Invoker {
    /// Create an invoker. `timeout: None` waits for the subject indefinitely.
    pub fn new(executable: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            executable: executable.into(),
            timeout,
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Run `<executable> input` with `workdir` as the child's working directory.
    pub fn run(&self, workdir: &Path) -> Result<RunOutput, InvokeError> {
        let mut cmd = Command::new(&self.executable);
        cmd.arg(INPUT_NAME)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!(
            executable = %self.executable.display(),
            workdir = %workdir.display(),
            timeout = ?self.timeout,
            "invoking subject"
        );

        let output = match self.timeout {
            None => {
                let output = cmd.output().map_err(|source| self.spawn_error(source))?;
                RunOutput {
                    status: output.status,
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                }
            }
            Some(timeout) => {
                let child = cmd.spawn().map_err(|source| self.spawn_error(source))?;
                wait_with_timeout(child, timeout)?
            }
        };

        tracing::debug!(status = %output.status, "subject exited");
        Ok(output)
    }

    fn spawn_error(&self, source: std::io::Error) -> InvokeError {
        InvokeError::Spawn {
            program: self.executable.clone(),
            source,
        }
    }
}

/// Which pipe a drained buffer came from.
enum Stream {
    Stdout,
    Stderr,
}

/// Poll `child` until it exits, killing it once `timeout` has elapsed.
///
/// Both pipes are drained on helper threads so the child never blocks on a
/// full pipe while we poll. Collecting the drained output shares the same
/// deadline: a background process that inherited a pipe and keeps it open
/// past the deadline also counts as a timeout.
fn wait_with_timeout(mut child: Child, timeout: Duration) -> Result<RunOutput, InvokeError> {
    let (tx, rx) = mpsc::channel();
    if let Some(pipe) = child.stdout.take() {
        drain(pipe, Stream::Stdout, tx.clone());
    }
    if let Some(pipe) = child.stderr.take() {
        drain(pipe, Stream::Stderr, tx.clone());
    }
    drop(tx);

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(InvokeError::TimedOut(timeout));
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                let _ = child.kill();
                return Err(InvokeError::Wait(e));
            }
        }
    };

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok((Stream::Stdout, bytes)) => stdout = bytes,
            Ok((Stream::Stderr, bytes)) => stderr = bytes,
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(%status, "subject exited but its output pipes are still open");
                return Err(InvokeError::TimedOut(timeout));
            }
        }
    }

    Ok(RunOutput {
        status,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    })
}

fn drain<R: Read + Send + 'static>(mut pipe: R, stream: Stream, tx: Sender<(Stream, Vec<u8>)>) {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut buf) {
            tracing::warn!(error = %e, captured = buf.len(), "failed to capture subject output");
        }
        let _ = tx.send((stream, buf));
    });
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    /// Write an executable shell script into `dir` and return its path.
    fn script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("subject.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn captures_both_streams() {
        let bin = tempdir().unwrap();
        let work = tempdir().unwrap();
        let exe = script(bin.path(), "echo out; echo err >&2");

        let output = Invoker::new(exe, None).run(work.path()).unwrap();
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert!(output.status.success());
    }

    #[test]
    fn passes_input_and_runs_in_workdir() {
        let bin = tempdir().unwrap();
        let work = tempdir().unwrap();
        std::fs::write(work.path().join("input"), "payload\n").unwrap();
        let exe = script(bin.path(), "cat \"$1\"; printf x > disk0");

        let output = Invoker::new(exe, None).run(work.path()).unwrap();
        assert_eq!(output.stdout, "payload\n");
        assert_eq!(std::fs::read(work.path().join("disk0")).unwrap(), b"x");
    }

    #[test]
    fn records_nonzero_exit() {
        let bin = tempdir().unwrap();
        let work = tempdir().unwrap();
        let exe = script(bin.path(), "echo partial; exit 3");

        let output = Invoker::new(exe, None).run(work.path()).unwrap();
        assert_eq!(output.status.code(), Some(3));
        assert_eq!(output.stdout, "partial\n");
    }

    #[test]
    fn missing_executable_fails_to_spawn() {
        let work = tempdir().unwrap();
        let result = Invoker::new(work.path().join("no_such_fs"), None).run(work.path());
        assert!(matches!(result, Err(InvokeError::Spawn { .. })));
    }

    #[test]
    fn timeout_kills_hung_subject() {
        let bin = tempdir().unwrap();
        let work = tempdir().unwrap();
        let exe = script(bin.path(), "exec sleep 10");

        let start = Instant::now();
        let result = Invoker::new(exe, Some(Duration::from_millis(200))).run(work.path());
        assert!(matches!(result, Err(InvokeError::TimedOut(_))));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn timeout_covers_background_process_holding_pipes() {
        let bin = tempdir().unwrap();
        let work = tempdir().unwrap();
        let exe = script(bin.path(), "sleep 6 &\necho done");

        let start = Instant::now();
        let result = Invoker::new(exe, Some(Duration::from_millis(500))).run(work.path());
        assert!(matches!(result, Err(InvokeError::TimedOut(_))));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn timed_run_captures_both_streams() {
        let bin = tempdir().unwrap();
        let work = tempdir().unwrap();
        let exe = script(bin.path(), "echo out; echo err >&2; exit 2");

        let output = Invoker::new(exe, Some(Duration::from_secs(10)))
            .run(work.path())
            .unwrap();
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert_eq!(output.status.code(), Some(2));
    }

    #[test]
    fn timed_run_captures_large_output() {
        let bin = tempdir().unwrap();
        let work = tempdir().unwrap();
        let exe = script(bin.path(), "i=0; while [ $i -lt 20000 ]; do echo line$i; i=$((i+1)); done");

        let output = Invoker::new(exe, Some(Duration::from_secs(30)))
            .run(work.path())
            .unwrap();
        assert_eq!(output.stdout.lines().count(), 20000);
    }
}
