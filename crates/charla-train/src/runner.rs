use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::TrainError;

/// One external step of a training cycle: a command plus an optional
/// wall-clock timeout.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl JobSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: None,
            timeout: None,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Render as a shell-like string for log lines.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// The process exited on its own. Processes killed by a signal report
    /// exit code -1.
    Exited(i32),
    /// The process outlived its deadline and was killed.
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub status: JobStatus,
    pub stdout: String,
    pub stderr: String,
}

impl JobOutcome {
    pub fn success(&self) -> bool {
        self.status == JobStatus::Exited(0)
    }
}

/// Capability to execute one bounded external job. The orchestrator
/// depends only on this, never on process-spawning details, so tests can
/// substitute a scripted runner.
pub trait JobRunner: Send + Sync {
    fn run(&self, spec: &JobSpec) -> Result<JobOutcome, TrainError>;
}

/// Production runner: spawns the command with piped output and polls it,
/// killing at the deadline.
///
/// Grandchildren that inherit the output pipes are not waited on: once
/// the direct child is gone, the reader threads get a short drain grace
/// and are then abandoned, so a backgrounded grandchild can delay output
/// capture but never the return of [`JobRunner::run`].
#[derive(Debug, Default)]
pub struct ProcessRunner;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const PIPE_DRAIN_GRACE: Duration = Duration::from_millis(500);

impl JobRunner for ProcessRunner {
    fn run(&self, spec: &JobSpec) -> Result<JobOutcome, TrainError> {
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = &spec.cwd {
            command.current_dir(cwd);
        }

        let mut child = command.spawn().map_err(|source| TrainError::Spawn {
            program: spec.program.clone(),
            source,
        })?;

        // Drain both pipes off-thread so a chatty child cannot deadlock
        // against a full pipe buffer while we wait on it.
        let stdout_handle = child.stdout.take().map(drain_pipe);
        let stderr_handle = child.stderr.take().map(drain_pipe);

        let deadline = spec.timeout.map(|t| Instant::now() + t);
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break JobStatus::Exited(status.code().unwrap_or(-1));
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                kill_and_reap(&mut child);
                break JobStatus::TimedOut;
            }
            thread::sleep(POLL_INTERVAL);
        };

        let stdout = stdout_handle.map(collect_pipe).unwrap_or_default();
        let stderr = stderr_handle.map(collect_pipe).unwrap_or_default();

        Ok(JobOutcome {
            status,
            stdout,
            stderr,
        })
    }
}

fn drain_pipe(mut pipe: impl Read + Send + 'static) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        let _ = pipe.read_to_string(&mut buf);
        buf
    })
}

/// Wait briefly for a reader thread, then abandon it. A reader only
/// outlives the grace period when a grandchild still holds the pipe's
/// write end, and blocking on that would make the deadline meaningless.
fn collect_pipe(handle: thread::JoinHandle<String>) -> String {
    let give_up = Instant::now() + PIPE_DRAIN_GRACE;
    while !handle.is_finished() && Instant::now() < give_up {
        thread::sleep(Duration::from_millis(5));
    }
    if handle.is_finished() {
        handle.join().unwrap_or_default()
    } else {
        String::new()
    }
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> JobSpec {
        JobSpec::new("/bin/sh", vec!["-c".into(), script.into()])
    }

    #[test]
    fn test_captures_exit_code_and_output() {
        let outcome = ProcessRunner::default()
            .run(&sh("echo salida; echo problema >&2; exit 3"))
            .unwrap();

        assert_eq!(outcome.status, JobStatus::Exited(3));
        assert!(!outcome.success());
        assert_eq!(outcome.stdout.trim(), "salida");
        assert_eq!(outcome.stderr.trim(), "problema");
    }

    #[test]
    fn test_zero_exit_is_success() {
        let outcome = ProcessRunner::default().run(&sh("true")).unwrap();
        assert!(outcome.success());
    }

    #[test]
    fn test_deadline_kills_the_child() {
        let start = Instant::now();
        let outcome = ProcessRunner::default()
            .run(&sh("sleep 30").timeout(Duration::from_millis(200)))
            .unwrap();

        assert_eq!(outcome.status, JobStatus::TimedOut);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_deadline_holds_despite_background_grandchild() {
        // The shell forks a child that inherits the output pipes and
        // outlives the kill; the deadline must still bound run().
        let start = Instant::now();
        let outcome = ProcessRunner::default()
            .run(&sh("sleep 30 & wait").timeout(Duration::from_millis(200)))
            .unwrap();

        assert_eq!(outcome.status, JobStatus::TimedOut);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_missing_program_is_a_spawn_error() {
        let spec = JobSpec::new("/definitely/not/a/program", vec![]);
        assert!(matches!(
            ProcessRunner::default().run(&spec),
            Err(TrainError::Spawn { .. })
        ));
    }
}
