//! External process execution.
//!
//! Both the diff tool and the formatter are reached through
//! [`ProcessExecutor`] so tests can substitute fakes for the real binaries.

use std::env;
use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::ProcessError;

/// Environment variable holding a per-invocation deadline in seconds.
pub const TIMEOUT_ENV_VAR: &str = "PUSHFMT_FORMAT_TIMEOUT";

/// Captured streams of a successful process run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Trait for executing external commands.
///
/// This abstraction allows mocking the diff tool and formatter in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    /// Run `program` in `cwd` and wait for it to exit successfully.
    async fn run_to_completion(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<(), ProcessError>;

    /// Run `program` in `cwd` and return its output if it exits successfully.
    async fn capture_output(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<CapturedOutput, ProcessError>;
}

/// Executor that spawns real processes with tokio.
#[derive(Debug, Clone, Default)]
pub struct SystemExecutor {
    deadline: Option<Duration>,
}

impl SystemExecutor {
    pub fn new(deadline: Option<Duration>) -> Self {
        Self { deadline }
    }

    /// Build an executor using the deadline from `PUSHFMT_FORMAT_TIMEOUT`, if any.
    pub fn from_env() -> Self {
        Self::new(deadline_from_env())
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    async fn output(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<Output, ProcessError> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let spawn_failed = |source| ProcessError::SpawnFailed {
            program: program.to_string(),
            source,
        };

        let output = match self.deadline {
            Some(deadline) => timeout(deadline, cmd.output())
                .await
                .map_err(|_| ProcessError::Timeout {
                    program: program.to_string(),
                    after: deadline,
                })?
                .map_err(spawn_failed)?,
            None => cmd.output().await.map_err(spawn_failed)?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output.status.code().unwrap_or(-1);
            return Err(ProcessError::NonZeroExit {
                program: program.to_string(),
                code,
                stderr,
            });
        }

        Ok(output)
    }
}

#[async_trait]
impl ProcessExecutor for SystemExecutor {
    async fn run_to_completion(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<(), ProcessError> {
        let output = self.output(program, args, cwd).await?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!("{}: {}", program, line);
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            debug!("{} (stderr): {}", program, line);
        }

        Ok(())
    }

    async fn capture_output(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<CapturedOutput, ProcessError> {
        let output = self.output(program, args, cwd).await?;

        Ok(CapturedOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Read the invocation deadline from the environment.
///
/// Logs a warning if the variable is set but is not a positive number of
/// seconds, and runs without a deadline in that case.
fn deadline_from_env() -> Option<Duration> {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
            _ => {
                warn!(
                    "Invalid {} value '{}', running without a deadline",
                    TIMEOUT_ENV_VAR, v
                );
                None
            }
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // ============================================
    // Deadline Configuration Tests
    // ============================================

    #[test]
    fn test_deadline_default_none() {
        temp_env::with_var_unset(TIMEOUT_ENV_VAR, || {
            assert_eq!(deadline_from_env(), None);
        });
    }

    #[test]
    fn test_deadline_from_env() {
        temp_env::with_var(TIMEOUT_ENV_VAR, Some("90"), || {
            assert_eq!(deadline_from_env(), Some(Duration::from_secs(90)));
        });
    }

    #[test]
    fn test_deadline_invalid_env_ignored() {
        temp_env::with_var(TIMEOUT_ENV_VAR, Some("soon"), || {
            assert_eq!(deadline_from_env(), None);
        });
    }

    #[test]
    fn test_deadline_zero_ignored() {
        temp_env::with_var(TIMEOUT_ENV_VAR, Some("0"), || {
            assert_eq!(deadline_from_env(), None);
        });
    }

    // ============================================
    // Subprocess Tests
    // ============================================

    #[tokio::test]
    #[cfg(unix)]
    async fn test_capture_output_runs_in_cwd() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();

        let output = SystemExecutor::default()
            .capture_output("ls", &[], dir.path())
            .await
            .unwrap();

        assert_eq!(output.stdout.trim(), "marker.txt");
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_non_zero_exit_reports_code_and_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let result = SystemExecutor::default()
            .run_to_completion("sh", &args(&["-c", "echo 'bad file' >&2; exit 3"]), dir.path())
            .await;

        match result {
            Err(ProcessError::NonZeroExit { code, stderr, .. }) => {
                assert_eq!(code, 3);
                assert_eq!(stderr, "bad file");
            }
            other => panic!("Expected NonZeroExit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let result = SystemExecutor::default()
            .run_to_completion("nonexistent_command_12345", &[], dir.path())
            .await;

        assert!(matches!(result, Err(ProcessError::SpawnFailed { .. })));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_deadline_is_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let executor = SystemExecutor::new(Some(Duration::from_millis(100)));

        let result = executor
            .run_to_completion("sleep", &args(&["10"]), dir.path())
            .await;

        match result {
            Err(ProcessError::Timeout { after, .. }) => {
                assert_eq!(after, Duration::from_millis(100));
            }
            other => panic!("Expected Timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_fast_command_completes_within_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let executor = SystemExecutor::new(Some(Duration::from_secs(5)));

        let output = executor
            .capture_output("echo", &args(&["quick"]), dir.path())
            .await
            .unwrap();

        assert_eq!(output.stdout, "quick\n");
    }
}
