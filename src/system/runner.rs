//! Process execution behind a trait so command output can be scripted in tests.

use super::errors::CommandError;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Runs one program to completion and returns its stdout.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> Result<String, CommandError>;
}

/// [`CommandRunner`] backed by `tokio::process`.
///
/// The child is killed if the returned future is dropped, so cancelling a
/// sync also stops the command it is waiting on.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    #[instrument(skip(self))]
    async fn run(&self, program: &str, args: &[String]) -> Result<String, CommandError> {
        let output = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(CommandError::Failed {
                program: program.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(bytes = stdout.len(), "Command completed");
        Ok(stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let result = ProcessRunner
            .run("splitroute-definitely-not-a-real-program", &[])
            .await;

        match result {
            Err(CommandError::Spawn { program, .. }) => {
                assert_eq!(program, "splitroute-definitely-not-a-real-program")
            }
            other => panic!("expected spawn error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_failed() {
        let result = ProcessRunner.run("false", &[]).await;
        assert!(matches!(result, Err(CommandError::Failed { code: Some(1), .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_is_returned() {
        let output = ProcessRunner
            .run("echo", &["hello".to_string()])
            .await
            .unwrap();
        assert_eq!(output, "hello\n");
    }
}
