// src/deploy/compose.rs

use std::path::PathBuf;

use crate::deploy::WorkloadRunner;
use crate::errors::RunnerError;
use crate::exec::run_command;
use crate::types::BoxFuture;

/// Runs compose `build` and `up -d` inside the repository directory.
#[derive(Debug, Clone)]
pub struct ComposeRunner {
    project_dir: PathBuf,
    /// Program plus leading args, e.g. `["docker", "compose"]`.
    command: Vec<String>,
}

impl ComposeRunner {
    pub fn new(project_dir: impl Into<PathBuf>, command: Vec<String>) -> Self {
        Self {
            project_dir: project_dir.into(),
            command,
        }
    }

    async fn compose(&self, step: &str, extra: &[&str]) -> Result<(), RunnerError> {
        let (program, lead) = self
            .command
            .split_first()
            .ok_or_else(|| RunnerError::new(step, "no compose command configured"))?;

        let mut args: Vec<&str> = lead.iter().map(String::as_str).collect();
        args.extend_from_slice(extra);

        let output = run_command(program, args.as_slice(), Some(&self.project_dir), None)
            .await
            .map_err(|e| RunnerError::new(step, format!("{e:#}")))?;

        if output.success {
            Ok(())
        } else {
            Err(RunnerError::new(step, output.failure_message()))
        }
    }
}

impl WorkloadRunner for ComposeRunner {
    fn build(&self) -> BoxFuture<'_, Result<(), RunnerError>> {
        Box::pin(self.compose("build", &["build"]))
    }

    fn up(&self) -> BoxFuture<'_, Result<(), RunnerError>> {
        Box::pin(self.compose("up", &["up", "-d"]))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string(), "compose".to_string()]
    }

    #[tokio::test]
    async fn successful_step_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ComposeRunner::new(dir.path(), sh("exit 0"));
        assert!(runner.build().await.is_ok());
        assert!(runner.up().await.is_ok());
    }

    #[tokio::test]
    async fn failing_step_reports_stage_and_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ComposeRunner::new(dir.path(), sh("echo 'no such service' >&2; exit 1"));

        let err = runner.up().await.unwrap_err();
        assert_eq!(err.step, "up");
        assert!(err.message.contains("no such service"));
    }

    #[tokio::test]
    async fn empty_command_is_rejected() {
        let runner = ComposeRunner::new(".", Vec::new());
        let err = runner.build().await.unwrap_err();
        assert_eq!(err.step, "build");
    }
}
