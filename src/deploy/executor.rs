// src/deploy/executor.rs

use tracing::info;

use crate::deploy::WorkloadRunner;
use crate::errors::{DeployError, DeployStage};
use crate::types::CommitId;
use crate::vcs::{ChangeDetector, SourceControlClient};

/// Rebuilds and restarts the workload.
#[derive(Debug)]
pub struct DeploymentExecutor<W> {
    runner: W,
}

impl<W: WorkloadRunner> DeploymentExecutor<W> {
    pub fn new(runner: W) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &W {
        &self.runner
    }

    /// `build` then `up` against the current working tree.
    ///
    /// Stops at the first failing step; nothing is rolled back.
    pub async fn deploy(&self) -> Result<(), DeployError> {
        self.runner
            .build()
            .await
            .map_err(|e| DeployError::new(DeployStage::Build, e.message))?;
        self.runner
            .up()
            .await
            .map_err(|e| DeployError::new(DeployStage::Up, e.message))?;
        Ok(())
    }

    /// One full deployment attempt: move the working tree to `target`, then
    /// [`deploy`](Self::deploy).
    pub async fn deploy_commit<S: SourceControlClient>(
        &self,
        detector: &ChangeDetector<S>,
        target: &CommitId,
    ) -> Result<(), DeployError> {
        detector
            .sync_worktree(target)
            .await
            .map_err(|e| DeployError::new(DeployStage::Checkout, e.to_string()))?;
        self.deploy().await?;
        info!(commit = %target, "workload rebuilt and restarted");
        Ok(())
    }
}
