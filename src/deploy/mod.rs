// src/deploy/mod.rs

//! Workload side of the supervisor.
//!
//! - [`WorkloadRunner`] abstracts building and starting the containers.
//! - [`compose::ComposeRunner`] drives `docker-compose` (or `docker compose`).
//! - [`executor::DeploymentExecutor`] sequences the steps and tags failures
//!   with the stage that broke.

pub mod compose;
pub mod executor;

pub use compose::ComposeRunner;
pub use executor::DeploymentExecutor;

use crate::errors::RunnerError;
use crate::types::BoxFuture;

/// Trait abstracting the container orchestration tool.
///
/// Both steps must be safe to re-run after a partial failure; the executor
/// never rolls back.
pub trait WorkloadRunner: Send + Sync {
    fn build(&self) -> BoxFuture<'_, Result<(), RunnerError>>;
    fn up(&self) -> BoxFuture<'_, Result<(), RunnerError>>;
}
