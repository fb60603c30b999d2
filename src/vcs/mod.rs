// src/vcs/mod.rs

//! Source-control side of the supervisor.
//!
//! - [`SourceControlClient`] is the seam; [`git::GitCli`] is the production
//!   implementation shelling out to `git`.
//! - [`detector::ChangeDetector`] decides whether the remote head moved.

pub mod detector;
pub mod git;

pub use detector::{ChangeDetector, ChangeOutcome};
pub use git::GitCli;

use crate::errors::GitError;
use crate::types::{BoxFuture, CommitId};

/// Trait abstracting the version-control client.
///
/// Tests provide scripted implementations that never touch a repository.
pub trait SourceControlClient: Send + Sync {
    /// Update remote-tracking refs for `remote/branch`.
    fn fetch<'a>(&'a self, remote: &'a str, branch: &'a str) -> BoxFuture<'a, Result<(), GitError>>;

    /// Commit that `remote/branch` points to after the last fetch.
    fn resolve_remote_head<'a>(
        &'a self,
        remote: &'a str,
        branch: &'a str,
    ) -> BoxFuture<'a, Result<CommitId, GitError>>;

    /// Bring the working tree to `commit`.
    fn sync_worktree<'a>(&'a self, commit: &'a CommitId) -> BoxFuture<'a, Result<(), GitError>>;
}
