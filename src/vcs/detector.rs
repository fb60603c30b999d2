// src/vcs/detector.rs

use tracing::debug;

use crate::errors::GitError;
use crate::types::{CommitId, RepositoryRef};
use crate::vcs::SourceControlClient;

/// Result of one change check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeOutcome {
    pub changed: bool,
    pub new_ref: CommitId,
}

/// Decides whether the followed branch moved since the last deployment.
///
/// Holds no state of its own: the caller passes in the [`RepositoryRef`] and
/// commits the new head only after a successful deployment, so a failed
/// deployment is retried against the same commit next cycle.
#[derive(Debug)]
pub struct ChangeDetector<S> {
    client: S,
    remote: String,
    branch: String,
}

impl<S: SourceControlClient> ChangeDetector<S> {
    pub fn new(client: S, remote: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            client,
            remote: remote.into(),
            branch: branch.into(),
        }
    }

    pub fn client(&self) -> &S {
        &self.client
    }

    /// Fetch, resolve the remote head, and compare with `stored.local`.
    ///
    /// With no stored head the outcome is always `changed = true`.
    pub async fn check_for_change(&self, stored: &RepositoryRef) -> Result<ChangeOutcome, GitError> {
        self.client.fetch(&self.remote, &self.branch).await?;
        let head = self
            .client
            .resolve_remote_head(&self.remote, &self.branch)
            .await?;

        let changed = stored.local.as_ref() != Some(&head);
        debug!(
            remote = %self.remote,
            branch = %self.branch,
            head = %head,
            local = ?stored.local.as_ref().map(CommitId::as_str),
            changed,
            "compared remote head"
        );

        Ok(ChangeOutcome {
            changed,
            new_ref: head,
        })
    }

    /// Move the working tree to `target` ahead of a build.
    pub async fn sync_worktree(&self, target: &CommitId) -> Result<(), GitError> {
        self.client.sync_worktree(target).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::types::BoxFuture;

    struct Fixed {
        head: CommitId,
        fetch_error: Option<GitError>,
        calls: Mutex<Vec<String>>,
    }

    impl Fixed {
        fn new(head: &str) -> Self {
            Self {
                head: CommitId::new(head),
                fetch_error: None,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl SourceControlClient for Fixed {
        fn fetch<'a>(&'a self, remote: &'a str, branch: &'a str) -> BoxFuture<'a, Result<(), GitError>> {
            self.calls.lock().unwrap().push(format!("fetch {remote} {branch}"));
            let res = match &self.fetch_error {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            };
            Box::pin(async move { res })
        }

        fn resolve_remote_head<'a>(
            &'a self,
            _remote: &'a str,
            _branch: &'a str,
        ) -> BoxFuture<'a, Result<CommitId, GitError>> {
            self.calls.lock().unwrap().push("resolve".to_string());
            let head = self.head.clone();
            Box::pin(async move { Ok(head) })
        }

        fn sync_worktree<'a>(&'a self, commit: &'a CommitId) -> BoxFuture<'a, Result<(), GitError>> {
            self.calls.lock().unwrap().push(format!("sync {commit}"));
            Box::pin(async { Ok(()) })
        }
    }

    #[tokio::test]
    async fn empty_ref_counts_as_changed() {
        let detector = ChangeDetector::new(Fixed::new("abc123"), "origin", "main");
        let outcome = detector.check_for_change(&RepositoryRef::empty()).await.unwrap();

        assert!(outcome.changed);
        assert_eq!(outcome.new_ref, CommitId::new("abc123"));
        assert_eq!(
            *detector.client().calls.lock().unwrap(),
            vec!["fetch origin main".to_string(), "resolve".to_string()]
        );
    }

    #[tokio::test]
    async fn same_head_is_unchanged() {
        let detector = ChangeDetector::new(Fixed::new("abc123"), "origin", "main");
        let stored = RepositoryRef {
            local: Some(CommitId::new("abc123")),
            remote: Some(CommitId::new("abc123")),
        };
        assert!(!detector.check_for_change(&stored).await.unwrap().changed);
    }

    #[tokio::test]
    async fn fetch_error_propagates_unchanged() {
        let mut client = Fixed::new("abc123");
        let err = GitError::new("fetch", "Could not resolve host");
        client.fetch_error = Some(err.clone());

        let detector = ChangeDetector::new(client, "origin", "main");
        let got = detector.check_for_change(&RepositoryRef::empty()).await.unwrap_err();

        assert_eq!(got, err);
        assert_eq!(detector.client().calls.lock().unwrap().len(), 1);
    }
}
