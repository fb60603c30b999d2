// src/vcs/git.rs

use std::path::PathBuf;

use tracing::debug;

use crate::errors::GitError;
use crate::exec::run_command;
use crate::types::{BoxFuture, CommitId};
use crate::vcs::SourceControlClient;

/// `git` command-line client operating on one working tree.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo_dir: PathBuf,
}

impl GitCli {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }

    async fn git(&self, subcommand: &str, args: &[&str]) -> Result<String, GitError> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(subcommand);
        full.extend_from_slice(args);

        let output = run_command("git", full.as_slice(), Some(&self.repo_dir), None)
            .await
            .map_err(|e| GitError::new(subcommand, format!("{e:#}")))?;

        if output.success {
            Ok(output.stdout)
        } else {
            Err(GitError::new(subcommand, output.failure_message()))
        }
    }
}

impl SourceControlClient for GitCli {
    fn fetch<'a>(&'a self, remote: &'a str, branch: &'a str) -> BoxFuture<'a, Result<(), GitError>> {
        Box::pin(async move {
            self.git("fetch", &[remote, branch]).await?;
            Ok(())
        })
    }

    fn resolve_remote_head<'a>(
        &'a self,
        remote: &'a str,
        branch: &'a str,
    ) -> BoxFuture<'a, Result<CommitId, GitError>> {
        Box::pin(async move {
            let tracking = format!("refs/remotes/{remote}/{branch}");
            let stdout = self
                .git("rev-parse", &["--verify", "--quiet", tracking.as_str()])
                .await?;
            parse_rev(&stdout).ok_or_else(|| {
                GitError::new("rev-parse", format!("no commit id printed for {tracking}"))
            })
        })
    }

    fn sync_worktree<'a>(&'a self, commit: &'a CommitId) -> BoxFuture<'a, Result<(), GitError>> {
        Box::pin(async move {
            debug!(commit = %commit, "fast-forwarding working tree");
            self.git("merge", &["--ff-only", commit.as_str()]).await?;
            Ok(())
        })
    }
}

fn parse_rev(stdout: &str) -> Option<CommitId> {
    stdout
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(CommitId::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rev_takes_first_non_empty_line() {
        assert_eq!(parse_rev("\nabc123\n"), Some(CommitId::new("abc123")));
        assert_eq!(parse_rev("  \n"), None);
    }

    #[tokio::test]
    async fn missing_repo_dir_surfaces_git_error() {
        let git = GitCli::new("/definitely/not/a/repo/dir");
        let err = git.fetch("origin", "main").await.unwrap_err();
        assert_eq!(err.command, "fetch");
        assert!(!err.message.is_empty());
    }

    #[cfg(unix)]
    mod repo {
        use std::path::Path;
        use std::process::Command;

        use super::*;
        use crate::types::RepositoryRef;
        use crate::vcs::ChangeDetector;

        fn git(dir: &Path, args: &[&str]) -> String {
            let out = Command::new("git")
                .args([
                    "-c",
                    "user.name=watchdeploy",
                    "-c",
                    "user.email=watchdeploy@example.com",
                    "-c",
                    "commit.gpgsign=false",
                ])
                .args(args)
                .current_dir(dir)
                .output()
                .unwrap();
            assert!(
                out.status.success(),
                "git {args:?} failed: {}",
                String::from_utf8_lossy(&out.stderr)
            );
            String::from_utf8(out.stdout).unwrap().trim().to_string()
        }

        /// Upstream repo with one commit on `main`, plus a clone of it.
        fn upstream_and_clone(root: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
            let upstream = root.join("upstream");
            let clone = root.join("clone");
            std::fs::create_dir(&upstream).unwrap();
            git(&upstream, &["init", "-q", "-b", "main"]);
            git(&upstream, &["commit", "-q", "--allow-empty", "-m", "first"]);
            git(
                root,
                &["clone", "-q", upstream.to_str().unwrap(), clone.to_str().unwrap()],
            );
            (upstream, clone)
        }

        #[tokio::test]
        async fn detects_upstream_commit_and_fast_forwards_clone() {
            let tmp = tempfile::tempdir().unwrap();
            let (upstream, clone) = upstream_and_clone(tmp.path());
            let deployed = CommitId::new(git(&clone, &["rev-parse", "HEAD"]));

            git(&upstream, &["commit", "-q", "--allow-empty", "-m", "second"]);
            let upstream_head = CommitId::new(git(&upstream, &["rev-parse", "HEAD"]));
            assert_ne!(deployed, upstream_head);

            let detector = ChangeDetector::new(GitCli::new(&clone), "origin", "main");
            let stored = RepositoryRef {
                local: Some(deployed),
                remote: None,
            };

            let outcome = detector.check_for_change(&stored).await.unwrap();
            assert!(outcome.changed);
            assert_eq!(outcome.new_ref, upstream_head);

            detector.sync_worktree(&outcome.new_ref).await.unwrap();
            assert_eq!(git(&clone, &["rev-parse", "HEAD"]), upstream_head.as_str());
        }

        #[tokio::test]
        async fn unchanged_upstream_reports_no_change() {
            let tmp = tempfile::tempdir().unwrap();
            let (_upstream, clone) = upstream_and_clone(tmp.path());
            let head = CommitId::new(git(&clone, &["rev-parse", "HEAD"]));

            let detector = ChangeDetector::new(GitCli::new(&clone), "origin", "main");
            let stored = RepositoryRef {
                local: Some(head.clone()),
                remote: Some(head.clone()),
            };

            let outcome = detector.check_for_change(&stored).await.unwrap();
            assert!(!outcome.changed);
            assert_eq!(outcome.new_ref, head);
        }

        #[tokio::test]
        async fn unknown_branch_fails_in_fetch() {
            let tmp = tempfile::tempdir().unwrap();
            let (_upstream, clone) = upstream_and_clone(tmp.path());

            let err = GitCli::new(&clone).fetch("origin", "nope").await.unwrap_err();
            assert_eq!(err.command, "fetch");
            assert!(err.message.contains("nope"), "{}", err.message);
        }
    }
}
