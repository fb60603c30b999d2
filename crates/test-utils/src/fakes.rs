use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use watchdeploy::deploy::WorkloadRunner;
use watchdeploy::errors::{GitError, NotificationError, RunnerError};
use watchdeploy::notify::Notifier;
use watchdeploy::retry::Sleeper;
use watchdeploy::types::{BoxFuture, CommitId};
use watchdeploy::vcs::SourceControlClient;

/// Scripted git client.
///
/// - `fetch` pops the next scripted result (defaults to `Ok`).
/// - `resolve_remote_head` returns the current head.
/// - every call is appended to `calls()`.
///
/// Clones share state, so a test can keep a handle after moving one into the
/// supervisor.
#[derive(Clone, Default)]
pub struct FakeGit {
    head: Arc<Mutex<Option<CommitId>>>,
    fetch_results: Arc<Mutex<VecDeque<Result<(), GitError>>>>,
    sync_results: Arc<Mutex<VecDeque<Result<(), GitError>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeGit {
    pub fn with_head(head: &str) -> Self {
        let git = Self::default();
        git.set_head(head);
        git
    }

    pub fn set_head(&self, head: &str) {
        *self.head.lock().unwrap() = Some(CommitId::new(head));
    }

    /// Make the next `n` fetches fail with `message`.
    pub fn fail_fetches(&self, n: usize, message: &str) {
        let mut q = self.fetch_results.lock().unwrap();
        for _ in 0..n {
            q.push_back(Err(GitError::new("fetch", message)));
        }
    }

    pub fn fail_syncs(&self, n: usize, message: &str) {
        let mut q = self.sync_results.lock().unwrap();
        for _ in 0..n {
            q.push_back(Err(GitError::new("merge", message)));
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl SourceControlClient for FakeGit {
    fn fetch<'a>(&'a self, remote: &'a str, branch: &'a str) -> BoxFuture<'a, Result<(), GitError>> {
        self.record(format!("fetch {remote} {branch}"));
        let res = self.fetch_results.lock().unwrap().pop_front().unwrap_or(Ok(()));
        Box::pin(async move { res })
    }

    fn resolve_remote_head<'a>(
        &'a self,
        remote: &'a str,
        branch: &'a str,
    ) -> BoxFuture<'a, Result<CommitId, GitError>> {
        self.record(format!("resolve {remote} {branch}"));
        let res = self
            .head
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| GitError::new("rev-parse", "unknown revision"));
        Box::pin(async move { res })
    }

    fn sync_worktree<'a>(&'a self, commit: &'a CommitId) -> BoxFuture<'a, Result<(), GitError>> {
        self.record(format!("sync {commit}"));
        let res = self.sync_results.lock().unwrap().pop_front().unwrap_or(Ok(()));
        Box::pin(async move { res })
    }
}

/// Scripted workload runner; same sharing semantics as [`FakeGit`].
#[derive(Clone, Default)]
pub struct FakeRunner {
    build_results: Arc<Mutex<VecDeque<Result<(), RunnerError>>>>,
    up_results: Arc<Mutex<VecDeque<Result<(), RunnerError>>>>,
    always_fail_build: Arc<Mutex<Option<String>>>,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl FakeRunner {
    pub fn fail_builds(&self, n: usize, message: &str) {
        let mut q = self.build_results.lock().unwrap();
        for _ in 0..n {
            q.push_back(Err(RunnerError::new("build", message)));
        }
    }

    pub fn fail_ups(&self, n: usize, message: &str) {
        let mut q = self.up_results.lock().unwrap();
        for _ in 0..n {
            q.push_back(Err(RunnerError::new("up", message)));
        }
    }

    /// Every build fails with `message` until cleared with `None`.
    pub fn set_build_broken(&self, message: Option<&str>) {
        *self.always_fail_build.lock().unwrap() = message.map(str::to_string);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn builds(&self) -> usize {
        self.calls().iter().filter(|c| **c == "build").count()
    }

    pub fn ups(&self) -> usize {
        self.calls().iter().filter(|c| **c == "up").count()
    }
}

impl WorkloadRunner for FakeRunner {
    fn build(&self) -> BoxFuture<'_, Result<(), RunnerError>> {
        self.calls.lock().unwrap().push("build");
        let broken = self.always_fail_build.lock().unwrap().clone();
        let res = match broken {
            Some(msg) => Err(RunnerError::new("build", msg)),
            None => self.build_results.lock().unwrap().pop_front().unwrap_or(Ok(())),
        };
        Box::pin(async move { res })
    }

    fn up(&self) -> BoxFuture<'_, Result<(), RunnerError>> {
        self.calls.lock().unwrap().push("up");
        let res = self.up_results.lock().unwrap().pop_front().unwrap_or(Ok(()));
        Box::pin(async move { res })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Notifier that records mails, optionally failing every send.
#[derive(Clone, Default)]
pub struct FakeNotifier {
    sent: Arc<Mutex<Vec<SentMail>>>,
    attempts: Arc<Mutex<usize>>,
    fail_with: Arc<Mutex<Option<String>>>,
}

impl FakeNotifier {
    pub fn failing(message: &str) -> Self {
        let n = Self::default();
        *n.fail_with.lock().unwrap() = Some(message.to_string());
        n
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    /// Calls to `send`, successful or not.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

impl Notifier for FakeNotifier {
    fn send<'a>(
        &'a self,
        sender: &'a str,
        recipient: &'a str,
        subject: &'a str,
        body: &'a str,
    ) -> BoxFuture<'a, Result<(), NotificationError>> {
        *self.attempts.lock().unwrap() += 1;
        let res = match self.fail_with.lock().unwrap().clone() {
            Some(msg) => Err(NotificationError(msg)),
            None => {
                self.sent.lock().unwrap().push(SentMail {
                    sender: sender.to_string(),
                    recipient: recipient.to_string(),
                    subject: subject.to_string(),
                    body: body.to_string(),
                });
                Ok(())
            }
        };
        Box::pin(async move { res })
    }
}

/// Sleeper that records every requested duration and returns immediately.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
        self.slept.lock().unwrap().push(duration);
        Box::pin(async {})
    }
}
