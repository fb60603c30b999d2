use std::fmt;
use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};

/// Boxed future returned by the collaborator traits.
///
/// Same shape as the runtime's executor seam: object-safe, `Send`, and
/// borrowing from `self` for the duration of the call.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Opaque commit identifier. Only ever compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommitId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Last known local (deployed) and remote heads.
///
/// Starts empty, which makes the first check report a change and forces an
/// initial deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryRef {
    pub local: Option<CommitId>,
    pub remote: Option<CommitId>,
}

impl RepositoryRef {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// The two supervised operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Deploy,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Fetch => "fetch",
            Operation::Deploy => "deploy",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Built once retries for an operation are exhausted, then handed to the
/// escalator exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub operation: Operation,
    pub message: String,
    pub attempts: u32,
    pub timestamp: DateTime<Utc>,
}

impl NotificationEvent {
    pub fn new(operation: Operation, message: impl Into<String>, attempts: u32) -> Self {
        Self {
            operation,
            message: message.into(),
            attempts,
            timestamp: Utc::now(),
        }
    }
}
