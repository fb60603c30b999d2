// src/engine/core.rs

//! Pure supervisor state machine.
//!
//! [`SupervisorCore`] consumes the results of retried operations and decides
//! the next [`Phase`], whether to escalate, and how the stored
//! [`RepositoryRef`] moves. It has no Tokio types, performs no IO and never
//! sleeps, so every transition is unit tested directly.
//!
//! The async shell ([`crate::engine::runtime::Supervisor`]) runs the
//! operations and feeds their results in here.

use crate::errors::{DeployError, ExhaustedError, GitError};
use crate::retry::Retried;
use crate::types::{CommitId, NotificationEvent, Operation, RepositoryRef};
use crate::vcs::ChangeOutcome;

use super::Phase;

/// Decision returned by the core after one operation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    pub next: Phase,
    /// Present exactly when the operation exhausted its retries.
    pub escalation: Option<NotificationEvent>,
}

#[derive(Debug, Clone)]
pub struct SupervisorCore {
    repo_ref: RepositoryRef,
    exit_on_max_attempts: bool,
}

impl SupervisorCore {
    /// Start with an empty [`RepositoryRef`], which forces an initial deploy.
    pub fn new(exit_on_max_attempts: bool) -> Self {
        Self::with_ref(RepositoryRef::empty(), exit_on_max_attempts)
    }

    pub fn with_ref(repo_ref: RepositoryRef, exit_on_max_attempts: bool) -> Self {
        Self {
            repo_ref,
            exit_on_max_attempts,
        }
    }

    pub fn repo_ref(&self) -> &RepositoryRef {
        &self.repo_ref
    }

    /// Result of the retried change check.
    ///
    /// Records the remote head on success. A change moves to `Deploying`;
    /// no change goes back to `Idle`.
    pub fn on_check(
        &mut self,
        result: Result<Retried<ChangeOutcome>, ExhaustedError<GitError>>,
    ) -> CoreStep {
        match result {
            Ok(Retried { value: outcome, .. }) => {
                self.repo_ref.remote = Some(outcome.new_ref.clone());
                let next = if outcome.changed {
                    Phase::Deploying {
                        target: outcome.new_ref,
                    }
                } else {
                    Phase::Idle
                };
                CoreStep {
                    next,
                    escalation: None,
                }
            }
            Err(exhausted) => self.exhausted(Operation::Fetch, exhausted),
        }
    }

    /// Result of the retried deployment of `target`.
    ///
    /// Only a success advances the local head; after exhaustion the next
    /// check sees the same difference and deploys `target` again.
    pub fn on_deploy(
        &mut self,
        target: CommitId,
        result: Result<Retried<()>, ExhaustedError<DeployError>>,
    ) -> CoreStep {
        match result {
            Ok(_) => {
                self.repo_ref.local = Some(target);
                CoreStep {
                    next: Phase::Idle,
                    escalation: None,
                }
            }
            Err(exhausted) => self.exhausted(Operation::Deploy, exhausted),
        }
    }

    fn exhausted<E: std::fmt::Display>(
        &self,
        operation: Operation,
        exhausted: ExhaustedError<E>,
    ) -> CoreStep {
        let event = NotificationEvent::new(
            operation,
            exhausted.last_error.to_string(),
            exhausted.attempts_used,
        );
        let next = if self.exit_on_max_attempts {
            Phase::Terminated
        } else {
            Phase::Idle
        };
        CoreStep {
            next,
            escalation: Some(event),
        }
    }
}
