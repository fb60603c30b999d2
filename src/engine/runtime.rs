// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::deploy::{DeploymentExecutor, WorkloadRunner};
use crate::notify::{FailureEscalator, Notifier};
use crate::retry::{RetryPolicy, Sleeper};
use crate::types::{CommitId, NotificationEvent, RepositoryRef};
use crate::vcs::{ChangeDetector, SourceControlClient};

use super::core::{CoreStep, SupervisorCore};
use super::{Phase, RuntimeOptions, SupervisorExit};

/// Drives the supervision loop.
///
/// This is the IO shell around [`SupervisorCore`]: it sleeps, runs the
/// retried operations, hands their results to the core, and escalates when
/// the core says so. Everything runs sequentially on the calling task.
pub struct Supervisor<S, W, N> {
    core: SupervisorCore,
    detector: ChangeDetector<S>,
    executor: DeploymentExecutor<W>,
    escalator: FailureEscalator<N>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    options: RuntimeOptions,
    phase: Phase,
    cycle_failed: bool,
}

impl<S, W, N> fmt::Debug for Supervisor<S, W, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("core", &self.core)
            .field("phase", &self.phase)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<S, W, N> Supervisor<S, W, N>
where
    S: SourceControlClient,
    W: WorkloadRunner,
    N: Notifier,
{
    pub fn new(
        core: SupervisorCore,
        detector: ChangeDetector<S>,
        executor: DeploymentExecutor<W>,
        escalator: FailureEscalator<N>,
        policy: RetryPolicy,
        sleeper: Arc<dyn Sleeper>,
        options: RuntimeOptions,
    ) -> Self {
        // A single `--once` cycle starts checking right away; the long-running
        // loop enters through `Idle`.
        let phase = if options.exit_when_idle {
            Phase::Checking
        } else {
            Phase::Idle
        };

        Self {
            core,
            detector,
            executor,
            escalator,
            policy,
            sleeper,
            options,
            phase,
            cycle_failed: false,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn repo_ref(&self) -> &RepositoryRef {
        self.core.repo_ref()
    }

    /// Main loop.
    ///
    /// Returns only on `Terminated`, or after one cycle in `--once` mode.
    /// Shutdown on a signal is handled by the caller dropping this future.
    pub async fn run(&mut self) -> SupervisorExit {
        info!(
            interval = ?self.options.poll_interval,
            max_attempts = self.policy.max_attempts(),
            base_delay = ?self.policy.base_delay(),
            "supervisor loop started"
        );

        loop {
            match self.phase {
                Phase::Terminated => {
                    error!("maximum attempts reached; exiting");
                    return SupervisorExit::MaxAttemptsExceeded;
                }
                Phase::Idle if self.options.exit_when_idle => {
                    info!("single cycle finished");
                    return if self.cycle_failed {
                        SupervisorExit::MaxAttemptsExceeded
                    } else {
                        SupervisorExit::Graceful
                    };
                }
                _ => self.step().await,
            }
        }
    }

    /// Execute the current phase once and move to the next one.
    pub async fn step(&mut self) {
        let phase = self.phase.clone();
        debug!(?phase, "supervisor step");

        match phase {
            Phase::Idle => {
                self.sleeper.sleep(self.options.poll_interval).await;
                self.cycle_failed = false;
                self.phase = Phase::Checking;
            }
            Phase::Checking => {
                let step = self.check().await;
                self.apply(step).await;
            }
            Phase::Deploying { target } => {
                let step = self.deploy(target).await;
                self.apply(step).await;
            }
            Phase::Terminated => {}
        }
    }

    async fn check(&mut self) -> CoreStep {
        let detector = &self.detector;
        let stored = self.core.repo_ref();

        let result = self
            .policy
            .execute_with_retry("git fetch", move || detector.check_for_change(stored))
            .await;

        if let Ok(retried) = &result {
            if retried.value.changed {
                info!(
                    head = %retried.value.new_ref,
                    previous = ?stored.local.as_ref().map(CommitId::as_str),
                    "changes detected, rebuilding containers"
                );
            } else {
                debug!(head = %retried.value.new_ref, "already up to date");
            }
        }

        self.core.on_check(result)
    }

    async fn deploy(&mut self, target: CommitId) -> CoreStep {
        let detector = &self.detector;
        let executor = &self.executor;
        let commit = &target;

        let result = self
            .policy
            .execute_with_retry("deploy", move || executor.deploy_commit(detector, commit))
            .await;

        if let Ok(retried) = &result {
            info!(
                commit = %target,
                attempts = retried.attempts,
                "deployment succeeded"
            );
        }

        self.core.on_deploy(target, result)
    }

    async fn apply(&mut self, step: CoreStep) {
        if let Some(event) = step.escalation {
            self.cycle_failed = true;
            self.escalate(&event).await;
        }
        self.phase = step.next;
    }

    async fn escalate(&self, event: &NotificationEvent) {
        error!(
            operation = %event.operation,
            attempts = event.attempts,
            error = %event.message,
            "{} failed {} time(s) in a row",
            event.operation,
            event.attempts
        );
        let outcome = self.escalator.escalate(event).await;
        debug!(operation = %event.operation, ?outcome, "escalation finished");
    }
}
