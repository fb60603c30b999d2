#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use watchdeploy::config::{Config, RawConfig};
use watchdeploy::deploy::DeploymentExecutor;
use watchdeploy::engine::{RuntimeOptions, Supervisor, SupervisorCore};
use watchdeploy::notify::FailureEscalator;
use watchdeploy::retry::RetryPolicy;
use watchdeploy::vcs::ChangeDetector;

use crate::fakes::{FakeGit, FakeNotifier, FakeRunner, RecordingSleeper};

/// Builder for `Config` to simplify test setup.
pub struct ConfigBuilder {
    raw: RawConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawConfig {
                error_email_sender: "deploy@example.com".to_string(),
                error_email_recipient: "ops@example.com".to_string(),
                ..RawConfig::default()
            },
        }
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.raw.max_attempts = n;
        self
    }

    pub fn base_delay(mut self, secs: u64) -> Self {
        self.raw.base_delay_secs = secs;
        self
    }

    pub fn max_delay(mut self, secs: u64) -> Self {
        self.raw.max_delay_secs = Some(secs);
        self
    }

    pub fn interval(mut self, secs: u64) -> Self {
        self.raw.interval_secs = secs;
        self
    }

    pub fn exit_on_max_attempts(mut self, val: bool) -> Self {
        self.raw.exit_on_max_attempts = val;
        self
    }

    pub fn recipient(mut self, addr: &str) -> Self {
        self.raw.error_email_recipient = addr.to_string();
        self
    }

    pub fn sender(mut self, addr: &str) -> Self {
        self.raw.error_email_sender = addr.to_string();
        self
    }

    pub fn build(self) -> Config {
        Config::try_from(self.raw).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub type FakeSupervisor = Supervisor<FakeGit, FakeRunner, FakeNotifier>;

/// Fake collaborators plus the handles tests inspect afterwards.
#[derive(Clone, Default)]
pub struct Harness {
    pub git: FakeGit,
    pub runner: FakeRunner,
    pub notifier: FakeNotifier,
    pub sleeper: RecordingSleeper,
}

impl Harness {
    pub fn with_head(head: &str) -> Self {
        Self {
            git: FakeGit::with_head(head),
            ..Self::default()
        }
    }

    pub fn policy(&self, cfg: &Config) -> RetryPolicy {
        RetryPolicy::from_config(cfg, Arc::new(self.sleeper.clone()))
    }

    /// Long-running supervisor (starts in `Idle`).
    pub fn supervisor(&self, cfg: &Config) -> FakeSupervisor {
        self.build(cfg, false)
    }

    /// `--once` supervisor (starts in `Checking`, stops when idle).
    pub fn single_cycle(&self, cfg: &Config) -> FakeSupervisor {
        self.build(cfg, true)
    }

    fn build(&self, cfg: &Config, once: bool) -> FakeSupervisor {
        Supervisor::new(
            SupervisorCore::new(cfg.exit_on_max_attempts),
            ChangeDetector::new(self.git.clone(), cfg.remote.clone(), cfg.branch.clone()),
            DeploymentExecutor::new(self.runner.clone()),
            FailureEscalator::new(
                self.notifier.clone(),
                cfg.email_sender.clone(),
                cfg.email_recipient.clone(),
            ),
            self.policy(cfg),
            Arc::new(self.sleeper.clone()),
            RuntimeOptions {
                poll_interval: cfg.poll_interval,
                exit_when_idle: once,
            },
        )
    }
}

pub fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}
