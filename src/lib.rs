// src/lib.rs

pub mod cli;
pub mod config;
pub mod deploy;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod notify;
pub mod retry;
pub mod types;
pub mod vcs;

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::config::Config;
use crate::deploy::{ComposeRunner, DeploymentExecutor};
use crate::engine::{RuntimeOptions, Supervisor, SupervisorCore, SupervisorExit};
use crate::notify::{FailureEscalator, SendmailNotifier};
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use crate::vcs::{ChangeDetector, GitCli};

/// Supervisor wired to the real git, compose and sendmail clients.
pub type ProductionSupervisor = Supervisor<GitCli, ComposeRunner, SendmailNotifier>;

/// High-level entry point used by `main.rs`.
///
/// Builds the production supervisor from `cfg` and runs it until it
/// terminates on its own or the process receives Ctrl-C / SIGTERM, which
/// counts as a graceful stop.
pub async fn run(cfg: Config, once: bool) -> Result<SupervisorExit> {
    if !cfg.notifications_enabled() {
        warn!("error email sender/recipient not set; failure emails won't be sent");
    }

    info!(
        repo = %cfg.repo_dir.display(),
        remote = %cfg.remote,
        branch = %cfg.branch,
        "starting deployment watcher"
    );

    let mut supervisor = build_supervisor(&cfg, once);

    tokio::select! {
        exit = supervisor.run() => Ok(exit),
        _ = shutdown_signal() => {
            info!("shutdown requested; stopping");
            Ok(SupervisorExit::Graceful)
        }
    }
}

/// Wire the production collaborators according to `cfg`.
pub fn build_supervisor(cfg: &Config, once: bool) -> ProductionSupervisor {
    let sleeper: Arc<dyn Sleeper> = Arc::new(TokioSleeper);

    let detector = ChangeDetector::new(
        GitCli::new(&cfg.repo_dir),
        cfg.remote.clone(),
        cfg.branch.clone(),
    );
    let executor = DeploymentExecutor::new(ComposeRunner::new(
        &cfg.repo_dir,
        cfg.compose_cmd.clone(),
    ));
    let escalator = FailureEscalator::new(
        SendmailNotifier::new(&cfg.sendmail),
        cfg.email_sender.clone(),
        cfg.email_recipient.clone(),
    );
    let policy = RetryPolicy::from_config(cfg, sleeper.clone());
    let options = RuntimeOptions {
        poll_interval: cfg.poll_interval,
        exit_when_idle: once,
    };

    Supervisor::new(
        SupervisorCore::new(cfg.exit_on_max_attempts),
        detector,
        executor,
        escalator,
        policy,
        sleeper,
        options,
    )
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                eprintln!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Simple dry-run output: print the effective configuration.
pub fn print_dry_run(cfg: &Config) {
    println!("watchdeploy dry-run");
    println!("  repo_dir             = {}", cfg.repo_dir.display());
    println!("  remote/branch        = {}/{}", cfg.remote, cfg.branch);
    println!("  interval             = {}s", cfg.poll_interval.as_secs());
    println!("  max_attempts         = {}", cfg.max_attempts);
    println!("  base_delay           = {}s", cfg.base_delay.as_secs());
    match cfg.max_delay {
        Some(d) => println!("  max_delay            = {}s", d.as_secs()),
        None => println!("  max_delay            = (uncapped)"),
    }
    println!("  exit_on_max_attempts = {}", cfg.exit_on_max_attempts);
    println!("  compose_cmd          = {}", cfg.compose_cmd.join(" "));
    println!("  log_file             = {}", cfg.log_file.display());
    if cfg.notifications_enabled() {
        println!(
            "  notify               = {} -> {} via {}",
            cfg.email_sender,
            cfg.email_recipient,
            cfg.sendmail.display()
        );
    } else {
        println!("  notify               = (disabled)");
    }
}
