// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every supervision setting can come from a flag or from its environment
//! variable; clap resolves flag-over-env. Settings left unset here fall back
//! to the optional `--config` file and then to built-in defaults (see
//! [`crate::config::loader::resolve`]).

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, ValueEnum};

/// Command-line arguments for `watchdeploy`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "watchdeploy",
    version,
    about = "Poll a git branch and rebuild/restart a compose project when it moves.",
    long_about = None
)]
pub struct CliArgs {
    /// Optional TOML file providing defaults for any setting below.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Working tree of the repository to deploy.
    #[arg(long, env = "REPO_DIR", value_name = "PATH")]
    pub repo_dir: Option<PathBuf>,

    /// Branch to follow.
    #[arg(long, env = "BRANCH")]
    pub branch: Option<String>,

    /// Remote to fetch from.
    #[arg(long, env = "REMOTE")]
    pub remote: Option<String>,

    /// Seconds between polls.
    #[arg(long, env = "INTERVAL", value_name = "SECS")]
    pub interval: Option<u64>,

    /// Address that receives failure mails. Empty disables mail.
    #[arg(long, env = "ERROR_EMAIL_RECIPIENT", value_name = "ADDR")]
    pub error_email_recipient: Option<String>,

    /// From-address of failure mails. Empty disables mail.
    #[arg(long, env = "ERROR_EMAIL_SENDER", value_name = "ADDR")]
    pub error_email_sender: Option<String>,

    /// File that receives one line per warning/error event.
    #[arg(long, env = "LOG_FILE", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Exit with a non-zero status once an operation exhausts its retries.
    #[arg(
        long,
        env = "EXIT_ON_MAX_ATTEMPTS",
        value_name = "BOOL",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub exit_on_max_attempts: Option<bool>,

    /// Attempts per operation before escalating.
    #[arg(long, env = "MAX_ATTEMPTS", value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Backoff base in seconds; retry `n` waits `base * 2^n`.
    #[arg(long, env = "BASE_DELAY", value_name = "SECS")]
    pub base_delay: Option<u64>,

    /// Optional ceiling for a single backoff sleep, in seconds.
    #[arg(long, env = "MAX_DELAY", value_name = "SECS")]
    pub max_delay: Option<u64>,

    /// Compose invocation, split on whitespace (e.g. "docker compose").
    #[arg(long, env = "COMPOSE_CMD", value_name = "CMD")]
    pub compose_cmd: Option<String>,

    /// sendmail-compatible program used for failure mails.
    #[arg(long, env = "SENDMAIL", value_name = "PATH")]
    pub sendmail: Option<PathBuf>,

    /// Run a single check/deploy cycle and exit.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WATCHDEPLOY_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate and print the effective configuration without running.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse_into_options() {
        let args = CliArgs::try_parse_from([
            "watchdeploy",
            "--branch",
            "release",
            "--max-attempts",
            "3",
            "--exit-on-max-attempts",
        ])
        .unwrap();

        assert_eq!(args.branch.as_deref(), Some("release"));
        assert_eq!(args.max_attempts, Some(3));
        assert_eq!(args.exit_on_max_attempts, Some(true));
        assert!(!args.once);
    }

    #[test]
    fn exit_flag_accepts_explicit_false() {
        let args =
            CliArgs::try_parse_from(["watchdeploy", "--exit-on-max-attempts", "false"]).unwrap();
        assert_eq!(args.exit_on_max_attempts, Some(false));
    }

    #[test]
    fn negative_interval_is_rejected() {
        let res = CliArgs::try_parse_from(["watchdeploy", "--interval", "-5"]);
        assert!(res.is_err());
    }
}
