// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_REPO_DIR: &str = "/app/repo";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_LOG_FILE: &str = "/app/error.log";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BASE_DELAY_SECS: u64 = 2;
pub const DEFAULT_COMPOSE_CMD: &str = "docker-compose";
pub const DEFAULT_SENDMAIL: &str = "/usr/sbin/sendmail";

/// Optional TOML file layer.
///
/// Every key is optional; anything missing falls through to the built-in
/// default. Keys use the same names as the long CLI flags, with underscores:
///
/// ```toml
/// repo_dir = "/srv/app"
/// branch = "release"
/// interval = 30
/// max_attempts = 3
/// error_email_recipient = "ops@example.com"
/// error_email_sender = "deploy@example.com"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub repo_dir: Option<PathBuf>,
    pub branch: Option<String>,
    pub remote: Option<String>,
    pub interval: Option<u64>,
    pub error_email_recipient: Option<String>,
    pub error_email_sender: Option<String>,
    pub log_file: Option<PathBuf>,
    pub exit_on_max_attempts: Option<bool>,
    pub max_attempts: Option<u32>,
    pub base_delay: Option<u64>,
    pub max_delay: Option<u64>,
    pub compose_cmd: Option<String>,
    pub sendmail: Option<PathBuf>,
}

/// Fully merged settings that have not been validated yet.
///
/// Produced by [`crate::config::loader::merge`]; turn it into a [`Config`]
/// with `Config::try_from`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawConfig {
    pub repo_dir: PathBuf,
    pub branch: String,
    pub remote: String,
    pub interval_secs: u64,
    pub error_email_recipient: String,
    pub error_email_sender: String,
    pub log_file: PathBuf,
    pub exit_on_max_attempts: bool,
    pub max_attempts: u32,
    pub base_delay_secs: u64,
    pub max_delay_secs: Option<u64>,
    pub compose_cmd: String,
    pub sendmail: PathBuf,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            repo_dir: PathBuf::from(DEFAULT_REPO_DIR),
            branch: DEFAULT_BRANCH.to_string(),
            remote: DEFAULT_REMOTE.to_string(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            error_email_recipient: String::new(),
            error_email_sender: String::new(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            exit_on_max_attempts: false,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_secs: DEFAULT_BASE_DELAY_SECS,
            max_delay_secs: None,
            compose_cmd: DEFAULT_COMPOSE_CMD.to_string(),
            sendmail: PathBuf::from(DEFAULT_SENDMAIL),
        }
    }
}

/// Validated, immutable configuration shared by every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub repo_dir: PathBuf,
    pub branch: String,
    pub remote: String,
    pub poll_interval: Duration,
    pub email_recipient: String,
    pub email_sender: String,
    pub log_file: PathBuf,
    pub exit_on_max_attempts: bool,
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Option<Duration>,
    /// Program followed by its leading arguments, e.g. `["docker", "compose"]`.
    pub compose_cmd: Vec<String>,
    pub sendmail: PathBuf,
}

impl Config {
    /// Mail goes out only when both addresses are set.
    pub fn notifications_enabled(&self) -> bool {
        !self.email_sender.trim().is_empty() && !self.email_recipient.trim().is_empty()
    }

    /// Skip validation. Only for callers that already hold checked values.
    pub(crate) fn new_unchecked(raw: RawConfig) -> Self {
        Self {
            repo_dir: raw.repo_dir,
            branch: raw.branch,
            remote: raw.remote,
            poll_interval: Duration::from_secs(raw.interval_secs),
            email_recipient: raw.error_email_recipient,
            email_sender: raw.error_email_sender,
            log_file: raw.log_file,
            exit_on_max_attempts: raw.exit_on_max_attempts,
            max_attempts: raw.max_attempts,
            base_delay: Duration::from_secs(raw.base_delay_secs),
            max_delay: raw.max_delay_secs.map(Duration::from_secs),
            compose_cmd: raw
                .compose_cmd
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            sendmail: raw.sendmail,
        }
    }
}
