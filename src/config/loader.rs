// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::cli::CliArgs;
use crate::config::model::{Config, FileConfig, RawConfig};
use crate::errors::Result;

/// Load the optional TOML layer from `path`.
///
/// Only deserializes; semantic checks happen when the merged [`RawConfig`]
/// is converted into a [`Config`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<FileConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: FileConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Merge CLI/env values over the file layer over built-in defaults.
///
/// clap has already resolved flag-over-env, so a `Some` in `cli` wins.
pub fn merge(cli: &CliArgs, file: FileConfig) -> RawConfig {
    let defaults = RawConfig::default();

    RawConfig {
        repo_dir: cli
            .repo_dir
            .clone()
            .or(file.repo_dir)
            .unwrap_or(defaults.repo_dir),
        branch: cli.branch.clone().or(file.branch).unwrap_or(defaults.branch),
        remote: cli.remote.clone().or(file.remote).unwrap_or(defaults.remote),
        interval_secs: cli
            .interval
            .or(file.interval)
            .unwrap_or(defaults.interval_secs),
        error_email_recipient: cli
            .error_email_recipient
            .clone()
            .or(file.error_email_recipient)
            .unwrap_or(defaults.error_email_recipient),
        error_email_sender: cli
            .error_email_sender
            .clone()
            .or(file.error_email_sender)
            .unwrap_or(defaults.error_email_sender),
        log_file: cli
            .log_file
            .clone()
            .or(file.log_file)
            .unwrap_or(defaults.log_file),
        exit_on_max_attempts: cli
            .exit_on_max_attempts
            .or(file.exit_on_max_attempts)
            .unwrap_or(defaults.exit_on_max_attempts),
        max_attempts: cli
            .max_attempts
            .or(file.max_attempts)
            .unwrap_or(defaults.max_attempts),
        base_delay_secs: cli
            .base_delay
            .or(file.base_delay)
            .unwrap_or(defaults.base_delay_secs),
        max_delay_secs: cli.max_delay.or(file.max_delay),
        compose_cmd: cli
            .compose_cmd
            .clone()
            .or(file.compose_cmd)
            .unwrap_or(defaults.compose_cmd),
        sendmail: cli
            .sendmail
            .clone()
            .or(file.sendmail)
            .unwrap_or(defaults.sendmail),
    }
}

/// Build the validated [`Config`] for this process.
///
/// This is the recommended entry point for the rest of the application:
/// reads `--config` if given, merges, then validates.
pub fn load_and_validate(cli: &CliArgs) -> Result<Config> {
    let file = match cli.config.as_deref() {
        Some(path) => load_from_path(path)?,
        None => FileConfig::default(),
    };
    let raw = merge(cli, file);
    Config::try_from(raw)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn cli_wins_over_file_and_file_over_defaults() {
        let cli = CliArgs {
            branch: Some("hotfix".to_string()),
            ..CliArgs::default()
        };
        let file = FileConfig {
            branch: Some("release".to_string()),
            remote: Some("upstream".to_string()),
            ..FileConfig::default()
        };

        let raw = merge(&cli, file);
        assert_eq!(raw.branch, "hotfix");
        assert_eq!(raw.remote, "upstream");
        assert_eq!(raw.repo_dir, PathBuf::from("/app/repo"));
        assert_eq!(raw.max_delay_secs, None);
    }

    #[test]
    fn empty_inputs_yield_defaults() {
        let raw = merge(&CliArgs::default(), FileConfig::default());
        assert_eq!(raw, RawConfig::default());
    }
}
