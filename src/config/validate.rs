// src/config/validate.rs

use crate::config::model::{Config, RawConfig};
use crate::errors::{Result, WatchdeployError};

impl TryFrom<RawConfig> for Config {
    type Error = crate::errors::WatchdeployError;

    fn try_from(raw: RawConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(Config::new_unchecked(raw))
    }
}

/// Check the invariants a [`Config`] must uphold.
pub fn validate_raw_config(cfg: &RawConfig) -> Result<()> {
    validate_retry_budget(cfg)?;
    validate_polling(cfg)?;
    validate_target(cfg)?;
    Ok(())
}

fn validate_retry_budget(cfg: &RawConfig) -> Result<()> {
    if cfg.max_attempts == 0 {
        return Err(WatchdeployError::ConfigError(
            "max_attempts must be >= 1 (got 0)".to_string(),
        ));
    }

    // base_delay is unsigned, so >= 0 holds by construction.
    if let Some(max_delay) = cfg.max_delay_secs {
        if max_delay < cfg.base_delay_secs {
            return Err(WatchdeployError::ConfigError(format!(
                "max_delay ({max_delay}s) must be >= base_delay ({}s)",
                cfg.base_delay_secs
            )));
        }
    }

    Ok(())
}

fn validate_polling(cfg: &RawConfig) -> Result<()> {
    if cfg.interval_secs == 0 {
        return Err(WatchdeployError::ConfigError(
            "interval must be > 0 seconds (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_target(cfg: &RawConfig) -> Result<()> {
    if cfg.branch.trim().is_empty() {
        return Err(WatchdeployError::ConfigError(
            "branch must not be empty".to_string(),
        ));
    }
    if cfg.remote.trim().is_empty() {
        return Err(WatchdeployError::ConfigError(
            "remote must not be empty".to_string(),
        ));
    }
    if cfg.compose_cmd.split_whitespace().next().is_none() {
        return Err(WatchdeployError::ConfigError(
            "compose_cmd must name a program".to_string(),
        ));
    }
    Ok(())
}
