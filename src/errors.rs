// src/errors.rs

//! Crate-wide error types.
//!
//! [`WatchdeployError`] covers startup concerns (configuration, log file,
//! TOML). The remaining types are the supervision taxonomy: collaborator
//! failures that the retry policy may retry, and the exhaustion wrapper the
//! supervisor reacts to.

use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchdeployError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WatchdeployError>;

/// Failure of a source-control operation (fetch, resolve, sync).
///
/// Network, authentication and missing-ref failures all surface here; the
/// message carries whatever the client reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("git {command} failed: {message}")]
pub struct GitError {
    pub command: String,
    pub message: String,
}

impl GitError {
    pub fn new(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            message: message.into(),
        }
    }
}

/// Failure reported by a workload runner step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{step} failed: {message}")]
pub struct RunnerError {
    pub step: String,
    pub message: String,
}

impl RunnerError {
    pub fn new(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            message: message.into(),
        }
    }
}

/// Stage of a deployment attempt that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStage {
    Checkout,
    Build,
    Up,
}

impl fmt::Display for DeployStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeployStage::Checkout => "checkout",
            DeployStage::Build => "build",
            DeployStage::Up => "up",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("deploy stage '{stage}' failed: {message}")]
pub struct DeployError {
    pub stage: DeployStage,
    pub message: String,
}

impl DeployError {
    pub fn new(stage: DeployStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

/// The retry budget was consumed without a single success.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("gave up after {attempts_used} attempt(s): {last_error}")]
pub struct ExhaustedError<E> {
    pub last_error: E,
    pub attempts_used: u32,
}

/// Mail transport failure. Never fatal to the supervisor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("notification failed: {0}")]
pub struct NotificationError(pub String);
