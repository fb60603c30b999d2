// src/engine/mod.rs

//! Supervision engine for watchdeploy.
//!
//! The loop cycles through `Idle → Checking → (Deploying | Idle)` and ends
//! in `Terminated` only when an operation exhausts its retries with
//! `exit_on_max_attempts` set.
//!
//! The pure transition logic lives in [`core`]; the async/IO shell that runs
//! the operations, sleeps and escalates is in [`runtime`].

use std::time::Duration;

use crate::types::CommitId;

/// Where the supervisor loop currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Waiting out the poll interval.
    Idle,
    /// Fetching and comparing heads.
    Checking,
    /// Rolling out `target`.
    Deploying { target: CommitId },
    /// Stopped after exhaustion; no further transitions.
    Terminated,
}

/// How the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorExit {
    /// `--once` cycle finished, or the process was asked to stop.
    Graceful,
    /// An operation exhausted its retries.
    MaxAttemptsExceeded,
}

impl SupervisorExit {
    pub fn exit_code(self) -> i32 {
        match self {
            SupervisorExit::Graceful => 0,
            SupervisorExit::MaxAttemptsExceeded => 2,
        }
    }
}

/// Runtime options for the async shell.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    pub poll_interval: Duration,
    /// Run a single check/deploy cycle and stop (used for `--once`).
    pub exit_when_idle: bool,
}

pub mod core;
pub mod runtime;

pub use self::core::{CoreStep, SupervisorCore};
pub use runtime::Supervisor;
