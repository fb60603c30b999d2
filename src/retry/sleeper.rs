// src/retry/sleeper.rs

//! Sleep seam for backoff and poll waits.
//!
//! Production code uses [`TokioSleeper`], a tokio timer that is dropped (and
//! thereby cancelled) when the process shuts down. Tests substitute a sleeper
//! that records the requested durations and returns immediately.

use std::time::Duration;

use crate::types::BoxFuture;

pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}
