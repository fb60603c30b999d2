// src/retry/mod.rs

//! Retry and backoff accounting.
//!
//! - [`policy`] holds the pure delay arithmetic, the per-sequence
//!   [`RetryState`], and the async `execute_with_retry` driver.
//! - [`sleeper`] is the seam through which every wait in the process goes.

pub mod policy;
pub mod sleeper;

pub use policy::{RetryDecision, RetryPolicy, RetryState, Retried};
pub use sleeper::{Sleeper, TokioSleeper};
