// src/retry/policy.rs

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::ExhaustedError;
use crate::retry::sleeper::Sleeper;

/// Successful result of a retried operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retried<T> {
    pub value: T,
    /// Attempts consumed, including the successful one.
    pub attempts: u32,
}

/// What the caller should do after a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision<E> {
    /// Sleep for this long, then try again.
    Retry(Duration),
    /// Budget consumed; stop.
    Exhausted(ExhaustedError<E>),
}

/// Accounting for one attempt sequence.
///
/// Created fresh for every sequence and dropped on success or exhaustion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryState {
    attempts: u32,
    last_error: Option<String>,
    next_delay: Option<Duration>,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn next_delay(&self) -> Option<Duration> {
        self.next_delay
    }

    /// Count a successful attempt and return the total consumed.
    pub fn record_success(&mut self) -> u32 {
        self.attempts += 1;
        self.next_delay = None;
        self.attempts
    }

    /// Count a failed attempt and decide between backing off and giving up.
    pub fn record_failure<E: fmt::Display>(
        &mut self,
        policy: &RetryPolicy,
        err: E,
    ) -> RetryDecision<E> {
        let attempt_index = self.attempts;
        self.attempts += 1;
        self.last_error = Some(err.to_string());

        if self.attempts < policy.max_attempts() {
            let delay = policy.delay_for_attempt(attempt_index);
            self.next_delay = Some(delay);
            RetryDecision::Retry(delay)
        } else {
            self.next_delay = None;
            RetryDecision::Exhausted(ExhaustedError {
                last_error: err,
                attempts_used: self.attempts,
            })
        }
    }
}

/// Bounded retries with `base_delay * 2^n` backoff.
///
/// No jitter. Delays grow without bound unless a `max_delay` ceiling is set;
/// the arithmetic saturates at `Duration::MAX` instead of overflowing.
#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Option<Duration>,
    sleeper: Arc<dyn Sleeper>,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish_non_exhaustive()
    }
}

impl RetryPolicy {
    /// `max_attempts` of 0 is treated as 1: the operation always runs once.
    pub fn new(max_attempts: u32, base_delay: Duration, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: None,
            sleeper,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Option<Duration>) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn from_config(cfg: &Config, sleeper: Arc<dyn Sleeper>) -> Self {
        Self::new(cfg.max_attempts, cfg.base_delay, sleeper).with_max_delay(cfg.max_delay)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Delay before attempt `attempt_index + 1`, i.e. after the failure of
    /// zero-based attempt `attempt_index`.
    pub fn delay_for_attempt(&self, attempt_index: u32) -> Duration {
        let delay = if self.base_delay.is_zero() {
            Duration::ZERO
        } else {
            2u32.checked_pow(attempt_index)
                .and_then(|factor| self.base_delay.checked_mul(factor))
                .unwrap_or(Duration::MAX)
        };

        match self.max_delay {
            Some(ceiling) => delay.min(ceiling),
            None => delay,
        }
    }

    /// Run `operation` until it succeeds or the budget is spent.
    ///
    /// The only blocking point is the backoff sleep between attempts; there
    /// is no sleep after the final failure.
    pub async fn execute_with_retry<T, E, F, Fut>(
        &self,
        task_name: &str,
        mut operation: F,
    ) -> std::result::Result<Retried<T>, ExhaustedError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: fmt::Display,
    {
        let mut state = RetryState::new();

        loop {
            match operation().await {
                Ok(value) => {
                    let attempts = state.record_success();
                    if attempts > 1 {
                        info!(task = task_name, attempts, "{task_name} succeeded after retrying");
                    }
                    return Ok(Retried { value, attempts });
                }
                Err(err) => {
                    warn!(
                        task = task_name,
                        attempt = state.attempts() + 1,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "{task_name} failed (attempt {}/{})",
                        state.attempts() + 1,
                        self.max_attempts
                    );

                    match state.record_failure(self, err) {
                        RetryDecision::Retry(delay) => {
                            debug!(task = task_name, ?delay, "backing off before next attempt");
                            self.sleeper.sleep(delay).await;
                        }
                        RetryDecision::Exhausted(exhausted) => return Err(exhausted),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::types::BoxFuture;

    #[derive(Default)]
    struct Recorder {
        slept: Mutex<Vec<Duration>>,
    }

    impl Sleeper for Recorder {
        fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
            self.slept.lock().unwrap().push(duration);
            Box::pin(async {})
        }
    }

    fn policy(max: u32, base_secs: u64) -> (RetryPolicy, Arc<Recorder>) {
        let rec = Arc::new(Recorder::default());
        let p = RetryPolicy::new(max, Duration::from_secs(base_secs), rec.clone());
        (p, rec)
    }

    #[test]
    fn delay_doubles_from_base() {
        let (p, _) = policy(5, 2);
        assert_eq!(p.delay_for_attempt(0), Duration::from_secs(2));
        assert_eq!(p.delay_for_attempt(1), Duration::from_secs(4));
        assert_eq!(p.delay_for_attempt(2), Duration::from_secs(8));
    }

    #[test]
    fn delay_saturates_instead_of_overflowing() {
        let (p, _) = policy(100, 2);
        assert_eq!(p.delay_for_attempt(64), Duration::MAX);
    }

    #[test]
    fn ceiling_caps_delay() {
        let (p, _) = policy(10, 2);
        let p = p.with_max_delay(Some(Duration::from_secs(5)));
        assert_eq!(p.delay_for_attempt(0), Duration::from_secs(2));
        assert_eq!(p.delay_for_attempt(3), Duration::from_secs(5));
    }

    #[test]
    fn state_tracks_failures_until_exhausted() {
        let (p, _) = policy(2, 1);
        let mut state = RetryState::new();

        assert_eq!(
            state.record_failure(&p, "boom"),
            RetryDecision::Retry(Duration::from_secs(1))
        );
        assert_eq!(state.last_error(), Some("boom"));
        assert_eq!(state.next_delay(), Some(Duration::from_secs(1)));

        match state.record_failure(&p, "bang") {
            RetryDecision::Exhausted(e) => {
                assert_eq!(e.last_error, "bang");
                assert_eq!(e.attempts_used, 2);
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert_eq!(state.next_delay(), None);
    }

    #[tokio::test]
    async fn first_success_returns_immediately() {
        let (p, rec) = policy(3, 2);
        let mut calls = 0;

        let res = p
            .execute_with_retry("noop", || {
                calls += 1;
                async { Ok::<_, String>(42) }
            })
            .await
            .unwrap();

        assert_eq!(res, Retried { value: 42, attempts: 1 });
        assert_eq!(calls, 1);
        assert!(rec.slept.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn succeeds_on_third_attempt() {
        let (p, rec) = policy(5, 1);
        let mut calls = 0u32;

        let res = p
            .execute_with_retry("flaky", || {
                calls += 1;
                let n = calls;
                async move { if n < 3 { Err(format!("fail {n}")) } else { Ok(n) } }
            })
            .await
            .unwrap();

        assert_eq!(res.attempts, 3);
        assert_eq!(
            *rec.slept.lock().unwrap(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test]
    async fn exhaustion_reports_last_error_without_trailing_sleep() {
        let (p, rec) = policy(3, 2);
        let mut calls = 0u32;

        let err = p
            .execute_with_retry("deploy", || {
                calls += 1;
                let n = calls;
                async move { Err::<(), _>(format!("fail {n}")) }
            })
            .await
            .unwrap_err();

        assert_eq!(calls, 3);
        assert_eq!(err.attempts_used, 3);
        assert_eq!(err.last_error, "fail 3");
        assert_eq!(
            *rec.slept.lock().unwrap(),
            vec![Duration::from_secs(2), Duration::from_secs(4)]
        );
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let (p, _) = policy(0, 2);
        let mut calls = 0;
        let err = p
            .execute_with_retry("once", || {
                calls += 1;
                async { Err::<(), _>("nope") }
            })
            .await
            .unwrap_err();
        assert_eq!(calls, 1);
        assert_eq!(err.attempts_used, 1);
    }
}
