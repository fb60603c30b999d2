//! Shared fakes and builders for watchdeploy integration tests.
//!
//! - [`fakes`]: scripted git client, workload runner, notifier and a
//!   recording sleeper. Clones share state.
//! - [`builders`]: `ConfigBuilder` and a `Harness` that wires the fakes into
//!   a `Supervisor`.

pub mod builders;
pub mod fakes;

pub use builders::{ConfigBuilder, Harness};
pub use fakes::{FakeGit, FakeNotifier, FakeRunner, RecordingSleeper};

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install a test-captured tracing subscriber once per test binary.
///
/// Output shows up only for failing tests (or with `--nocapture`). The level
/// comes from `RUST_LOG`, defaulting to `info` so retry warnings and
/// escalations are visible when a scenario fails.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Fail the test instead of hanging if the supervisor never returns.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(5), f)
        .await
        .expect("supervisor did not finish within 5 seconds")
}
