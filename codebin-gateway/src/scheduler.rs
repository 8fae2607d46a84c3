//! Daily expiry sweep.
//!
//! Runs [`SnippetLifecycle::sweep`] once a day at a fixed UTC time of day,
//! the way a `30 6 * * *` cron entry would.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use codebin_store::{SnippetLifecycle, SnippetStore};
use tokio::task::JoinHandle;

/// Time from `now` until the next UTC occurrence of `at`.
///
/// If `now` is exactly `at`, the next run is a full day away.
#[must_use]
pub fn next_run_delay(now: DateTime<Utc>, at: NaiveTime) -> Duration {
    let today = now.date_naive().and_time(at).and_utc();
    let next = if today > now { today } else { today + TimeDelta::days(1) };
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

/// Spawn a task that sweeps `lifecycle` every day at `at` (UTC).
///
/// The task runs until the runtime shuts down or the handle is aborted.
pub fn spawn_daily_sweep<S>(lifecycle: Arc<SnippetLifecycle<S>>, at: NaiveTime) -> JoinHandle<()>
where
    S: SnippetStore + 'static,
{
    tokio::spawn(async move {
        loop {
            let delay = next_run_delay(Utc::now(), at);
            tracing::info!(next_in_secs = delay.as_secs(), "scheduled next sweep");
            tokio::time::sleep(delay).await;

            tracing::info!("running scheduled cleanup");
            let report = lifecycle.sweep().await;
            if report.failed > 0 {
                tracing::warn!(failed = report.failed, "scheduled sweep had failures");
            }
        }
    })
}
