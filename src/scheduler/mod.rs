//! The periodic refresh cycle: fetch the current check definition set and
//! feed it to the repository, which detects and propagates changes.

use std::{sync::Arc, time::Duration};

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::checks::{CheckFetchError, CheckRepository, CheckSource};

/// Drives the check definition refresh on a fixed cadence.
///
/// One instance runs one loop; refresh cycles never overlap. A refresh
/// error can only come out of the source before its first successful load,
/// so an error here is a bootstrap failure: it terminates the loop and the
/// embedding service decides whether to retry, abort, or run empty.
pub struct Scheduler {
    source: Arc<dyn CheckSource>,
    checks: Arc<CheckRepository>,
    refresh_interval: Duration,
}

impl Scheduler {
    /// Creates a new `Scheduler`.
    pub fn new(
        source: Arc<dyn CheckSource>,
        checks: Arc<CheckRepository>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            source,
            checks,
            refresh_interval,
        }
    }

    /// Runs one refresh cycle: fetch the current snapshot and install it.
    pub async fn refresh_once(&self) -> Result<(), CheckFetchError> {
        let snapshot = self.source.fetch_all().await?;
        self.checks.update(snapshot).await;
        Ok(())
    }

    /// Runs refresh cycles until the token is cancelled. The first cycle
    /// runs immediately.
    pub async fn run(&self, cancellation_token: CancellationToken) -> Result<(), CheckFetchError> {
        let mut ticker = tokio::time::interval(self.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    tracing::info!("check refresh loop shutting down");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    self.refresh_once().await?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        checks::MockCheckSource,
        models::CheckDefinitionSet,
        test_helpers::CheckDefinitionBuilder,
    };

    fn snapshot(ids: &[i64]) -> Arc<CheckDefinitionSet> {
        Arc::new(
            ids.iter()
                .map(|id| CheckDefinitionBuilder::new().id(*id).build())
                .collect(),
        )
    }

    #[tokio::test]
    async fn refresh_installs_the_fetched_snapshot() {
        let fetched = snapshot(&[1, 2]);
        let mut source = MockCheckSource::new();
        let returned = Arc::clone(&fetched);
        source
            .expect_fetch_all()
            .times(1)
            .returning(move || Ok(Arc::clone(&returned)));

        let checks = Arc::new(CheckRepository::new());
        let scheduler = Scheduler::new(
            Arc::new(source),
            Arc::clone(&checks),
            Duration::from_secs(60),
        );

        scheduler.refresh_once().await.unwrap();

        assert!(Arc::ptr_eq(&checks.snapshot(), &fetched));
    }

    #[tokio::test]
    async fn bootstrap_failure_propagates() {
        let mut source = MockCheckSource::new();
        source.expect_fetch_all().times(1).returning(|| {
            Err(CheckFetchError::Status(
                reqwest::StatusCode::SERVICE_UNAVAILABLE,
            ))
        });

        let scheduler = Scheduler::new(
            Arc::new(source),
            Arc::new(CheckRepository::new()),
            Duration::from_secs(60),
        );

        assert!(scheduler.refresh_once().await.is_err());
    }

    #[tokio::test]
    async fn run_stops_on_cancellation() {
        let mut source = MockCheckSource::new();
        source
            .expect_fetch_all()
            .returning(|| Ok(Arc::new(CheckDefinitionSet::default())));

        let scheduler = Scheduler::new(
            Arc::new(source),
            Arc::new(CheckRepository::new()),
            Duration::from_secs(3600),
        );

        let token = CancellationToken::new();
        token.cancel();

        // A pre-cancelled token stops the loop on its first pass.
        scheduler.run(token).await.unwrap();
    }
}
