//! Integration tests for the check-change cascade: repository diffing
//! through to per-alert cleanup notifications.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use vigil::{
    alerts::{AlertChangeCleaner, AlertCleanupError, InMemoryAlertRepository},
    checks::CheckRepository,
    cleanup::CheckChangeCleaner,
    models::{AlertDefinition, AlertId, CheckDefinitionSet},
    test_helpers::{AlertDefinitionBuilder, CheckDefinitionBuilder},
};

/// Records the alert ids it is asked to clean up.
#[derive(Default)]
struct RecordingCleaner {
    notified: Mutex<Vec<AlertId>>,
}

impl RecordingCleaner {
    fn notified(&self) -> Vec<AlertId> {
        let mut ids = self.notified.lock().unwrap().clone();
        ids.sort_unstable();
        ids
    }
}

#[async_trait]
impl AlertChangeCleaner for RecordingCleaner {
    async fn notify_alert_change(&self, alert: AlertDefinition) -> Result<(), AlertCleanupError> {
        self.notified.lock().unwrap().push(alert.id);
        Ok(())
    }
}

fn wire(
    alerts: Vec<AlertDefinition>,
) -> (Arc<CheckRepository>, Arc<RecordingCleaner>) {
    let repository = Arc::new(InMemoryAlertRepository::new());
    repository.replace_all(alerts);

    let cleaner = Arc::new(RecordingCleaner::default());
    let mut checks = CheckRepository::new();
    checks.register_listener(Arc::new(CheckChangeCleaner::new(
        repository,
        Arc::clone(&cleaner) as Arc<dyn AlertChangeCleaner>,
    )));

    (Arc::new(checks), cleaner)
}

fn snapshot(checks: &[(i64, u64, &str)]) -> Arc<CheckDefinitionSet> {
    Arc::new(
        checks
            .iter()
            .map(|(id, interval, entity_type)| {
                CheckDefinitionBuilder::new()
                    .id(*id)
                    .interval(*interval)
                    .entity_filter(&[("type", entity_type)])
                    .build()
            })
            .collect(),
    )
}

#[tokio::test]
async fn filter_change_cleans_up_every_bound_alert() {
    let (checks, cleaner) = wire(vec![
        AlertDefinitionBuilder::new().id(7).check_definition_id(42).build(),
        AlertDefinitionBuilder::new().id(8).check_definition_id(42).build(),
        AlertDefinitionBuilder::new().id(9).check_definition_id(13).build(),
    ]);

    checks
        .update(snapshot(&[(42, 60, "instance"), (13, 60, "instance")]))
        .await;
    checks
        .update(snapshot(&[(42, 60, "host"), (13, 60, "instance")]))
        .await;

    assert_eq!(cleaner.notified(), vec![7, 8]);
}

#[tokio::test]
async fn interval_change_triggers_no_cleanup() {
    let (checks, cleaner) = wire(vec![
        AlertDefinitionBuilder::new().id(7).check_definition_id(42).build(),
    ]);

    checks.update(snapshot(&[(42, 60, "instance")])).await;
    checks.update(snapshot(&[(42, 30, "instance")])).await;

    assert!(cleaner.notified().is_empty());
}

#[tokio::test]
async fn new_and_deleted_checks_trigger_no_cleanup() {
    let (checks, cleaner) = wire(vec![
        AlertDefinitionBuilder::new().id(7).check_definition_id(42).build(),
        AlertDefinitionBuilder::new().id(8).check_definition_id(13).build(),
    ]);

    checks.update(snapshot(&[(42, 60, "instance")])).await;
    checks.update(snapshot(&[(13, 60, "instance")])).await;

    assert!(cleaner.notified().is_empty());
}

#[tokio::test]
async fn filter_change_on_check_without_alerts_is_quiet() {
    let (checks, cleaner) = wire(vec![
        AlertDefinitionBuilder::new().id(7).check_definition_id(13).build(),
    ]);

    checks.update(snapshot(&[(42, 60, "instance")])).await;
    checks.update(snapshot(&[(42, 60, "host")])).await;

    assert!(cleaner.notified().is_empty());
}
