//! The alert-side collaborators of the change cascade: the lookup index
//! from check id to bound alerts, and the per-alert cleanup seam.

use async_trait::async_trait;
use dashmap::DashMap;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::models::{AlertDefinition, AlertId, CheckId};

/// A failure while cleaning up one alert. Isolated per alert: it never
/// aborts the cascade for the sibling alerts of the same check.
#[derive(Debug, Error)]
#[error("cleanup of alert {alert_id} failed: {source}")]
pub struct AlertCleanupError {
    /// Id of the alert whose cleanup failed.
    pub alert_id: AlertId,

    /// Underlying cause reported by the cleaner.
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

/// Maps a check id to the alert definitions currently bound to it.
#[cfg_attr(test, automock)]
pub trait AlertRepository: Send + Sync {
    /// Returns all alerts bound to the given check; empty when none are.
    fn get_by_check_id(&self, check_id: CheckId) -> Vec<AlertDefinition>;
}

/// Performs the alert-side cleanup after the owning check changed, so the
/// alert can re-evaluate or tear down its own state.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AlertChangeCleaner: Send + Sync {
    /// Cleans up one alert. Treated as fire-and-forget by the cascade.
    async fn notify_alert_change(&self, alert: AlertDefinition) -> Result<(), AlertCleanupError>;
}

/// An in-memory `AlertRepository`, fed by whatever alert synchronization
/// runs next to the check refresh.
#[derive(Debug, Default)]
pub struct InMemoryAlertRepository {
    by_check: DashMap<CheckId, Vec<AlertDefinition>>,
}

impl InMemoryAlertRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one alert to the index.
    pub fn insert(&self, alert: AlertDefinition) {
        self.by_check
            .entry(alert.check_definition_id)
            .or_default()
            .push(alert);
    }

    /// Replaces the entire index with the given alerts.
    pub fn replace_all(&self, alerts: Vec<AlertDefinition>) {
        self.by_check.clear();
        for alert in alerts {
            self.insert(alert);
        }
    }
}

impl AlertRepository for InMemoryAlertRepository {
    fn get_by_check_id(&self, check_id: CheckId) -> Vec<AlertDefinition> {
        self.by_check
            .get(&check_id)
            .map(|alerts| alerts.clone())
            .unwrap_or_default()
    }
}

/// An `AlertChangeCleaner` that records each notification in the log.
/// The cleanup sink of last resort when no downstream alert evaluator is
/// wired in.
#[derive(Debug, Default)]
pub struct LogAlertChangeCleaner;

#[async_trait]
impl AlertChangeCleaner for LogAlertChangeCleaner {
    async fn notify_alert_change(&self, alert: AlertDefinition) -> Result<(), AlertCleanupError> {
        tracing::info!(
            alert_id = alert.id,
            check_id = alert.check_definition_id,
            "alert bound to changed check, flagging for re-evaluation"
        );
        Ok(())
    }
}
