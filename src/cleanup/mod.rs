//! Cascading a check-level filter change into per-alert cleanup
//! notifications.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    alerts::{AlertChangeCleaner, AlertRepository},
    checks::{CheckChange, CheckChangeListener},
    models::CheckId,
};

/// A check-change listener that reacts to filter changes only: it looks up
/// every alert bound to the changed check and forwards one cleanup
/// notification per alert.
pub struct CheckChangeCleaner {
    alerts: Arc<dyn AlertRepository>,
    cleaner: Arc<dyn AlertChangeCleaner>,
}

impl CheckChangeCleaner {
    /// Creates a new `CheckChangeCleaner`.
    pub fn new(alerts: Arc<dyn AlertRepository>, cleaner: Arc<dyn AlertChangeCleaner>) -> Self {
        Self { alerts, cleaner }
    }

    /// Notifies every alert bound to `check_id`, concurrently. A failure
    /// cleaning up one alert is logged and does not keep the sibling
    /// alerts from being notified.
    async fn cascade(&self, check_id: CheckId) {
        let bound = self.alerts.get_by_check_id(check_id);
        if bound.is_empty() {
            tracing::debug!(check_id, "filter changed on check with no bound alerts");
            return;
        }

        tracing::info!(
            check_id,
            alerts = bound.len(),
            "cascading filter change to bound alerts"
        );
        let notifications = bound.into_iter().map(|alert| {
            let alert_id = alert.id;
            async move {
                if let Err(err) = self.cleaner.notify_alert_change(alert).await {
                    tracing::error!(check_id, alert_id, error = %err, "alert cleanup failed");
                }
            }
        });
        futures::future::join_all(notifications).await;
    }
}

#[async_trait]
impl CheckChangeListener for CheckChangeCleaner {
    async fn on_check_change(&self, change: CheckChange) {
        match change {
            CheckChange::FilterChanged(check_id) => self.cascade(check_id).await,
            // New, rescheduled and deleted checks need no alert-side
            // cleanup from this listener.
            CheckChange::New(_) | CheckChange::IntervalChanged(_) | CheckChange::Deleted(_) => {}
        }
    }
}
