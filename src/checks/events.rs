//! The change-notification contract between the check repository and its
//! listeners.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::models::CheckId;

/// One detected difference between two successive check definition
/// snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckChange {
    /// The check id is present in the new snapshot but not the previous one.
    New(CheckId),
    /// The check exists in both snapshots with a different execution
    /// interval.
    IntervalChanged(CheckId),
    /// The check exists in both snapshots with a different matching filter.
    FilterChanged(CheckId),
    /// The check id is present in the previous snapshot but not the new one.
    Deleted(CheckId),
}

impl CheckChange {
    /// The id of the check the change applies to.
    pub fn check_id(&self) -> CheckId {
        match *self {
            CheckChange::New(id)
            | CheckChange::IntervalChanged(id)
            | CheckChange::FilterChanged(id)
            | CheckChange::Deleted(id) => id,
        }
    }
}

/// A listener notified of every detected check change, exactly once per
/// change. Delivery order across listeners is unspecified.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CheckChangeListener: Send + Sync {
    /// Handles one detected change. Listeners ignore change kinds they do
    /// not care about.
    async fn on_check_change(&self, change: CheckChange);
}
