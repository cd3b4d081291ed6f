//! Owner of the current check definition snapshot and of change detection
//! between successive snapshots.

use std::sync::Arc;

use arc_swap::ArcSwap;

use super::events::{CheckChange, CheckChangeListener};
use crate::models::{CheckDefinitionSet, CheckId};

/// Holds the scheduler's current view of the check definitions and
/// notifies registered listeners of every difference introduced by a new
/// snapshot.
pub struct CheckRepository {
    /// The current snapshot, swapped atomically on update.
    current: ArcSwap<CheckDefinitionSet>,
    /// Listeners notified once per detected change.
    listeners: Vec<Arc<dyn CheckChangeListener>>,
}

impl CheckRepository {
    /// Creates an empty repository with no listeners.
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(CheckDefinitionSet::default()),
            listeners: Vec::new(),
        }
    }

    /// Registers a listener. Registration happens at wiring time, before
    /// the repository is shared.
    pub fn register_listener(&mut self, listener: Arc<dyn CheckChangeListener>) {
        self.listeners.push(listener);
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<CheckDefinitionSet> {
        self.current.load_full()
    }

    /// Installs a new snapshot and notifies every listener of each
    /// detected change, one notification per listener per change.
    pub async fn update(&self, snapshot: Arc<CheckDefinitionSet>) {
        let previous = self.current.swap(Arc::clone(&snapshot));
        let changes = diff_snapshots(&previous, &snapshot);
        if changes.is_empty() {
            tracing::debug!(checks = snapshot.len(), "no check definition changes detected");
            return;
        }

        tracing::info!(
            changes = changes.len(),
            checks = snapshot.len(),
            "applying check definition changes"
        );
        for change in &changes {
            for listener in &self.listeners {
                listener.on_check_change(*change).await;
            }
        }
    }
}

impl Default for CheckRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes the differences between two successive snapshots.
///
/// A check present in both snapshots with a changed interval and a changed
/// filter yields two changes. Ids are visited in ascending order so the
/// produced sequence is deterministic.
pub fn diff_snapshots(old: &CheckDefinitionSet, new: &CheckDefinitionSet) -> Vec<CheckChange> {
    let mut changes = Vec::new();

    let mut new_ids: Vec<CheckId> = new.ids().collect();
    new_ids.sort_unstable();
    for id in new_ids {
        let Some(def) = new.get(id) else { continue };
        match old.get(id) {
            None => changes.push(CheckChange::New(id)),
            Some(prev) => {
                if prev.interval != def.interval {
                    changes.push(CheckChange::IntervalChanged(id));
                }
                if prev.entities != def.entities {
                    changes.push(CheckChange::FilterChanged(id));
                }
            }
        }
    }

    let mut deleted: Vec<CheckId> = old.ids().filter(|id| !new.contains(*id)).collect();
    deleted.sort_unstable();
    changes.extend(deleted.into_iter().map(CheckChange::Deleted));

    changes
}
