//! Check definition synchronization: the change-notification contract, the
//! resilient remote source, and the snapshot-owning repository.

mod events;
mod repository;
mod source;

pub use events::{CheckChange, CheckChangeListener};
pub use repository::{CheckRepository, diff_snapshots};
pub use source::{CheckFetchError, CheckSource, HttpCheckSource};
#[cfg(test)]
pub use source::MockCheckSource;
