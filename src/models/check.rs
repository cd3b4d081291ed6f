//! Check definitions and the immutable snapshot type the scheduler works on.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Identifier of a check definition.
pub type CheckId = i64;

/// A single probe specification owned by the remote authority.
///
/// The scheduler holds a read-only cached copy; a changed definition is
/// only ever observed as a difference between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckDefinition {
    /// Unique identifier of the check.
    pub id: CheckId,

    /// Human-readable name of the check.
    pub name: String,

    /// Execution interval in seconds.
    pub interval: u64,

    /// The command the worker executes for this check.
    pub command: String,

    /// Matching filter: attribute maps selecting the entities this check
    /// applies to.
    #[serde(default)]
    pub entities: Vec<HashMap<String, String>>,

    /// Team owning the check, if the authority reports one.
    #[serde(default)]
    pub owning_team: Option<String>,
}

/// One complete snapshot of check definitions, keyed by unique check id.
///
/// Immutable once constructed; a new fetch produces a new set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckDefinitionSet {
    by_id: HashMap<CheckId, CheckDefinition>,
}

impl CheckDefinitionSet {
    /// Builds a snapshot from a collection of definitions. Ids are unique;
    /// a duplicate id keeps the later definition.
    pub fn new(definitions: Vec<CheckDefinition>) -> Self {
        let by_id = definitions.into_iter().map(|d| (d.id, d)).collect();
        Self { by_id }
    }

    /// Looks up a definition by check id.
    pub fn get(&self, check_id: CheckId) -> Option<&CheckDefinition> {
        self.by_id.get(&check_id)
    }

    /// Returns true if the snapshot contains the given check id.
    pub fn contains(&self, check_id: CheckId) -> bool {
        self.by_id.contains_key(&check_id)
    }

    /// Number of checks in the snapshot.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns true if the snapshot holds no checks.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Iterates over the definitions in the snapshot, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &CheckDefinition> {
        self.by_id.values()
    }

    /// Iterates over the check ids in the snapshot, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = CheckId> + '_ {
        self.by_id.keys().copied()
    }
}

impl FromIterator<CheckDefinition> for CheckDefinitionSet {
    fn from_iter<I: IntoIterator<Item = CheckDefinition>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Wire envelope returned by the check definition endpoint.
///
/// The authority may answer with a missing or `null` collection on an
/// otherwise successful response; both decode to `None` and are read as an
/// empty snapshot.
#[derive(Debug, Deserialize)]
pub struct CheckDefinitionsResponse {
    /// The full current set of check definitions, if any.
    #[serde(default)]
    pub check_definitions: Option<Vec<CheckDefinition>>,
}

impl From<CheckDefinitionsResponse> for CheckDefinitionSet {
    fn from(response: CheckDefinitionsResponse) -> Self {
        Self::new(response.check_definitions.unwrap_or_default())
    }
}
