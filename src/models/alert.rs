//! Alert definitions bound to checks.

use serde::{Deserialize, Serialize};

use super::check::CheckId;

/// Identifier of an alert definition.
pub type AlertId = i64;

/// A rule bound to exactly one check, evaluated against that check's
/// results. Many alerts may reference the same check; the alert repository
/// owns the lookup index from check id to bound alerts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertDefinition {
    /// Unique identifier of the alert.
    pub id: AlertId,

    /// Human-readable name of the alert.
    pub name: String,

    /// Id of the check this alert is bound to.
    pub check_definition_id: CheckId,

    /// Condition expression evaluated against the check's results.
    pub condition: String,

    /// Optional active-time period expression.
    #[serde(default)]
    pub period: Option<String>,

    /// Team responsible for the alert, if the authority reports one.
    #[serde(default)]
    pub responsible_team: Option<String>,
}
