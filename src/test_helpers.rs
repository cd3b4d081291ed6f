//! A set of helpers for testing

use std::collections::HashMap;

use crate::models::{AlertDefinition, AlertId, CheckDefinition, CheckId};

/// A builder for creating `CheckDefinition` instances for testing.
#[derive(Debug, Clone, Default)]
pub struct CheckDefinitionBuilder {
    id: Option<CheckId>,
    interval: Option<u64>,
    entities: Option<Vec<HashMap<String, String>>>,
}

impl CheckDefinitionBuilder {
    /// Creates a new `CheckDefinitionBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the check id.
    pub fn id(mut self, id: CheckId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the execution interval in seconds.
    pub fn interval(mut self, interval: u64) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Sets the entity filter to a single map built from `(key, value)` pairs.
    pub fn entity_filter(mut self, pairs: &[(&str, &str)]) -> Self {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.entities = Some(vec![map]);
        self
    }

    /// Builds the `CheckDefinition` with the provided or default values.
    pub fn build(self) -> CheckDefinition {
        let id = self.id.unwrap_or(1);
        CheckDefinition {
            id,
            name: format!("check-{id}"),
            interval: self.interval.unwrap_or(60),
            command: "http.get('/health')".to_string(),
            entities: self.entities.unwrap_or_else(|| {
                vec![HashMap::from([(
                    "type".to_string(),
                    "instance".to_string(),
                )])]
            }),
            owning_team: None,
        }
    }
}

/// A builder for creating `AlertDefinition` instances for testing.
#[derive(Debug, Clone, Default)]
pub struct AlertDefinitionBuilder {
    id: Option<AlertId>,
    check_definition_id: Option<CheckId>,
}

impl AlertDefinitionBuilder {
    /// Creates a new `AlertDefinitionBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the alert id.
    pub fn id(mut self, id: AlertId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the owning check id.
    pub fn check_definition_id(mut self, check_id: CheckId) -> Self {
        self.check_definition_id = Some(check_id);
        self
    }

    /// Builds the `AlertDefinition` with the provided or default values.
    pub fn build(self) -> AlertDefinition {
        let id = self.id.unwrap_or(1);
        AlertDefinition {
            id,
            name: format!("alert-{id}"),
            check_definition_id: self.check_definition_id.unwrap_or(1),
            condition: "value > 0".to_string(),
            period: None,
            responsible_team: None,
        }
    }
}
