use super::{FieldValue, Result, StateError, StateField};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Internal record identifier, assigned by the backend in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(pub u64);

impl StateId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state-{}", self.0)
    }
}

/// One tracked asset inside a (collector, secret, domain) collection context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionState {
    pub id: StateId,
    pub collector_id: String,
    pub job_task_id: String,
    pub secret_id: String,
    pub asset_id: String,
    pub domain_id: String,
    /// Consecutive runs in which the asset was not observed.
    pub disconnected_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CollectionState {
    pub fn field(&self, field: StateField) -> FieldValue {
        match field {
            StateField::CollectorId => FieldValue::Text(self.collector_id.clone()),
            StateField::JobTaskId => FieldValue::Text(self.job_task_id.clone()),
            StateField::SecretId => FieldValue::Text(self.secret_id.clone()),
            StateField::AssetId => FieldValue::Text(self.asset_id.clone()),
            StateField::DomainId => FieldValue::Text(self.domain_id.clone()),
            StateField::DisconnectedCount => {
                FieldValue::Integer(i64::from(self.disconnected_count))
            }
            StateField::CreatedAt => FieldValue::Timestamp(self.created_at),
            StateField::UpdatedAt => FieldValue::Timestamp(self.updated_at),
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Identifying fields of a record that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCollectionState {
    pub collector_id: String,
    pub job_task_id: String,
    pub secret_id: String,
    pub asset_id: String,
    pub domain_id: String,
}

impl NewCollectionState {
    /// Only the collection context is required; asset and domain ids are
    /// stored as given.
    pub fn validate(&self) -> Result<()> {
        require_non_empty("collector_id", &self.collector_id)?;
        require_non_empty("job_task_id", &self.job_task_id)?;
        require_non_empty("secret_id", &self.secret_id)
    }

    pub(crate) fn into_state(self, id: StateId, now: DateTime<Utc>) -> CollectionState {
        CollectionState {
            id,
            collector_id: self.collector_id,
            job_task_id: self.job_task_id,
            secret_id: self.secret_id,
            asset_id: self.asset_id,
            domain_id: self.domain_id,
            disconnected_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Typed partial update. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatePatch {
    pub collector_id: Option<String>,
    pub job_task_id: Option<String>,
    pub secret_id: Option<String>,
    pub asset_id: Option<String>,
    pub domain_id: Option<String>,
    pub disconnected_count: Option<u32>,
}

impl StatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collector_id(mut self, value: impl Into<String>) -> Self {
        self.collector_id = Some(value.into());
        self
    }

    pub fn job_task_id(mut self, value: impl Into<String>) -> Self {
        self.job_task_id = Some(value.into());
        self
    }

    pub fn secret_id(mut self, value: impl Into<String>) -> Self {
        self.secret_id = Some(value.into());
        self
    }

    pub fn asset_id(mut self, value: impl Into<String>) -> Self {
        self.asset_id = Some(value.into());
        self
    }

    pub fn domain_id(mut self, value: impl Into<String>) -> Self {
        self.domain_id = Some(value.into());
        self
    }

    pub fn disconnected_count(mut self, value: u32) -> Self {
        self.disconnected_count = Some(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Rejects identifier fields set to blank strings.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("collector_id", &self.collector_id),
            ("job_task_id", &self.job_task_id),
            ("secret_id", &self.secret_id),
            ("asset_id", &self.asset_id),
            ("domain_id", &self.domain_id),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                require_non_empty(name, value)?;
            }
        }
        Ok(())
    }

    /// Applies the set fields to `state`. Does not touch `updated_at`.
    pub fn apply_to(&self, state: &mut CollectionState) {
        if let Some(v) = &self.collector_id {
            state.collector_id = v.clone();
        }
        if let Some(v) = &self.job_task_id {
            state.job_task_id = v.clone();
        }
        if let Some(v) = &self.secret_id {
            state.secret_id = v.clone();
        }
        if let Some(v) = &self.asset_id {
            state.asset_id = v.clone();
        }
        if let Some(v) = &self.domain_id {
            state.domain_id = v.clone();
        }
        if let Some(v) = self.disconnected_count {
            state.disconnected_count = v;
        }
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StateError::InvalidField {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CollectionState {
        NewCollectionState {
            collector_id: "col1".into(),
            job_task_id: "job1".into(),
            secret_id: "sec1".into(),
            asset_id: "i-1".into(),
            domain_id: "dom1".into(),
        }
        .into_state(StateId(7), Utc::now())
    }

    #[test]
    fn test_new_state_starts_connected() {
        let state = sample();
        assert_eq!(state.disconnected_count, 0);
        assert_eq!(state.id.to_string(), "state-7");
    }

    #[test]
    fn test_patch_applies_only_set_fields() {
        let mut state = sample();
        StatePatch::new()
            .disconnected_count(4)
            .job_task_id("job2")
            .apply_to(&mut state);

        assert_eq!(state.disconnected_count, 4);
        assert_eq!(state.job_task_id, "job2");
        assert_eq!(state.asset_id, "i-1");
    }

    #[test]
    fn test_patch_rejects_blank_identifier() {
        let patch = StatePatch::new().asset_id("  ");
        let err = patch.validate().unwrap_err();
        assert!(matches!(err, StateError::InvalidField { field: "asset_id", .. }));
    }

    #[test]
    fn test_to_json_uses_field_names() {
        let json = sample().to_json().unwrap();
        assert_eq!(json["asset_id"], "i-1");
        assert_eq!(json["disconnected_count"], 0);
        assert_eq!(json["id"], 7);
    }

    #[test]
    fn test_field_lookup() {
        let state = sample();
        assert_eq!(state.field(StateField::AssetId), FieldValue::Text("i-1".into()));
        assert_eq!(state.field(StateField::DisconnectedCount), FieldValue::Integer(0));
    }

    #[test]
    fn test_new_state_validation() {
        let mut new_state = NewCollectionState {
            collector_id: "col1".into(),
            job_task_id: "job1".into(),
            secret_id: "sec1".into(),
            asset_id: "i-1".into(),
            domain_id: "dom1".into(),
        };
        assert!(new_state.validate().is_ok());

        new_state.asset_id.clear();
        new_state.domain_id.clear();
        assert!(new_state.validate().is_ok());

        new_state.secret_id.clear();
        let err = new_state.validate().unwrap_err();
        assert!(matches!(err, StateError::InvalidField { field: "secret_id", .. }));
    }
}
