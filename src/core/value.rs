use crate::core::{Result, StateError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Queryable fields of a collection state record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateField {
    CollectorId,
    JobTaskId,
    SecretId,
    AssetId,
    DomainId,
    DisconnectedCount,
    CreatedAt,
    UpdatedAt,
}

impl StateField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CollectorId => "collector_id",
            Self::JobTaskId => "job_task_id",
            Self::SecretId => "secret_id",
            Self::AssetId => "asset_id",
            Self::DomainId => "domain_id",
            Self::DisconnectedCount => "disconnected_count",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

impl fmt::Display for StateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
    List(Vec<FieldValue>),
    // Never produced by deserialization: RFC 3339 strings arrive as `Text`
    // and are coerced in `compare`.
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn compare(&self, other: &FieldValue) -> Result<Ordering> {
        match (self, other) {
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Ok(a.cmp(b)),
            (FieldValue::Text(a), FieldValue::Text(b)) => Ok(a.cmp(b)),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => Ok(a.cmp(b)),

            (FieldValue::Timestamp(a), FieldValue::Text(b)) => Ok(a.cmp(&parse_timestamp(b)?)),
            (FieldValue::Text(a), FieldValue::Timestamp(b)) => Ok(parse_timestamp(a)?.cmp(b)),

            _ => Err(StateError::TypeMismatch(format!(
                "Cannot compare incompatible types: {} and {}",
                self.type_name(),
                other.type_name()
            ))),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "INTEGER",
            Self::Text(_) => "TEXT",
            Self::List(_) => "LIST",
            Self::Timestamp(_) => "TIMESTAMP",
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            StateError::TypeMismatch(format!("'{}' is not an RFC 3339 timestamp: {}", text, e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_same_types() {
        assert_eq!(
            FieldValue::from(3i64).compare(&FieldValue::from(5i64)).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            FieldValue::from("b").compare(&FieldValue::from("a")).unwrap(),
            Ordering::Greater
        );
    }

    #[test]
    fn test_compare_mismatch_is_error() {
        let err = FieldValue::from(1i64).compare(&FieldValue::from("1")).unwrap_err();
        assert!(matches!(err, StateError::TypeMismatch(_)));
    }

    #[test]
    fn test_timestamp_against_rfc3339_text() {
        let ts: DateTime<Utc> = "2024-05-01T00:00:00Z".parse().unwrap();
        let value = FieldValue::Timestamp(ts);
        assert_eq!(
            value.compare(&FieldValue::from("2024-06-01T00:00:00Z")).unwrap(),
            Ordering::Less
        );
        assert!(value.compare(&FieldValue::from("yesterday")).is_err());
    }

    #[test]
    fn test_deserialize_untagged() {
        let value: FieldValue = serde_json::from_str(r#"["i-1", "i-2"]"#).unwrap();
        assert_eq!(value, FieldValue::from(vec!["i-1", "i-2"]));

        let value: FieldValue = serde_json::from_str("4").unwrap();
        assert_eq!(value, FieldValue::Integer(4));
    }
}
