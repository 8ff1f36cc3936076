// ============================================================================
// Query Conditions
// ============================================================================
//
// A condition is `<field> <operator> <value>`. Comparison operators use
// `FieldValue::compare`, so comparing a text field against an integer is a
// type error rather than a silent mismatch.
//
// ============================================================================

use crate::core::{CollectionState, FieldValue, Result, StateError, StateField};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    #[default]
    Eq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    NotIn,
    /// Substring match on text fields.
    Contain,
    NotContain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "k")]
    pub key: StateField,
    #[serde(rename = "v")]
    pub value: FieldValue,
    #[serde(rename = "o", default)]
    pub operator: Operator,
}

impl Condition {
    pub fn new(key: StateField, operator: Operator, value: impl Into<FieldValue>) -> Self {
        Self {
            key,
            value: value.into(),
            operator,
        }
    }

    pub fn equals(key: StateField, value: impl Into<FieldValue>) -> Self {
        Self::new(key, Operator::Eq, value)
    }

    pub fn evaluate(&self, state: &CollectionState) -> Result<bool> {
        let actual = state.field(self.key);

        match self.operator {
            Operator::Eq => Ok(actual.compare(&self.value)? == Ordering::Equal),
            Operator::NotEq => Ok(actual.compare(&self.value)? != Ordering::Equal),
            Operator::Lt => Ok(actual.compare(&self.value)? == Ordering::Less),
            Operator::Lte => Ok(actual.compare(&self.value)? != Ordering::Greater),
            Operator::Gt => Ok(actual.compare(&self.value)? == Ordering::Greater),
            Operator::Gte => Ok(actual.compare(&self.value)? != Ordering::Less),
            Operator::In => self.contains_actual(&actual),
            Operator::NotIn => Ok(!self.contains_actual(&actual)?),
            Operator::Contain => self.substring_of(&actual),
            Operator::NotContain => Ok(!self.substring_of(&actual)?),
        }
    }

    fn contains_actual(&self, actual: &FieldValue) -> Result<bool> {
        let list = self.value.as_list().ok_or_else(|| {
            StateError::InvalidQuery(format!(
                "operator '{:?}' on '{}' requires a list value",
                self.operator, self.key
            ))
        })?;

        for candidate in list {
            if actual.compare(candidate)? == Ordering::Equal {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn substring_of(&self, actual: &FieldValue) -> Result<bool> {
        match (actual, &self.value) {
            (FieldValue::Text(haystack), FieldValue::Text(needle)) => {
                Ok(haystack.contains(needle.as_str()))
            }
            _ => Err(StateError::InvalidQuery(format!(
                "operator '{:?}' requires text on both sides, got {} and {}",
                self.operator,
                actual.type_name(),
                self.value.type_name()
            ))),
        }
    }
}
