use crate::core::{Result, StateError};
use serde::{Deserialize, Serialize};

/// Tuning for a `CollectionStateStore`.
///
/// Can be built in code or loaded from JSON:
///
/// ```
/// # use collection_state::StateStoreConfig;
/// let config = StateStoreConfig::from_json_str(r#"{"disconnected_threshold": 5}"#).unwrap();
/// assert_eq!(config.disconnected_threshold, 5);
/// assert_eq!(config.default_page_limit, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateStoreConfig {
    /// Miss count at or above which a record counts as disconnected
    pub disconnected_threshold: u32,

    /// Page size applied by `list` to queries that carry no page
    pub default_page_limit: Option<usize>,
}

impl Default for StateStoreConfig {
    fn default() -> Self {
        Self {
            disconnected_threshold: 3,
            default_page_limit: None,
        }
    }
}

impl StateStoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the disconnect threshold
    pub fn disconnected_threshold(mut self, threshold: u32) -> Self {
        self.disconnected_threshold = threshold;
        self
    }

    /// Set the default page limit for `list`
    pub fn default_page_limit(mut self, limit: usize) -> Self {
        self.default_page_limit = Some(limit);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.disconnected_threshold == 0 {
            return Err(StateError::Config(
                "disconnected_threshold must be at least 1".into(),
            ));
        }
        if self.default_page_limit == Some(0) {
            return Err(StateError::Config("default_page_limit must be positive".into()));
        }
        Ok(())
    }
}
