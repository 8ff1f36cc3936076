use crate::core::CollectionState;

/// Exact-match conditions, all of which must hold.
///
/// An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateFilter {
    pub collector_id: Option<String>,
    pub job_task_id: Option<String>,
    pub secret_id: Option<String>,
    pub asset_id: Option<String>,
    /// `asset_id IN (...)`. An empty set matches nothing.
    pub asset_ids: Option<Vec<String>>,
    pub domain_id: Option<String>,
    pub disconnected_count: Option<u32>,
}

impl StateFilter {
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

    pub fn asset_ids<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.asset_ids = Some(values.into_iter().map(Into::into).collect());
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

    pub fn matches(&self, state: &CollectionState) -> bool {
        fn eq(expected: &Option<String>, actual: &str) -> bool {
            expected.as_deref().is_none_or(|v| v == actual)
        }

        eq(&self.collector_id, &state.collector_id)
            && eq(&self.job_task_id, &state.job_task_id)
            && eq(&self.secret_id, &state.secret_id)
            && eq(&self.asset_id, &state.asset_id)
            && eq(&self.domain_id, &state.domain_id)
            && self
                .asset_ids
                .as_ref()
                .is_none_or(|ids| ids.iter().any(|id| id == &state.asset_id))
            && self
                .disconnected_count
                .is_none_or(|count| count == state.disconnected_count)
    }
}
