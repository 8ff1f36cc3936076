use super::Condition;
use crate::core::{CollectionState, Result, StateError, StateField};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub key: StateField,
    #[serde(default)]
    pub desc: bool,
}

impl SortKey {
    pub fn asc(key: StateField) -> Self {
        Self { key, desc: false }
    }

    pub fn desc(key: StateField) -> Self {
        Self { key, desc: true }
    }
}

/// Record window of a query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based index of the first record, not a page number.
    pub start: usize,
    pub limit: usize,
}

impl Page {
    pub fn new(start: usize, limit: usize) -> Self {
        Self { start, limit }
    }

    fn validate(&self) -> Result<()> {
        if self.start == 0 {
            return Err(StateError::InvalidQuery("page.start is 1-based".into()));
        }
        if self.limit == 0 {
            return Err(StateError::InvalidQuery("page.limit must be positive".into()));
        }
        Ok(())
    }
}

/// Structured query: AND across `filter`, OR across `filter_or`, then sort,
/// then page. The returned total is counted before paging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateQuery {
    pub filter: Vec<Condition>,
    pub filter_or: Vec<Condition>,
    pub sort: Vec<SortKey>,
    pub page: Option<Page>,
    /// Return only the total, with no records.
    pub count_only: bool,
}

impl StateQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter.push(condition);
        self
    }

    pub fn filter_or(mut self, condition: Condition) -> Self {
        self.filter_or.push(condition);
        self
    }

    pub fn sort(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self
    }

    pub fn page(mut self, start: usize, limit: usize) -> Self {
        self.page = Some(Page::new(start, limit));
        self
    }

    pub fn count_only(mut self) -> Self {
        self.count_only = true;
        self
    }

    pub fn matches(&self, state: &CollectionState) -> Result<bool> {
        for condition in &self.filter {
            if !condition.evaluate(state)? {
                return Ok(false);
            }
        }

        if self.filter_or.is_empty() {
            return Ok(true);
        }
        for condition in &self.filter_or {
            if condition.evaluate(state)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Runs the query over `records`, which must already be in storage order.
    pub fn execute<'a, I>(&self, records: I) -> Result<(Vec<CollectionState>, u64)>
    where
        I: IntoIterator<Item = &'a CollectionState>,
    {
        if let Some(page) = &self.page {
            page.validate()?;
        }

        let mut matched = Vec::new();
        for state in records {
            if self.matches(state)? {
                matched.push(state.clone());
            }
        }
        let total = matched.len() as u64;

        if self.count_only {
            return Ok((Vec::new(), total));
        }

        if !self.sort.is_empty() {
            let mut sort_error = None;
            // Stable sort keeps storage order among equal keys.
            matched.sort_by(|a, b| {
                for key in &self.sort {
                    let ordering = match a.field(key.key).compare(&b.field(key.key)) {
                        Ok(ordering) => ordering,
                        Err(e) => {
                            sort_error.get_or_insert(e);
                            Ordering::Equal
                        }
                    };
                    let ordering = if key.desc { ordering.reverse() } else { ordering };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
            if let Some(e) = sort_error {
                return Err(e);
            }
        }

        if let Some(page) = self.page {
            matched = matched
                .into_iter()
                .skip(page.start - 1)
                .take(page.limit)
                .collect();
        }

        Ok((matched, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StateId;
    use crate::query::Operator;
    use chrono::Utc;

    fn records() -> Vec<CollectionState> {
        (1..=5)
            .map(|n| CollectionState {
                id: StateId(n),
                collector_id: "col1".into(),
                job_task_id: "job1".into(),
                secret_id: "sec1".into(),
                asset_id: format!("i-{}", n),
                domain_id: if n % 2 == 0 { "even".into() } else { "odd".into() },
                disconnected_count: (5 - n) as u32,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn test_and_filter() {
        let query = StateQuery::new()
            .filter(Condition::equals(StateField::DomainId, "odd"))
            .filter(Condition::new(StateField::DisconnectedCount, Operator::Gte, 2i64));
        let (items, total) = query.execute(&records()).unwrap();

        assert_eq!(total, 2);
        let ids: Vec<_> = items.iter().map(|s| s.asset_id.as_str()).collect();
        assert_eq!(ids, vec!["i-1", "i-3"]);
    }

    #[test]
    fn test_or_filter() {
        let query = StateQuery::new()
            .filter_or(Condition::equals(StateField::AssetId, "i-2"))
            .filter_or(Condition::equals(StateField::AssetId, "i-5"));
        let (_, total) = query.execute(&records()).unwrap();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_sort_and_page_keep_total() {
        let query = StateQuery::new()
            .sort(SortKey::asc(StateField::DisconnectedCount))
            .page(2, 2);
        let (items, total) = query.execute(&records()).unwrap();

        assert_eq!(total, 5);
        let ids: Vec<_> = items.iter().map(|s| s.asset_id.as_str()).collect();
        // Ascending counts run i-5, i-4, i-3 ...; start 2 is the second record.
        assert_eq!(ids, vec!["i-4", "i-3"]);
    }

    #[test]
    fn test_count_only() {
        let (items, total) = StateQuery::new().count_only().execute(&records()).unwrap();
        assert!(items.is_empty());
        assert_eq!(total, 5);
    }

    #[test]
    fn test_zero_page_start_rejected() {
        let result = StateQuery::new().page(0, 10).execute(&records());
        assert!(matches!(result, Err(StateError::InvalidQuery(_))));
    }

    #[test]
    fn test_from_json() {
        let query = StateQuery::from_json(
            r#"{
                "filter": [{"k": "domain_id", "v": "even"}],
                "sort": [{"key": "asset_id", "desc": true}],
                "page": {"start": 1, "limit": 1}
            }"#,
        )
        .unwrap();
        let (items, total) = query.execute(&records()).unwrap();

        assert_eq!(total, 2);
        assert_eq!(items[0].asset_id, "i-4");
    }
}
