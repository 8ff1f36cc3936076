use crate::core::CollectionState;

/// Records returned by a filter or query, in storage order unless the query
/// sorted them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateSet {
    items: Vec<CollectionState>,
}

impl StateSet {
    pub fn new(items: Vec<CollectionState>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<&CollectionState> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&CollectionState> {
        self.items.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CollectionState> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<CollectionState> {
        self.items
    }
}

impl IntoIterator for StateSet {
    type Item = CollectionState;
    type IntoIter = std::vec::IntoIter<CollectionState>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a StateSet {
    type Item = &'a CollectionState;
    type IntoIter = std::slice::Iter<'a, CollectionState>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
