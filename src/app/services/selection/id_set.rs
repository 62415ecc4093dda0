//! Ordered set of catalog ids
//!
//! Insertion order is kept so that views render selections in a stable order;
//! membership tests ignore order.

use crate::app::models::Id;
use serde::Serialize;
use std::collections::HashSet;

/// Sequence of distinct ids in insertion order
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct IdSet {
    ids: Vec<Id>,
    #[serde(skip)]
    index: HashSet<Id>,
}

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set holding exactly one id
    pub fn single(id: Id) -> Self {
        let mut set = Self::new();
        set.insert(id);
        set
    }

    /// Append `id` if absent; returns whether it was added
    pub fn insert(&mut self, id: Id) -> bool {
        if self.index.insert(id) {
            self.ids.push(id);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, id: Id) -> bool {
        self.index.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.index.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = Id> + '_ {
        self.ids.iter().copied()
    }

    /// Ids in insertion order
    pub fn as_slice(&self) -> &[Id] {
        &self.ids
    }

    /// Ids in ascending order, for reports
    pub fn sorted(&self) -> Vec<Id> {
        let mut ids = self.ids.clone();
        ids.sort_unstable();
        ids
    }
}

/// Equality is set equality; order is presentation only
impl PartialEq for IdSet {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for IdSet {}

impl FromIterator<Id> for IdSet {
    fn from_iter<I: IntoIterator<Item = Id>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<Id> for IdSet {
    fn extend<I: IntoIterator<Item = Id>>(&mut self, iter: I) {
        for id in iter {
            self.insert(id);
        }
    }
}

impl<'a> IntoIterator for &'a IdSet {
    type Item = Id;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Id>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_position() {
        let mut set = IdSet::new();
        assert!(set.insert(5));
        assert!(set.insert(2));
        assert!(!set.insert(5));
        assert!(set.insert(9));

        assert_eq!(set.as_slice(), &[5, 2, 9]);
        assert_eq!(set.sorted(), vec![2, 5, 9]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_equality_ignores_order() {
        let a: IdSet = [1, 2, 3].into_iter().collect();
        let b: IdSet = [3, 1, 2, 2].into_iter().collect();
        let c: IdSet = [1, 2].into_iter().collect();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_clear_resets_membership() {
        let mut set = IdSet::single(7);
        assert!(set.contains(7));

        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(7));
        assert!(set.insert(7));
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let set: IdSet = [4, 1].into_iter().collect();
        assert_eq!(serde_json::to_string(&set).unwrap(), "[4,1]");
    }
}
