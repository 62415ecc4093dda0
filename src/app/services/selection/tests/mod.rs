//! Shared test utilities and fixtures for selection tests
//!
//! Selection tests run against the seeded catalog from the catalog test
//! fixtures, wrapped in a resolver that counts storage calls.

use crate::app::models::EntityKind;
use crate::app::services::catalog::CatalogStore;
use crate::app::services::resolver::RelationshipResolver;
use crate::app::services::selection::{IdSet, SelectionManager};
use crate::Result;
use chrono::NaiveDate;
use std::cell::Cell;
use tempfile::TempDir;

pub use crate::app::services::catalog::tests::{create_test_catalog, date, ids};


/// Resolver wrapper counting how often storage is queried
pub struct CountingResolver<R> {
    inner: R,
    pub lookups: Cell<usize>,
    pub date_views: Cell<usize>,
}

impl<R> CountingResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            lookups: Cell::new(0),
            date_views: Cell::new(0),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Total storage calls so far
    pub fn calls(&self) -> usize {
        self.lookups.get() + self.date_views.get()
    }
}

impl<R: RelationshipResolver> RelationshipResolver for CountingResolver<R> {
    fn query_related(
        &self,
        source: EntityKind,
        target: EntityKind,
        ids: &IdSet,
        at: Option<NaiveDate>,
    ) -> Result<IdSet> {
        self.lookups.set(self.lookups.get() + 1);
        self.inner.query_related(source, target, ids, at)
    }

    fn all_ids(&self, kind: EntityKind, at: NaiveDate) -> Result<IdSet> {
        self.date_views.set(self.date_views.get() + 1);
        self.inner.all_ids(kind, at)
    }
}

pub type TestManager = SelectionManager<CountingResolver<CatalogStore>>;

/// Empty selection manager over the seeded catalog
pub fn create_manager() -> (TempDir, TestManager) {
    let (temp_dir, store) = create_test_catalog();
    (temp_dir, SelectionManager::new(CountingResolver::new(store)))
}

/// Remove the catalog file so every further storage call fails
pub fn break_storage(manager: &TestManager) {
    std::fs::remove_file(manager.resolver().inner().path()).unwrap();
}
