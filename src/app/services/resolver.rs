//! Relationship resolver contract
//!
//! The resolver is the boundary between the selection engine and storage. It
//! answers two questions: which ids of one entity type are related to a set of
//! ids of another type, and which ids of a type are valid on a given date.
//!
//! Temporal filtering follows these rules:
//! - with no date every reachable id is returned
//! - with a date, every row reached by a hop (intermediate or target) must be
//!   valid on that date; the source ids are not filtered
//! - instruments have no validity window of their own, so a hop into an
//!   instrument is filtered on the sensor that links it

use crate::app::models::EntityKind;
use crate::app::services::selection::IdSet;
use crate::{Error, Result};
use chrono::NaiveDate;
use tracing::trace;

/// Storage-backed relationship lookups along Station → Sitechan → Sensor → Instrument
pub trait RelationshipResolver {
    /// Query storage for ids of `target` related to the non-empty `ids` of `source`
    ///
    /// Implementations may assume `ids` is non-empty and `source != target`;
    /// callers go through [`RelationshipResolver::lookup`].
    fn query_related(
        &self,
        source: EntityKind,
        target: EntityKind,
        ids: &IdSet,
        at: Option<NaiveDate>,
    ) -> Result<IdSet>;

    /// Every id of `kind` valid on `at`
    ///
    /// The date is required; there is no "all ids at no date" query.
    fn all_ids(&self, kind: EntityKind, at: NaiveDate) -> Result<IdSet>;

    /// Ids of `target` related to `ids` of `source`, optionally valid on `at`
    ///
    /// An empty source set returns an empty set without touching storage.
    fn lookup(
        &self,
        source: EntityKind,
        target: EntityKind,
        ids: &IdSet,
        at: Option<NaiveDate>,
    ) -> Result<IdSet> {
        if source == target {
            return Err(Error::unsupported_lookup(source));
        }
        if ids.is_empty() {
            trace!("Empty {} set, skipping {} lookup", source, target);
            return Ok(IdSet::new());
        }
        self.query_related(source, target, ids, at)
    }
}

impl<R: RelationshipResolver + ?Sized> RelationshipResolver for &R {
    fn query_related(
        &self,
        source: EntityKind,
        target: EntityKind,
        ids: &IdSet,
        at: Option<NaiveDate>,
    ) -> Result<IdSet> {
        (**self).query_related(source, target, ids, at)
    }

    fn all_ids(&self, kind: EntityKind, at: NaiveDate) -> Result<IdSet> {
        (**self).all_ids(kind, at)
    }
}
