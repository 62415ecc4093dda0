//! Cross-entity selection manager
//!
//! Tracks which stations, site-channels, sensors and instruments are currently
//! selected, plus an optional date filter. Selecting rows of one entity type
//! recomputes the related rows of the other three types through the
//! [`RelationshipResolver`], honouring the date filter.
//!
//! At most one entity type drives the selection at a time. Every mutation
//! stages its result and commits it only after all resolver calls succeed, so
//! a storage failure leaves the previous selection in place.

use crate::app::models::{EntityKind, Id};
use crate::app::services::resolver::RelationshipResolver;
use crate::Result;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

pub mod id_set;

#[cfg(test)]
pub mod tests;

pub use id_set::IdSet;

/// One id set per entity type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntitySets {
    pub stations: IdSet,
    pub sitechans: IdSet,
    pub sensors: IdSet,
    pub instruments: IdSet,
}

impl EntitySets {
    pub fn get(&self, kind: EntityKind) -> &IdSet {
        match kind {
            EntityKind::Station => &self.stations,
            EntityKind::Sitechan => &self.sitechans,
            EntityKind::Sensor => &self.sensors,
            EntityKind::Instrument => &self.instruments,
        }
    }

    pub fn get_mut(&mut self, kind: EntityKind) -> &mut IdSet {
        match kind {
            EntityKind::Station => &mut self.stations,
            EntityKind::Sitechan => &mut self.sitechans,
            EntityKind::Sensor => &mut self.sensors,
            EntityKind::Instrument => &mut self.instruments,
        }
    }

    pub fn replace(&mut self, kind: EntityKind, ids: IdSet) {
        *self.get_mut(kind) = ids;
    }

    pub fn clear(&mut self) {
        for kind in EntityKind::ALL {
            self.get_mut(kind).clear();
        }
    }
}

/// Snapshot of the selection state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    /// Entity type driving the selection; `None` when nothing is active
    pub active: Option<EntityKind>,

    /// Global date filter
    pub date: Option<NaiveDate>,

    pub sets: EntitySets,
}

impl SelectionState {
    fn select_field(&mut self, kind: EntityKind) {
        match self.active {
            None => self.active = Some(kind),
            Some(active) if active != kind => {
                self.sets.clear();
                self.active = Some(kind);
            }
            Some(_) => {}
        }
    }
}

/// Process-wide selection state bound to one resolver
///
/// Views hold a reference to the manager and read the id sets; only the
/// manager's own operations mutate them.
#[derive(Debug)]
pub struct SelectionManager<R> {
    resolver: R,
    state: SelectionState,
}

impl<R: RelationshipResolver> SelectionManager<R> {
    /// Create an empty selection bound to `resolver`
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            state: SelectionState::default(),
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Current state snapshot
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn active_kind(&self) -> Option<EntityKind> {
        self.state.active
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.state.date
    }

    /// Selected ids of `kind`
    pub fn selected(&self, kind: EntityKind) -> &IdSet {
        self.state.sets.get(kind)
    }

    /// Make `kind` the active selection type
    ///
    /// Switching to a different type empties all four sets first. No resolver
    /// calls are made.
    pub fn select_field(&mut self, kind: EntityKind) {
        if self.state.active != Some(kind) {
            debug!("Active selection type {:?} -> {}", self.state.active, kind);
        }
        self.state.select_field(kind);
    }

    /// Set the date filter
    ///
    /// With no active type the four sets become every id valid on `date`.
    /// With an active type only the filter is stored; the active selection is
    /// recombined with it on the next add or select.
    pub fn select_date(&mut self, date: NaiveDate) -> Result<()> {
        debug!("Selecting date {}", date);

        if self.state.active.is_none() {
            let sets = self.date_view(date)?;
            self.state.sets = sets;
        }
        self.state.date = Some(date);
        Ok(())
    }

    /// Remove the date filter
    ///
    /// With no active type the four sets are emptied; otherwise they are kept.
    pub fn clear_date(&mut self) {
        debug!("Clearing date filter");

        self.state.date = None;
        if self.state.active.is_none() {
            self.state.sets.clear();
        }
    }

    /// Jump to a single row of `kind`
    ///
    /// Replaces that type's set with `{id}` and recomputes the other three
    /// from it. The active type is left untouched.
    pub fn select(&mut self, kind: EntityKind, id: Id) -> Result<()> {
        debug!("Selecting {} {}", kind, id);

        let source = IdSet::single(id);
        let related = self.resolve_others(kind, &source, self.state.date)?;

        self.state.sets.replace(kind, source);
        for (other, ids) in related {
            self.state.sets.replace(other, ids);
        }
        Ok(())
    }

    /// Add a row of `kind` to the active selection
    ///
    /// Makes `kind` the active type first. A new id is appended and the other
    /// three sets are recomputed from the whole set of `kind`; an id already
    /// present changes nothing and makes no resolver call.
    pub fn add_to_selection(&mut self, kind: EntityKind, id: Id) -> Result<()> {
        let mut next = self.state.clone();
        next.select_field(kind);

        if !next.sets.get_mut(kind).insert(id) {
            debug!("{} {} already selected", kind, id);
            self.state = next;
            return Ok(());
        }

        debug!(
            "Added {} {} to selection ({} selected)",
            kind,
            id,
            next.sets.get(kind).len()
        );

        let related = self.resolve_others(kind, next.sets.get(kind), next.date)?;
        for (other, ids) in related {
            next.sets.replace(other, ids);
        }
        self.state = next;
        Ok(())
    }

    /// Drop the active selection
    ///
    /// With a date filter the four sets return to the date-only view;
    /// without one they are emptied.
    pub fn clear_all(&mut self) -> Result<()> {
        debug!("Clearing all selections");

        let sets = match self.state.date {
            Some(date) => self.date_view(date)?,
            None => EntitySets::default(),
        };
        self.state.active = None;
        self.state.sets = sets;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Per-type accessors used by the views
    // -------------------------------------------------------------------------

    pub fn selected_stations(&self) -> &IdSet {
        self.selected(EntityKind::Station)
    }

    pub fn selected_sitechans(&self) -> &IdSet {
        self.selected(EntityKind::Sitechan)
    }

    pub fn selected_sensors(&self) -> &IdSet {
        self.selected(EntityKind::Sensor)
    }

    pub fn selected_instruments(&self) -> &IdSet {
        self.selected(EntityKind::Instrument)
    }

    pub fn select_station(&mut self, id: Id) -> Result<()> {
        self.select(EntityKind::Station, id)
    }

    pub fn select_sitechan(&mut self, id: Id) -> Result<()> {
        self.select(EntityKind::Sitechan, id)
    }

    pub fn select_sensor(&mut self, id: Id) -> Result<()> {
        self.select(EntityKind::Sensor, id)
    }

    pub fn select_instrument(&mut self, id: Id) -> Result<()> {
        self.select(EntityKind::Instrument, id)
    }

    pub fn add_station_to_selection(&mut self, id: Id) -> Result<()> {
        self.add_to_selection(EntityKind::Station, id)
    }

    pub fn add_sitechan_to_selection(&mut self, id: Id) -> Result<()> {
        self.add_to_selection(EntityKind::Sitechan, id)
    }

    pub fn add_sensor_to_selection(&mut self, id: Id) -> Result<()> {
        self.add_to_selection(EntityKind::Sensor, id)
    }

    pub fn add_instrument_to_selection(&mut self, id: Id) -> Result<()> {
        self.add_to_selection(EntityKind::Instrument, id)
    }

    // -------------------------------------------------------------------------
    // Resolver plumbing
    // -------------------------------------------------------------------------

    /// Every id of every type valid on `date`
    fn date_view(&self, date: NaiveDate) -> Result<EntitySets> {
        let mut sets = EntitySets::default();
        for kind in EntityKind::ALL {
            sets.replace(kind, self.resolver.all_ids(kind, date)?);
        }
        debug!(
            "Date view {}: {} stations, {} sitechans, {} sensors, {} instruments",
            date,
            sets.stations.len(),
            sets.sitechans.len(),
            sets.sensors.len(),
            sets.instruments.len()
        );
        Ok(sets)
    }

    /// Ids of the three other types related to `ids`
    fn resolve_others(
        &self,
        kind: EntityKind,
        ids: &IdSet,
        at: Option<NaiveDate>,
    ) -> Result<Vec<(EntityKind, IdSet)>> {
        kind.others()
            .map(|other| {
                self.resolver
                    .lookup(kind, other, ids, at)
                    .map(|related| (other, related))
            })
            .collect()
    }
}
