//! Temporal Interval Store: versioned records with `[effective_from, effective_to)`
//! validity windows, keyed by logical id.
//!
//! Each logical id maps to a copy-on-write `Arc<Vec<EntityVersion>>` sorted by
//! version number (and therefore by `effective_from`). Writers validate and
//! swap the list under the entry lock for that id only, so unrelated entities
//! never contend and readers see either the old list or the new one.

use chrono::NaiveDate;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use lexgraph_types::{EntityVersion, LogicalId, QueryError, ValidationError};
use std::sync::Arc;
use tracing::debug;

/// Shared, immutable view of one entity's versions.
pub type VersionList = Arc<Vec<EntityVersion>>;

pub struct TemporalIntervalStore {
    entities: DashMap<LogicalId, VersionList>,
}

impl TemporalIntervalStore {
    pub fn new() -> Self {
        Self {
            entities: DashMap::new(),
        }
    }

    /// Insert a version. Rejects overlapping or malformed windows.
    pub fn put_version(&self, version: EntityVersion) -> Result<(), ValidationError> {
        match self.entities.entry(version.logical_id.clone()) {
            Entry::Occupied(mut occupied) => {
                let next = with_inserted(occupied.get(), version)?;
                *occupied.get_mut() = Arc::new(next);
            }
            Entry::Vacant(vacant) => {
                let next = with_inserted(&[], version)?;
                vacant.insert(Arc::new(next));
            }
        }
        Ok(())
    }

    /// Bound the open-ended version of `logical_id` at `effective_to`.
    pub fn close_open_version(
        &self,
        logical_id: &LogicalId,
        effective_to: NaiveDate,
    ) -> Result<EntityVersion, ValidationError> {
        let mut entry = self
            .entities
            .get_mut(logical_id)
            .ok_or_else(|| ValidationError::NoOpenVersion(logical_id.clone()))?;
        let (next, closed) = with_open_closed(logical_id, entry.value(), effective_to)?;
        *entry.value_mut() = Arc::new(next);
        debug!(logical_id = %logical_id, version = closed.version_number, %effective_to, "Closed open version");
        Ok(closed)
    }

    /// Close the open version at `new_version.effective_from` and insert
    /// `new_version`, as one step. On failure neither change is applied.
    ///
    /// Returns the closed predecessor.
    pub fn supersede(&self, new_version: EntityVersion) -> Result<EntityVersion, ValidationError> {
        let logical_id = new_version.logical_id.clone();
        let mut entry = self
            .entities
            .get_mut(&logical_id)
            .ok_or_else(|| ValidationError::NoOpenVersion(logical_id.clone()))?;
        let (closed_list, closed) =
            with_open_closed(&logical_id, entry.value(), new_version.effective_from)?;
        let next = with_inserted(&closed_list, new_version)?;
        *entry.value_mut() = Arc::new(next);
        debug!(logical_id = %logical_id, closed_version = closed.version_number, "Superseded version");
        Ok(closed)
    }

    /// The unique version whose window contains `date`.
    pub fn resolve_at(
        &self,
        logical_id: &LogicalId,
        date: NaiveDate,
    ) -> Result<EntityVersion, QueryError> {
        let versions = self
            .snapshot(logical_id)
            .ok_or_else(|| QueryError::UnknownEntity(logical_id.clone()))?;
        let idx = versions.partition_point(|v| v.effective_from <= date);
        idx.checked_sub(1)
            .map(|i| &versions[i])
            .filter(|v| v.is_in_force_at(date))
            .cloned()
            .ok_or_else(|| QueryError::NotFound {
                logical_id: logical_id.clone(),
                date,
            })
    }

    /// Current version list for `logical_id`, sorted by version number.
    pub fn snapshot(&self, logical_id: &LogicalId) -> Option<VersionList> {
        self.entities.get(logical_id).map(|v| Arc::clone(v.value()))
    }

    pub fn contains(&self, logical_id: &LogicalId) -> bool {
        self.entities.contains_key(logical_id)
    }

    pub fn logical_ids(&self) -> Vec<LogicalId> {
        let mut ids: Vec<LogicalId> = self.entities.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn version_count(&self) -> usize {
        self.entities.iter().map(|e| e.value().len()).sum()
    }
}

impl Default for TemporalIntervalStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate `version` against `existing` and return the new sorted list.
fn with_inserted(
    existing: &[EntityVersion],
    version: EntityVersion,
) -> Result<Vec<EntityVersion>, ValidationError> {
    let logical_id = &version.logical_id;

    if version.version_number == 0 {
        return Err(ValidationError::InvalidVersionNumber {
            logical_id: logical_id.clone(),
            version_number: 0,
        });
    }
    if let Some(effective_to) = version.effective_to {
        if effective_to <= version.effective_from {
            return Err(ValidationError::InvalidWindow {
                logical_id: logical_id.clone(),
                effective_from: version.effective_from,
                effective_to,
            });
        }
    }
    if let Some(first) = existing.first() {
        if first.entity_kind != version.entity_kind {
            return Err(ValidationError::EntityKindMismatch {
                logical_id: logical_id.clone(),
                expected: first.entity_kind,
                actual: version.entity_kind,
            });
        }
    }
    if existing
        .iter()
        .any(|v| v.version_number == version.version_number)
    {
        return Err(ValidationError::DuplicateVersion {
            logical_id: logical_id.clone(),
            version_number: version.version_number,
        });
    }
    let window = version.window();
    if let Some(clash) = existing.iter().find(|v| v.window().overlaps(&window)) {
        return Err(ValidationError::IntervalOverlap {
            logical_id: logical_id.clone(),
            existing_version: clash.version_number,
            new_version: version.version_number,
        });
    }

    // Version numbers and start dates must agree on order.
    let idx = existing.partition_point(|v| v.version_number < version.version_number);
    if let Some(prev) = idx.checked_sub(1).map(|i| &existing[i]) {
        if prev.effective_from >= version.effective_from {
            return Err(ValidationError::NonMonotonicVersion {
                logical_id: logical_id.clone(),
                version_number: version.version_number,
                neighbour: prev.version_number,
            });
        }
    }
    if let Some(next) = existing.get(idx) {
        if next.effective_from <= version.effective_from {
            return Err(ValidationError::NonMonotonicVersion {
                logical_id: logical_id.clone(),
                version_number: version.version_number,
                neighbour: next.version_number,
            });
        }
    }

    let mut next = Vec::with_capacity(existing.len() + 1);
    next.extend_from_slice(&existing[..idx]);
    next.push(version);
    next.extend_from_slice(&existing[idx..]);
    Ok(next)
}

/// Return a copy of `existing` with its open version bounded at `effective_to`.
fn with_open_closed(
    logical_id: &LogicalId,
    existing: &[EntityVersion],
    effective_to: NaiveDate,
) -> Result<(Vec<EntityVersion>, EntityVersion), ValidationError> {
    let idx = existing
        .iter()
        .position(EntityVersion::is_open)
        .ok_or_else(|| ValidationError::NoOpenVersion(logical_id.clone()))?;
    let open = &existing[idx];
    if effective_to <= open.effective_from {
        return Err(ValidationError::InvalidWindow {
            logical_id: logical_id.clone(),
            effective_from: open.effective_from,
            effective_to,
        });
    }
    let closed = open.closed_at(effective_to);
    let mut next = existing.to_vec();
    next[idx] = closed.clone();
    Ok((next, closed))
}
