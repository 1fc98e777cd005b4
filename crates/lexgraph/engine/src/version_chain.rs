//! Entity Version Chain: ordered projections over the interval store.
//!
//! Nothing here is stored separately. A [`VersionHistory`] holds the same
//! `Arc` snapshot the store hands out, so it can be iterated any number of
//! times without touching the store again.

use crate::interval_store::{TemporalIntervalStore, VersionList};
use chrono::NaiveDate;
use lexgraph_types::{
    EntityVersion, LogicalId, QueryError, TemporalGap, VersionStatus, Warning,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub struct EntityVersionChain<'a> {
    store: &'a TemporalIntervalStore,
}

impl<'a> EntityVersionChain<'a> {
    pub fn new(store: &'a TemporalIntervalStore) -> Self {
        Self { store }
    }

    /// All versions of `logical_id` in version-number order, with any
    /// temporal gaps between consecutive versions.
    pub fn history(&self, logical_id: &LogicalId) -> Result<VersionHistory, QueryError> {
        let versions = self
            .store
            .snapshot(logical_id)
            .ok_or_else(|| QueryError::UnknownEntity(logical_id.clone()))?;
        let gaps = detect_gaps(logical_id, &versions);
        for gap in &gaps {
            warn!(
                logical_id = %logical_id,
                gap_start = %gap.gap_start,
                gap_end = %gap.gap_end,
                "Temporal gap between versions"
            );
        }
        Ok(VersionHistory {
            logical_id: logical_id.clone(),
            versions,
            gaps,
        })
    }

    /// Lineage of `version_number` walking back through its predecessors.
    pub fn amendment_chain(
        &self,
        logical_id: &LogicalId,
        version_number: u32,
    ) -> Result<AmendmentChain, QueryError> {
        let versions = self
            .store
            .snapshot(logical_id)
            .ok_or_else(|| QueryError::UnknownEntity(logical_id.clone()))?;
        let find = |n: u32| versions.iter().find(|v| v.version_number == n);

        let head = find(version_number).ok_or_else(|| QueryError::VersionNotFound {
            logical_id: logical_id.clone(),
            version_number,
        })?;

        let mut steps = vec![AmendmentStep::from(head)];
        let mut missing_predecessor = None;
        let mut n = version_number;
        while n > 1 {
            n -= 1;
            match find(n) {
                Some(v) => steps.push(AmendmentStep::from(v)),
                None => {
                    missing_predecessor = Some(n);
                    break;
                }
            }
        }

        Ok(AmendmentChain {
            logical_id: logical_id.clone(),
            steps,
            missing_predecessor,
        })
    }

    /// The latest version (by version number), open or not.
    pub fn current(&self, logical_id: &LogicalId) -> Result<EntityVersion, QueryError> {
        self.store
            .snapshot(logical_id)
            .and_then(|versions| versions.last().cloned())
            .ok_or_else(|| QueryError::UnknownEntity(logical_id.clone()))
    }

    pub fn version(
        &self,
        logical_id: &LogicalId,
        version_number: u32,
    ) -> Result<EntityVersion, QueryError> {
        let versions = self
            .store
            .snapshot(logical_id)
            .ok_or_else(|| QueryError::UnknownEntity(logical_id.clone()))?;
        versions
            .iter()
            .find(|v| v.version_number == version_number)
            .cloned()
            .ok_or_else(|| QueryError::VersionNotFound {
                logical_id: logical_id.clone(),
                version_number,
            })
    }
}

/// Gaps between consecutive versions. `versions` must be sorted.
pub fn detect_gaps(logical_id: &LogicalId, versions: &[EntityVersion]) -> Vec<TemporalGap> {
    versions
        .windows(2)
        .filter_map(|pair| {
            let effective_to = pair[0].effective_to?;
            let next_from = pair[1].effective_from;
            (effective_to < next_from).then(|| TemporalGap {
                logical_id: logical_id.clone(),
                gap_start: effective_to,
                gap_end: next_from,
            })
        })
        .collect()
}

/// Restartable view of one entity's versions.
#[derive(Clone, Debug)]
pub struct VersionHistory {
    logical_id: LogicalId,
    versions: VersionList,
    gaps: Vec<TemporalGap>,
}

impl VersionHistory {
    pub fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EntityVersion> {
        self.versions.iter()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn latest(&self) -> Option<&EntityVersion> {
        self.versions.last()
    }

    pub fn gaps(&self) -> &[TemporalGap] {
        &self.gaps
    }

    pub fn warnings(&self) -> Vec<Warning> {
        self.gaps.iter().cloned().map(Warning::TemporalGap).collect()
    }

    pub fn gap_covering(&self, date: NaiveDate) -> Option<&TemporalGap> {
        self.gaps.iter().find(|g| g.covers(date))
    }
}

impl<'a> IntoIterator for &'a VersionHistory {
    type Item = &'a EntityVersion;
    type IntoIter = std::slice::Iter<'a, EntityVersion>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One entry of an amendment lineage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmendmentStep {
    pub version_number: u32,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    pub status: VersionStatus,
}

impl From<&EntityVersion> for AmendmentStep {
    fn from(v: &EntityVersion) -> Self {
        Self {
            version_number: v.version_number,
            effective_from: v.effective_from,
            effective_to: v.effective_to,
            status: v.status,
        }
    }
}

/// Newest-first lineage of a version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmendmentChain {
    pub logical_id: LogicalId,
    pub steps: Vec<AmendmentStep>,
    /// First predecessor number absent from the store, if the walk stopped early.
    pub missing_predecessor: Option<u32>,
}

impl AmendmentChain {
    pub fn is_complete(&self) -> bool {
        self.missing_predecessor.is_none()
    }

    /// Version numbers in the chain, newest first.
    pub fn version_numbers(&self) -> Vec<u32> {
        self.steps.iter().map(|s| s.version_number).collect()
    }
}
