//! Snapshot export and import through the persistence collaborator.

use super::LexGraphEngine;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::persistence::{CaseRecord, EntityStore, GraphStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

/// Record counts moved by one persist or hydrate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotStats {
    pub entities: usize,
    pub versions: usize,
    pub cases: usize,
    pub courts: usize,
    pub citations: usize,
}

impl LexGraphEngine {
    /// Write the full engine state to the given stores.
    ///
    /// Each component is read through its own snapshot; no store lock is
    /// held across an await.
    #[instrument(skip_all)]
    pub async fn persist_to(
        &self,
        entities: &dyn EntityStore,
        graph: &dyn GraphStore,
    ) -> Result<SnapshotStats, EngineError> {
        let mut stats = SnapshotStats::default();

        for court in self.courts.courts() {
            let inferiors = self.courts.inferiors_of(&court.court_id);
            graph.put_court(court, inferiors).await?;
            stats.courts += 1;
        }

        for logical_id in self.intervals.logical_ids() {
            let Some(versions) = self.intervals.snapshot(&logical_id) else {
                continue;
            };
            stats.entities += 1;
            stats.versions += versions.len();
            entities.put_versions(&logical_id, versions.to_vec()).await?;
        }

        for tracked in self.statuses.all() {
            let record = CaseRecord {
                case: tracked.case().clone(),
                events: tracked.events().to_vec(),
            };
            entities.put_case(record).await?;
            stats.cases += 1;
        }

        let mut by_source: BTreeMap<_, Vec<_>> = BTreeMap::new();
        for edge in self.citations.all_edges() {
            by_source.entry(edge.from.clone()).or_default().push(edge);
        }
        for (from, edges) in by_source {
            stats.citations += edges.len();
            graph.replace_citations(&from, edges).await?;
        }

        info!(
            entities = stats.entities,
            versions = stats.versions,
            cases = stats.cases,
            courts = stats.courts,
            citations = stats.citations,
            "Engine state persisted"
        );
        Ok(stats)
    }

    /// Rebuild an engine from the given stores.
    ///
    /// Courts are registered before the hierarchy edges are loaded as one
    /// batch, so a cyclic stored hierarchy is rejected as a whole. Status
    /// logs are restored verbatim. Citations are re-added and recorded as
    /// treatments of their targets without re-running their status effects.
    #[instrument(skip_all)]
    pub async fn hydrate(
        config: EngineConfig,
        entities: &dyn EntityStore,
        graph: &dyn GraphStore,
    ) -> Result<(Self, SnapshotStats), EngineError> {
        let engine = Self::new(config);
        let mut stats = SnapshotStats::default();

        let courts = graph.courts().await?;
        let mut edges = Vec::new();
        for (court, inferiors) in courts {
            edges.extend(inferiors.into_iter().map(|inf| (court.court_id.clone(), inf)));
            engine.courts.add_court(court, &[])?;
            stats.courts += 1;
        }
        engine.courts.load_hierarchy(&edges)?;

        for logical_id in entities.logical_ids().await? {
            let versions = entities.get_versions(&logical_id).await?;
            stats.entities += 1;
            stats.versions += versions.len();
            for version in versions {
                engine.intervals.put_version(version)?;
            }
        }

        for case_id in entities.case_ids().await? {
            let Some(record) = entities.get_case(&case_id).await? else {
                warn!(case_id = %case_id, "Case listed but not stored");
                continue;
            };
            for warning in engine.statuses.restore(record.case, record.events)? {
                warn!(case_id = %case_id, warning = %warning, "Hydration warning");
            }
            stats.cases += 1;
        }

        for from in graph.citing_case_ids().await? {
            let citing_date = engine.statuses.decision_date(&from);
            for edge in graph.citations_from(&from).await? {
                if let Some(citing_date) = citing_date {
                    engine.statuses.restore_citation(&edge, citing_date);
                }
                engine.citations.add_citation(edge)?;
                stats.citations += 1;
            }
        }

        info!(
            entities = stats.entities,
            cases = stats.cases,
            courts = stats.courts,
            citations = stats.citations,
            "Engine hydrated"
        );
        Ok((engine, stats))
    }
}
