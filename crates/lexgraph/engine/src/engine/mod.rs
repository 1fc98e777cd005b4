//! LexGraph Engine - main facade over the seven components.
//!
//! The engine owns one instance of each store and routes every mutation
//! through the component that guards its invariants: versions through the
//! interval store, status through the lifecycle tracker, courts through the
//! hierarchy resolver. Reads go through the same components and never
//! observe a half-applied write.

mod ingest;
mod persist;
mod query;

pub use persist::SnapshotStats;
pub use query::{AsOf, EntityRef, Interpretation, InterpretationLineage};

use crate::citation_graph::CitationGraph;
use crate::config::EngineConfig;
use crate::hierarchy::CourtHierarchy;
use crate::interval_store::TemporalIntervalStore;
use crate::status::StatusLifecycleTracker;
use lexgraph_types::{EntityVersion, StatusChangeEvent, Warning};

/// Versioned legal-entity graph engine.
pub struct LexGraphEngine {
    config: EngineConfig,
    intervals: TemporalIntervalStore,
    citations: CitationGraph,
    statuses: StatusLifecycleTracker,
    courts: CourtHierarchy,
}

/// Side effects of a successful ingestion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestOutcome {
    /// Non-fatal consistency findings.
    pub warnings: Vec<Warning>,
    /// Status transitions triggered by the ingested record.
    pub events: Vec<StatusChangeEvent>,
    /// Predecessor closed by a supersession.
    pub superseded: Option<EntityVersion>,
}

impl IngestOutcome {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl LexGraphEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            intervals: TemporalIntervalStore::new(),
            citations: CitationGraph::new(),
            statuses: StatusLifecycleTracker::new(),
            courts: CourtHierarchy::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn intervals(&self) -> &TemporalIntervalStore {
        &self.intervals
    }

    pub fn citations(&self) -> &CitationGraph {
        &self.citations
    }

    pub fn statuses(&self) -> &StatusLifecycleTracker {
        &self.statuses
    }

    pub fn courts(&self) -> &CourtHierarchy {
        &self.courts
    }
}

impl Default for LexGraphEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
