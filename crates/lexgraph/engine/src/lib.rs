#![deny(unsafe_code)]
//! # lexgraph-engine
//!
//! Versioned legal-entity graph engine: statutes and sections as
//! temporally scoped versions, case law as a citation multigraph, precedent
//! status as an auditable state machine, and binding authority derived from
//! a court DAG.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────────────┐
//!   ingest ──────►│    LexGraphEngine    │◄────── queries
//!                 └──────────┬───────────┘
//!        ┌──────────┬────────┼──────────┬───────────────┐
//!        ▼          ▼        ▼          ▼               ▼
//!   Interval    Citation   Status    Court         Conflict
//!   Store       Graph      Tracker   Hierarchy     Detector (read-only)
//!      │
//!      └─► Version Chain (projection)
//! ```
//!
//! Writes are serialized per logical id / case id; readers work on
//! copy-on-write snapshots and never see a half-applied close/open pair.
//! Traversals take an explicit depth and a [`TraversalBudget`].
//!
//! ## Key Types
//!
//! - [`LexGraphEngine`] — Facade for ingestion and point-in-time queries
//! - [`TemporalIntervalStore`] — Non-overlapping validity windows per logical id
//! - [`CitationGraph`] — Cycle-safe citation multigraph
//! - [`StatusLifecycleTracker`] — Case status transitions and audit log
//! - [`CourtHierarchy`] — `superior_to` DAG and binding authority
//! - [`ConflictDetector`] — Contradictory active precedents
//! - [`EntityStore`] / [`GraphStore`] — Pluggable persistence backends

pub mod budget;
pub mod citation_graph;
pub mod config;
pub mod conflict;
pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod interval_store;
pub mod persistence;
pub mod status;
pub mod version_chain;

// Re-export primary types.
pub use budget::{BudgetMeter, TraversalBudget};
pub use citation_graph::{
    weight, CitationGraph, Direction, PrecedentChain, PrecedentStep, TreatmentConflict,
    TreatmentConflicts, TreatmentDisagreement,
};
pub use config::EngineConfig;
pub use conflict::{
    ConflictDetector, ConflictReason, ConflictReport, ExactHolding, HoldingComparator,
    IgnoreHoldings, PrecedentConflict,
};
pub use engine::{
    AsOf, EntityRef, IngestOutcome, Interpretation, InterpretationLineage, LexGraphEngine,
    SnapshotStats,
};
pub use error::{ConfigError, EngineError, StorageError};
pub use hierarchy::CourtHierarchy;
pub use interval_store::{TemporalIntervalStore, VersionList};
pub use persistence::{CaseRecord, EntityStore, GraphStore, InMemoryEntityStore, InMemoryGraphStore};
pub use status::{
    CitationEffect, EventLog, StatusLifecycleTracker, TrackedCase, TransitionCause,
};
pub use version_chain::{AmendmentChain, AmendmentStep, EntityVersionChain, VersionHistory};
