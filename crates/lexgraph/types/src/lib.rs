#![deny(unsafe_code)]
//! # lexgraph-types
//!
//! Shared vocabulary for the lexgraph engine: versioned statutes and
//! sections, judicial decisions, courts, citation edges, status audit
//! records, and the error/warning taxonomy.
//!
//! Every record is plain serde data. Local invariants (window validity,
//! authority-level range, the citation weight table) are enforced here;
//! anything that depends on other records lives in `lexgraph-engine`.

pub mod case;
pub mod citation;
pub mod court;
pub mod entity;
pub mod error;
pub mod ids;
pub mod temporal;

pub use case::{Case, CaseStatus, StatusChangeEvent};
pub use citation::{CitationEdge, CitationKind, Treatment};
pub use court::{Authority, AuthorityLevel, Court};
pub use entity::{EntityKind, EntityVersion, VersionStatus};
pub use error::{QueryError, ValidationError, Warning};
pub use ids::{CaseId, CourtId, EventId, IssueId, LogicalId};
pub use temporal::{TemporalGap, ValidityWindow};

// Dates throughout the crate are calendar dates.
pub use chrono::NaiveDate;
