use crate::case::CaseStatus;
use crate::citation::CitationKind;
use crate::entity::EntityKind;
use crate::ids::{CaseId, CourtId, LogicalId};
use crate::temporal::TemporalGap;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rejections at the ingestion boundary. Never partially applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{logical_id}: version {new_version} overlaps version {existing_version}")]
    IntervalOverlap {
        logical_id: LogicalId,
        existing_version: u32,
        new_version: u32,
    },
    #[error("{logical_id}: effective_to {effective_to} is not after effective_from {effective_from}")]
    InvalidWindow {
        logical_id: LogicalId,
        effective_from: NaiveDate,
        effective_to: NaiveDate,
    },
    #[error("self citation rejected: {0}")]
    SelfCitation(CaseId),
    #[error("court hierarchy cycle: {}", format_path(.path))]
    CyclicHierarchy { path: Vec<CourtId> },
    #[error("{logical_id}: version number must be positive, got {version_number}")]
    InvalidVersionNumber {
        logical_id: LogicalId,
        version_number: u32,
    },
    #[error("{logical_id}: version {version_number} already exists")]
    DuplicateVersion {
        logical_id: LogicalId,
        version_number: u32,
    },
    #[error("{logical_id}: version {version_number} is out of order with version {neighbour}")]
    NonMonotonicVersion {
        logical_id: LogicalId,
        version_number: u32,
        neighbour: u32,
    },
    #[error("{logical_id}: entity kind {actual} does not match existing kind {expected}")]
    EntityKindMismatch {
        logical_id: LogicalId,
        expected: EntityKind,
        actual: EntityKind,
    },
    #[error("{0}: no open-ended version to close")]
    NoOpenVersion(LogicalId),
    #[error("case already ingested: {0}")]
    DuplicateCase(CaseId),
    #[error("unknown case: {0}")]
    UnknownCase(CaseId),
    #[error("unknown court: {0}")]
    UnknownCourt(CourtId),
    #[error("court already ingested: {0}")]
    DuplicateCourt(CourtId),
    #[error("authority level must be between 1 and 5, got {0}")]
    InvalidAuthorityLevel(u8),
    #[error("{0}: manual status change requires a non-empty reason")]
    MissingReason(CaseId),
    #[error("{case_id}: transition {from} -> {to} is not permitted")]
    InvalidTransition {
        case_id: CaseId,
        from: CaseStatus,
        to: CaseStatus,
    },
    #[error("{case_id}: change date {change_date} precedes decision date {decision_date}")]
    ChangeBeforeDecision {
        case_id: CaseId,
        change_date: NaiveDate,
        decision_date: NaiveDate,
    },
    #[error("{case_id}: change date {change_date} precedes last status change on {last_change_date}")]
    ChangeBeforeLastEvent {
        case_id: CaseId,
        change_date: NaiveDate,
        last_change_date: NaiveDate,
    },
}

fn format_path(path: &[CourtId]) -> String {
    path.iter()
        .map(|c| c.0.as_str())
        .collect::<Vec<_>>()
        .join(" > ")
}

/// "No data" outcomes of read operations, distinct from system failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("unknown logical entity: {0}")]
    UnknownEntity(LogicalId),
    #[error("{logical_id}: no version in force on {date}")]
    NotFound { logical_id: LogicalId, date: NaiveDate },
    #[error("{logical_id}: version {version_number} not found")]
    VersionNotFound {
        logical_id: LogicalId,
        version_number: u32,
    },
    #[error("unknown case: {0}")]
    UnknownCase(CaseId),
    #[error("{case_id} was decided on {decision_date}, after {date}")]
    NotYetExisting {
        case_id: CaseId,
        date: NaiveDate,
        decision_date: NaiveDate,
    },
    #[error("unknown court: {0}")]
    UnknownCourt(CourtId),
}

/// Non-fatal consistency findings surfaced alongside a successful result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Warning {
    TemporalGap(TemporalGap),
    HierarchyUnknown { court_id: CourtId },
    DuplicateCitationAmbiguous {
        citation: String,
        case_ids: Vec<CaseId>,
    },
    /// A treatment that could not drive a transition because of its dates.
    AnachronisticTreatment {
        from: CaseId,
        to: CaseId,
        kind: CitationKind,
    },
    /// A well-dated treatment recorded against a case whose status it cannot move.
    TreatmentWithoutEffect {
        from: CaseId,
        to: CaseId,
        kind: CitationKind,
        status: CaseStatus,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TemporalGap(gap) => write!(f, "temporal gap: {}", gap),
            Self::HierarchyUnknown { court_id } => {
                write!(f, "court hierarchy unknown for {}", court_id)
            }
            Self::DuplicateCitationAmbiguous { citation, case_ids } => write!(
                f,
                "citation '{}' shared by {} cases",
                citation,
                case_ids.len()
            ),
            Self::AnachronisticTreatment { from, to, kind } => write!(
                f,
                "{} {} {} ignored for status: citing case does not postdate the prior event",
                from, kind, to
            ),
            Self::TreatmentWithoutEffect {
                from,
                to,
                kind,
                status,
            } => write!(f, "{} {} {} recorded; status stays {}", from, kind, to, status),
        }
    }
}
