use crate::ids::{CaseId, CourtId, EventId, IssueId, LogicalId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A judicial decision as ingested.
///
/// The record carries only immutable facts. Its precedential status lives in
/// the status tracker and changes only through audited transitions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub case_id: CaseId,
    /// Human-readable citation. Expected unique; duplicates are tolerated.
    pub citation: String,
    pub decision_date: NaiveDate,
    pub court_id: CourtId,
    /// Recorded holding, compared only through a caller-supplied comparator.
    #[serde(default)]
    pub holding: Option<String>,
    #[serde(default)]
    pub issues: Vec<IssueId>,
    /// Statutes or sections this decision interprets.
    #[serde(default)]
    pub interprets: Vec<LogicalId>,
}

impl Case {
    pub fn new(
        case_id: CaseId,
        citation: impl Into<String>,
        decision_date: NaiveDate,
        court_id: CourtId,
    ) -> Self {
        Self {
            case_id,
            citation: citation.into(),
            decision_date,
            court_id,
            holding: None,
            issues: Vec::new(),
            interprets: Vec::new(),
        }
    }

    pub fn with_holding(mut self, holding: impl Into<String>) -> Self {
        self.holding = Some(holding.into());
        self
    }

    pub fn addressing(mut self, issue: IssueId) -> Self {
        self.issues.push(issue);
        self
    }

    pub fn interpreting(mut self, logical_id: LogicalId) -> Self {
        self.interprets.push(logical_id);
        self
    }

    pub fn addresses(&self, issue: &IssueId) -> bool {
        self.issues.contains(issue)
    }
}

/// Precedential status of a case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseStatus {
    Active,
    Overruled,
    /// Reserved for cases whose underlying statute version was repealed.
    Superseded,
    Distinguished,
    Deprecated,
}

impl CaseStatus {
    /// Whether the decision is still good law.
    pub fn is_good_law(&self) -> bool {
        matches!(self, Self::Active | Self::Distinguished)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Overruled => write!(f, "Overruled"),
            Self::Superseded => write!(f, "Superseded"),
            Self::Distinguished => write!(f, "Distinguished"),
            Self::Deprecated => write!(f, "Deprecated"),
        }
    }
}

/// Immutable audit record of one status transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangeEvent {
    pub event_id: EventId,
    pub case_id: CaseId,
    /// Position in the case's event log, starting at 1.
    pub sequence: u64,
    pub previous_status: CaseStatus,
    pub new_status: CaseStatus,
    /// `None` for manual changes.
    pub triggering_case_id: Option<CaseId>,
    pub change_date: NaiveDate,
    pub reason: String,
}

impl StatusChangeEvent {
    pub fn is_manual(&self) -> bool {
        self.triggering_case_id.is_none()
    }
}
