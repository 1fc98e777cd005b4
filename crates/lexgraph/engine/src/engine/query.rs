//! Point-in-Time Query Engine: reads over the component stores.

use super::LexGraphEngine;
use crate::budget::TraversalBudget;
use crate::citation_graph::{PrecedentChain, TreatmentConflicts};
use crate::conflict::{ConflictDetector, ConflictReport, HoldingComparator};
use crate::status::EventLog;
use crate::version_chain::{AmendmentChain, EntityVersionChain, VersionHistory};
use chrono::NaiveDate;
use lexgraph_types::{
    Authority, Case, CaseId, CaseStatus, CourtId, EntityVersion, IssueId, LogicalId, QueryError,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Anything `as_of` can reconstruct.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Logical(LogicalId),
    Case(CaseId),
}

impl From<LogicalId> for EntityRef {
    fn from(id: LogicalId) -> Self {
        Self::Logical(id)
    }
}

impl From<CaseId> for EntityRef {
    fn from(id: CaseId) -> Self {
        Self::Case(id)
    }
}

/// State of an entity on a given date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AsOf {
    /// The statute or section version in force.
    Version(EntityVersion),
    /// A decision and the status it held.
    Case { case: Case, status: CaseStatus },
}

impl AsOf {
    pub fn version(&self) -> Option<&EntityVersion> {
        match self {
            Self::Version(v) => Some(v),
            Self::Case { .. } => None,
        }
    }

    pub fn case_status(&self) -> Option<CaseStatus> {
        match self {
            Self::Version(_) => None,
            Self::Case { status, .. } => Some(*status),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpretation {
    pub case: Case,
    pub status: CaseStatus,
}

/// A version in force together with how courts had read it by that date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpretationLineage {
    pub version: EntityVersion,
    /// Oldest decision first.
    pub interpretations: Vec<Interpretation>,
}

impl InterpretationLineage {
    /// Interpretations still good law on the lineage date.
    pub fn good_law(&self) -> impl Iterator<Item = &Interpretation> {
        self.interpretations.iter().filter(|i| i.status.is_good_law())
    }
}

impl LexGraphEngine {
    fn chain(&self) -> EntityVersionChain<'_> {
        EntityVersionChain::new(&self.intervals)
    }

    pub fn history(&self, logical_id: &LogicalId) -> Result<VersionHistory, QueryError> {
        self.chain().history(logical_id)
    }

    pub fn amendment_chain(
        &self,
        logical_id: &LogicalId,
        version_number: u32,
    ) -> Result<AmendmentChain, QueryError> {
        self.chain().amendment_chain(logical_id, version_number)
    }

    pub fn current_version(&self, logical_id: &LogicalId) -> Result<EntityVersion, QueryError> {
        self.chain().current(logical_id)
    }

    pub fn resolve_at(
        &self,
        logical_id: &LogicalId,
        date: NaiveDate,
    ) -> Result<EntityVersion, QueryError> {
        self.intervals.resolve_at(logical_id, date)
    }

    /// Authorities `case` relies on, breadth-first. `max_depth` is clamped
    /// to the configured ceiling.
    pub fn precedent_chain(
        &self,
        case: &CaseId,
        max_depth: usize,
        budget: TraversalBudget,
    ) -> Result<PrecedentChain<'_>, QueryError> {
        self.require_case(case)?;
        Ok(self
            .citations
            .precedent_chain(case, self.config.clamp_depth(max_depth), budget))
    }

    /// Cases relying on `case`, breadth-first.
    pub fn citing_chain(
        &self,
        case: &CaseId,
        max_depth: usize,
        budget: TraversalBudget,
    ) -> Result<PrecedentChain<'_>, QueryError> {
        self.require_case(case)?;
        Ok(self
            .citations
            .citing_chain(case, self.config.clamp_depth(max_depth), budget))
    }

    /// Active cases addressing `issue` whose treatments of a shared
    /// authority disagree.
    pub fn conflicting_precedents(
        &self,
        issue: &IssueId,
        budget: Option<TraversalBudget>,
    ) -> TreatmentConflicts {
        let candidates: Vec<CaseId> = self
            .statuses
            .cases_addressing(issue)
            .into_iter()
            .filter(|t| t.status() == CaseStatus::Active)
            .map(|t| t.case().case_id.clone())
            .collect();
        debug!(issue = %issue, candidates = candidates.len(), "Conflicting precedents");
        self.citations
            .conflicting_precedents(&candidates, budget.unwrap_or_else(|| self.default_budget()))
    }

    pub fn detect_conflicts(
        &self,
        candidates: &[CaseId],
        holdings: &dyn HoldingComparator,
        budget: Option<TraversalBudget>,
    ) -> ConflictReport {
        ConflictDetector::new(&self.citations, &self.statuses, &self.courts).detect_conflicts(
            candidates,
            holdings,
            budget.unwrap_or_else(|| self.default_budget()),
        )
    }

    fn default_budget(&self) -> TraversalBudget {
        TraversalBudget::steps(self.config.default_step_budget)
    }

    /// Reconstruct `entity` as it stood on `date`.
    pub fn as_of(&self, entity: &EntityRef, date: NaiveDate) -> Result<AsOf, QueryError> {
        match entity {
            EntityRef::Logical(id) => self.resolve_at(id, date).map(AsOf::Version),
            EntityRef::Case(id) => {
                let tracked = self
                    .statuses
                    .snapshot(id)
                    .ok_or_else(|| QueryError::UnknownCase(id.clone()))?;
                let status = tracked.status_at(date)?;
                Ok(AsOf::Case {
                    case: tracked.case().clone(),
                    status,
                })
            }
        }
    }

    pub fn is_binding(&self, precedent_court: &CourtId, deciding_court: &CourtId) -> bool {
        self.courts.is_binding(precedent_court, deciding_court)
    }

    pub fn authority(&self, precedent_court: &CourtId, deciding_court: &CourtId) -> Authority {
        self.courts.authority(precedent_court, deciding_court)
    }

    /// Whether `cited` binds the court that decided `citing`.
    pub fn citation_authority(&self, citing: &CaseId, cited: &CaseId) -> Result<Authority, QueryError> {
        let citing_court = self.case_court(citing)?;
        let cited_court = self.case_court(cited)?;
        Ok(self.courts.authority(&cited_court, &citing_court))
    }

    pub fn influence_score(&self, case: &CaseId) -> f64 {
        self.citations.influence_score(case)
    }

    pub fn current_status(&self, case: &CaseId) -> Result<CaseStatus, QueryError> {
        self.statuses
            .status(case)
            .ok_or_else(|| QueryError::UnknownCase(case.clone()))
    }

    pub fn status_events(&self, case: &CaseId) -> Result<EventLog, QueryError> {
        self.statuses
            .events(case)
            .ok_or_else(|| QueryError::UnknownCase(case.clone()))
    }

    /// The version of `logical_id` in force on `date` and every decision
    /// interpreting it by then, each with its status on `date`.
    pub fn interpretation_lineage(
        &self,
        logical_id: &LogicalId,
        date: NaiveDate,
    ) -> Result<InterpretationLineage, QueryError> {
        let version = self.resolve_at(logical_id, date)?;
        let mut interpretations = Vec::new();
        for tracked in self.statuses.cases_interpreting(logical_id) {
            if tracked.case().decision_date > date {
                continue;
            }
            let status = tracked.status_at(date)?;
            interpretations.push(Interpretation {
                case: tracked.case().clone(),
                status,
            });
        }
        interpretations.sort_by(|a, b| {
            (a.case.decision_date, &a.case.case_id).cmp(&(b.case.decision_date, &b.case.case_id))
        });
        Ok(InterpretationLineage {
            version,
            interpretations,
        })
    }

    fn require_case(&self, case: &CaseId) -> Result<(), QueryError> {
        if self.statuses.contains(case) {
            Ok(())
        } else {
            Err(QueryError::UnknownCase(case.clone()))
        }
    }

    fn case_court(&self, case: &CaseId) -> Result<CourtId, QueryError> {
        self.statuses
            .case(case)
            .map(|c| c.court_id)
            .ok_or_else(|| QueryError::UnknownCase(case.clone()))
    }
}
