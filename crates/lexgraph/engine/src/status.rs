//! Status Lifecycle Tracker: the only mutation path for case status.
//!
//! Transitions:
//!
//! ```text
//! Active | Distinguished --(Overruled edge)--------------> Overruled
//! Overruled --(later Approved/Followed edge)-------------> Active
//! Active | Distinguished --(interpreted statute repealed)-> Superseded
//! Active --(manual, reason required)---------------------> Distinguished
//! any other state --(manual, reason required)------------> Deprecated
//! ```
//!
//! Each transition appends exactly one [`StatusChangeEvent`]. Event logs are
//! copy-on-write and their change dates never decrease, so replaying a prefix
//! reconstructs the status on any past date.
//!
//! Overrulings and endorsements are kept as dated treatments on the target.
//! After every citation the target settles: starting from its last event,
//! the earliest treatment that can move it is applied until none can. The
//! resulting status does not depend on the order citations arrive in.

use chrono::NaiveDate;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use lexgraph_types::{
    Case, CaseId, CaseStatus, CitationEdge, CitationKind, EventId, IssueId, LogicalId, QueryError,
    StatusChangeEvent, ValidationError, Warning,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub type EventLog = Arc<Vec<StatusChangeEvent>>;

/// What drives a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionCause {
    Overruling,
    Reinstatement,
    Repeal,
    Manual,
}

/// Whether `cause` may move a case from `from` to `to`.
pub fn is_permitted(from: CaseStatus, to: CaseStatus, cause: TransitionCause) -> bool {
    use CaseStatus::*;
    match cause {
        TransitionCause::Overruling => matches!(from, Active | Distinguished) && to == Overruled,
        TransitionCause::Reinstatement => from == Overruled && to == Active,
        TransitionCause::Repeal => matches!(from, Active | Distinguished) && to == Superseded,
        TransitionCause::Manual => match to {
            Deprecated => from != Deprecated,
            Distinguished => from == Active,
            Active | Overruled | Superseded => false,
        },
    }
}

/// A later decision's treatment of a tracked case, dated by that decision.
#[derive(Clone, Debug, PartialEq, Eq)]
struct DatedTreatment {
    case_id: CaseId,
    date: NaiveDate,
}

impl DatedTreatment {
    fn key(&self) -> (NaiveDate, &CaseId) {
        (self.date, &self.case_id)
    }
}

/// Earliest treatment whose date satisfies `eligible`, ties broken by case id.
fn earliest(
    treatments: &[DatedTreatment],
    eligible: impl Fn(NaiveDate) -> bool,
) -> Option<DatedTreatment> {
    treatments
        .iter()
        .filter(|t| eligible(t.date))
        .min_by(|a, b| a.key().cmp(&b.key()))
        .cloned()
}

/// A case together with its status and audit log.
///
/// Fields are private: status changes only through the tracker.
#[derive(Clone, Debug)]
pub struct TrackedCase {
    case: Case,
    status: CaseStatus,
    events: EventLog,
    /// Latest overruling case and its decision date, while overruled.
    overruled_by: Option<(CaseId, NaiveDate)>,
    overrulings: Vec<DatedTreatment>,
    endorsements: Vec<DatedTreatment>,
}

impl TrackedCase {
    fn new(case: Case) -> Self {
        Self {
            case,
            status: CaseStatus::Active,
            events: Arc::new(Vec::new()),
            overruled_by: None,
            overrulings: Vec::new(),
            endorsements: Vec::new(),
        }
    }

    pub fn case(&self) -> &Case {
        &self.case
    }

    pub fn status(&self) -> CaseStatus {
        self.status
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn overruled_by(&self) -> Option<&(CaseId, NaiveDate)> {
        self.overruled_by.as_ref()
    }

    fn last_change_date(&self) -> Option<NaiveDate> {
        self.events.last().map(|e| e.change_date)
    }

    /// Status on `date`, replayed from the event log.
    pub fn status_at(&self, date: NaiveDate) -> Result<CaseStatus, QueryError> {
        if date < self.case.decision_date {
            return Err(QueryError::NotYetExisting {
                case_id: self.case.case_id.clone(),
                date,
                decision_date: self.case.decision_date,
            });
        }
        Ok(self
            .events
            .iter()
            .take_while(|e| e.change_date <= date)
            .last()
            .map_or(CaseStatus::Active, |e| e.new_status))
    }

    fn apply(
        &mut self,
        to: CaseStatus,
        cause: TransitionCause,
        trigger: Option<&CaseId>,
        change_date: NaiveDate,
        reason: String,
    ) -> Result<StatusChangeEvent, ValidationError> {
        let case_id = &self.case.case_id;
        if !is_permitted(self.status, to, cause) {
            return Err(ValidationError::InvalidTransition {
                case_id: case_id.clone(),
                from: self.status,
                to,
            });
        }
        if change_date < self.case.decision_date {
            return Err(ValidationError::ChangeBeforeDecision {
                case_id: case_id.clone(),
                change_date,
                decision_date: self.case.decision_date,
            });
        }
        let event = StatusChangeEvent {
            event_id: EventId::new(),
            case_id: case_id.clone(),
            sequence: self.events.len() as u64 + 1,
            previous_status: self.status,
            new_status: to,
            triggering_case_id: trigger.cloned(),
            change_date,
            reason,
        };
        Arc::make_mut(&mut self.events).push(event.clone());
        self.status = to;
        info!(
            case_id = %case_id,
            from = %event.previous_status,
            to = %to,
            change_date = %change_date,
            "Case status transition"
        );
        Ok(event)
    }

    /// Record `edge` as a dated treatment. Returns false when the edge
    /// carries no status meaning or predates the case.
    fn note(&mut self, edge: &CitationEdge, citing_date: NaiveDate) -> bool {
        let treatment = DatedTreatment {
            case_id: edge.from.clone(),
            date: citing_date,
        };
        let list = match edge.kind {
            CitationKind::Overruled if citing_date > self.case.decision_date => &mut self.overrulings,
            kind if kind.is_endorsement() => &mut self.endorsements,
            _ => return false,
        };
        if !list.contains(&treatment) {
            list.push(treatment);
        }
        true
    }

    /// Apply every transition the recorded treatments imply after the last
    /// event, earliest first.
    fn settle(&mut self) -> Vec<StatusChangeEvent> {
        let mut events = Vec::new();
        loop {
            let since = self.last_change_date().unwrap_or(self.case.decision_date);
            let next = match self.status {
                CaseStatus::Active | CaseStatus::Distinguished => earliest(&self.overrulings, |d| d >= since)
                    .map(|t| (CaseStatus::Overruled, TransitionCause::Overruling, t)),
                CaseStatus::Overruled => earliest(&self.endorsements, |d| d > since)
                    .map(|t| (CaseStatus::Active, TransitionCause::Reinstatement, t)),
                CaseStatus::Superseded | CaseStatus::Deprecated => None,
            };
            let Some((to, cause, by)) = next else {
                break;
            };
            let reason = match cause {
                TransitionCause::Overruling => format!("overruled by {}", by.case_id.0),
                _ => format!("reinstated by {}", by.case_id.0),
            };
            match self.apply(to, cause, Some(&by.case_id), by.date, reason) {
                Ok(event) => events.push(event),
                Err(e) => {
                    warn!(error = %e, "Citation transition rejected");
                    break;
                }
            }
        }
        self.refresh_overruled_by();
        events
    }

    /// While overruled, the latest overruling dated on or after the
    /// overruling event. Falls back to the event's trigger.
    fn refresh_overruled_by(&mut self) {
        self.overruled_by = match (self.status, self.events.last()) {
            (CaseStatus::Overruled, Some(last)) => self
                .overrulings
                .iter()
                .filter(|t| t.date >= last.change_date)
                .max_by(|a, b| a.key().cmp(&b.key()))
                .map(|t| (t.case_id.clone(), t.date))
                .or_else(|| {
                    last.triggering_case_id
                        .clone()
                        .map(|c| (c, last.change_date))
                }),
            _ => None,
        };
    }

    /// Why a recorded edge moved nothing, if it is worth reporting.
    fn unapplied(&self, edge: &CitationEdge, citing_date: NaiveDate) -> Option<Warning> {
        match edge.kind {
            CitationKind::Overruled => match self.status {
                _ if citing_date <= self.case.decision_date => Some(anachronism(edge)),
                CaseStatus::Active | CaseStatus::Distinguished => Some(anachronism(edge)),
                status => Some(without_effect(edge, status)),
            },
            kind if kind.is_endorsement() && self.status == CaseStatus::Overruled => {
                Some(anachronism(edge))
            }
            _ => None,
        }
    }
}

/// Status effects of one citation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CitationEffect {
    pub events: Vec<StatusChangeEvent>,
    pub warnings: Vec<Warning>,
}

pub struct StatusLifecycleTracker {
    cases: DashMap<CaseId, TrackedCase>,
    /// Normalized citation string -> cases carrying it.
    citations: DashMap<String, Vec<CaseId>>,
}

impl StatusLifecycleTracker {
    pub fn new() -> Self {
        Self {
            cases: DashMap::new(),
            citations: DashMap::new(),
        }
    }

    /// Register a new case as `Active`. Duplicate citations warn, duplicate
    /// case ids are rejected.
    pub(crate) fn register(&self, case: Case) -> Result<Vec<Warning>, ValidationError> {
        let case_id = case.case_id.clone();
        let citation_key = normalize_citation(&case.citation);
        match self.cases.entry(case_id.clone()) {
            Entry::Occupied(_) => {
                return Err(ValidationError::DuplicateCase(case_id));
            }
            Entry::Vacant(vacant) => {
                vacant.insert(TrackedCase::new(case));
            }
        }
        Ok(self.index_citation(citation_key, case_id))
    }

    /// Restore a case with a persisted event log, validating the log.
    pub(crate) fn restore(
        &self,
        case: Case,
        events: Vec<StatusChangeEvent>,
    ) -> Result<Vec<Warning>, ValidationError> {
        let case_id = case.case_id.clone();
        let citation_key = normalize_citation(&case.citation);
        let mut tracked = TrackedCase::new(case);
        let mut last_date = None;
        for (i, event) in events.iter().enumerate() {
            let consistent = event.case_id == case_id
                && event.sequence == i as u64 + 1
                && event.previous_status == tracked.status
                && last_date.map_or(true, |d| event.change_date >= d)
                && event.change_date >= tracked.case.decision_date;
            if !consistent {
                return Err(ValidationError::InvalidTransition {
                    case_id,
                    from: tracked.status,
                    to: event.new_status,
                });
            }
            tracked.status = event.new_status;
            last_date = Some(event.change_date);
        }
        tracked.events = Arc::new(events);
        tracked.refresh_overruled_by();

        match self.cases.entry(case_id.clone()) {
            Entry::Occupied(_) => {
                return Err(ValidationError::DuplicateCase(case_id));
            }
            Entry::Vacant(vacant) => {
                vacant.insert(tracked);
            }
        }
        Ok(self.index_citation(citation_key, case_id))
    }

    fn index_citation(&self, citation_key: String, case_id: CaseId) -> Vec<Warning> {
        let mut holders = self.citations.entry(citation_key.clone()).or_default();
        holders.push(case_id);
        if holders.len() > 1 {
            warn!(citation = %citation_key, count = holders.len(), "Duplicate citation string");
            vec![Warning::DuplicateCitationAmbiguous {
                citation: citation_key,
                case_ids: holders.clone(),
            }]
        } else {
            Vec::new()
        }
    }

    /// Record `edge` against its target and settle the target's status.
    ///
    /// `insert` stores the edge and runs while the target's entry is locked,
    /// so concurrent citations of one case are applied one at a time. When
    /// the citing case is unknown (`citing_date` is `None`) or the target is
    /// untracked, only `insert` runs.
    pub(crate) fn record_citation(
        &self,
        edge: &CitationEdge,
        citing_date: Option<NaiveDate>,
        insert: impl FnOnce() -> Result<(), ValidationError>,
    ) -> Result<CitationEffect, ValidationError> {
        let mut effect = CitationEffect::default();
        let Some(mut target) = self.cases.get_mut(&edge.to) else {
            insert()?;
            return Ok(effect);
        };
        insert()?;
        let Some(citing_date) = citing_date else {
            return Ok(effect);
        };
        target.note(edge, citing_date);
        effect.events = target.settle();
        if effect.events.is_empty() {
            effect.warnings.extend(target.unapplied(edge, citing_date));
        }
        debug!(case_id = %edge.to, events = effect.events.len(), "Citation settled");
        Ok(effect)
    }

    /// Record a persisted edge as a treatment without replaying transitions;
    /// the restored event log already carries them.
    pub(crate) fn restore_citation(&self, edge: &CitationEdge, citing_date: NaiveDate) {
        if let Some(mut target) = self.cases.get_mut(&edge.to) {
            if target.note(edge, citing_date) {
                target.refresh_overruled_by();
            }
        }
    }

    /// Move every good-law case interpreting `logical_id` to `Superseded`.
    pub(crate) fn supersede_for_repeal(
        &self,
        logical_id: &LogicalId,
        repeal_date: NaiveDate,
    ) -> Vec<StatusChangeEvent> {
        let affected: Vec<CaseId> = self
            .cases
            .iter()
            .filter(|t| t.case.interprets.contains(logical_id))
            .map(|t| t.key().clone())
            .collect();

        let mut events = Vec::new();
        for case_id in affected {
            let Some(mut tracked) = self.cases.get_mut(&case_id) else {
                continue;
            };
            if !is_permitted(tracked.status, CaseStatus::Superseded, TransitionCause::Repeal)
                || repeal_date < tracked.case.decision_date
                || tracked.last_change_date().is_some_and(|d| repeal_date < d)
            {
                continue;
            }
            let reason = format!("{} repealed", logical_id);
            match tracked.apply(
                CaseStatus::Superseded,
                TransitionCause::Repeal,
                None,
                repeal_date,
                reason,
            ) {
                Ok(event) => events.push(event),
                Err(e) => warn!(case_id = %case_id, error = %e, "Repeal transition rejected"),
            }
        }
        events
    }

    /// Administrative override to `Deprecated`.
    pub(crate) fn deprecate(
        &self,
        case_id: &CaseId,
        reason: &str,
        change_date: NaiveDate,
    ) -> Result<StatusChangeEvent, ValidationError> {
        self.manual_transition(case_id, CaseStatus::Deprecated, reason, change_date)
    }

    /// Administrative classification of an `Active` case as `Distinguished`.
    pub(crate) fn mark_distinguished(
        &self,
        case_id: &CaseId,
        reason: &str,
        change_date: NaiveDate,
    ) -> Result<StatusChangeEvent, ValidationError> {
        self.manual_transition(case_id, CaseStatus::Distinguished, reason, change_date)
    }

    fn manual_transition(
        &self,
        case_id: &CaseId,
        to: CaseStatus,
        reason: &str,
        change_date: NaiveDate,
    ) -> Result<StatusChangeEvent, ValidationError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ValidationError::MissingReason(case_id.clone()));
        }
        let mut tracked = self
            .cases
            .get_mut(case_id)
            .ok_or_else(|| ValidationError::UnknownCase(case_id.clone()))?;
        if let Some(last) = tracked.last_change_date() {
            if change_date < last {
                return Err(ValidationError::ChangeBeforeLastEvent {
                    case_id: case_id.clone(),
                    change_date,
                    last_change_date: last,
                });
            }
        }
        let event = tracked.apply(to, TransitionCause::Manual, None, change_date, reason.to_string())?;
        tracked.refresh_overruled_by();
        Ok(event)
    }

    pub fn contains(&self, case_id: &CaseId) -> bool {
        self.cases.contains_key(case_id)
    }

    pub fn snapshot(&self, case_id: &CaseId) -> Option<TrackedCase> {
        self.cases.get(case_id).map(|t| t.value().clone())
    }

    pub fn case(&self, case_id: &CaseId) -> Option<Case> {
        self.cases.get(case_id).map(|t| t.case.clone())
    }

    pub fn status(&self, case_id: &CaseId) -> Option<CaseStatus> {
        self.cases.get(case_id).map(|t| t.status)
    }

    pub fn decision_date(&self, case_id: &CaseId) -> Option<NaiveDate> {
        self.cases.get(case_id).map(|t| t.case.decision_date)
    }

    pub fn events(&self, case_id: &CaseId) -> Option<EventLog> {
        self.cases.get(case_id).map(|t| Arc::clone(&t.events))
    }

    pub fn status_at(&self, case_id: &CaseId, date: NaiveDate) -> Result<CaseStatus, QueryError> {
        self.cases
            .get(case_id)
            .ok_or_else(|| QueryError::UnknownCase(case_id.clone()))?
            .status_at(date)
    }

    /// Cases addressing `issue`, in case-id order.
    pub fn cases_addressing(&self, issue: &IssueId) -> Vec<TrackedCase> {
        self.collect_sorted(|t| t.case.addresses(issue))
    }

    /// Cases interpreting `logical_id`, in case-id order.
    pub fn cases_interpreting(&self, logical_id: &LogicalId) -> Vec<TrackedCase> {
        self.collect_sorted(|t| t.case.interprets.contains(logical_id))
    }

    pub fn all(&self) -> Vec<TrackedCase> {
        self.collect_sorted(|_| true)
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    fn collect_sorted(&self, keep: impl Fn(&TrackedCase) -> bool) -> Vec<TrackedCase> {
        let mut found: Vec<TrackedCase> = self
            .cases
            .iter()
            .filter(|t| keep(t.value()))
            .map(|t| t.value().clone())
            .collect();
        found.sort_by(|a, b| a.case.case_id.cmp(&b.case.case_id));
        found
    }
}

impl Default for StatusLifecycleTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn anachronism(edge: &CitationEdge) -> Warning {
    warn!(from = %edge.from, to = %edge.to, kind = %edge.kind, "Anachronistic treatment");
    Warning::AnachronisticTreatment {
        from: edge.from.clone(),
        to: edge.to.clone(),
        kind: edge.kind,
    }
}

fn without_effect(edge: &CitationEdge, status: CaseStatus) -> Warning {
    warn!(from = %edge.from, to = %edge.to, kind = %edge.kind, status = %status, "Treatment without status effect");
    Warning::TreatmentWithoutEffect {
        from: edge.from.clone(),
        to: edge.to.clone(),
        kind: edge.kind,
        status,
    }
}

fn normalize_citation(citation: &str) -> String {
    citation.split_whitespace().collect::<Vec<_>>().join(" ")
}
