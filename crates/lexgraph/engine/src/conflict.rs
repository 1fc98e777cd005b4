//! Conflict Detector: read-only analysis over the citation graph, the
//! status tracker and the court hierarchy.

use crate::budget::TraversalBudget;
use crate::citation_graph::{disagreements, CitationGraph, TreatmentDisagreement};
use crate::hierarchy::CourtHierarchy;
use crate::status::{StatusLifecycleTracker, TrackedCase};
use lexgraph_types::{Authority, CaseId, CaseStatus, CourtId, Treatment, Warning};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Caller-supplied notion of "same holding". Holdings are opaque text.
pub trait HoldingComparator {
    fn same_holding(&self, a: &str, b: &str) -> bool;
}

impl<F> HoldingComparator for F
where
    F: Fn(&str, &str) -> bool,
{
    fn same_holding(&self, a: &str, b: &str) -> bool {
        self(a, b)
    }
}

/// Holdings match when equal after trimming surrounding whitespace.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExactHolding;

impl HoldingComparator for ExactHolding {
    fn same_holding(&self, a: &str, b: &str) -> bool {
        a.trim() == b.trim()
    }
}

/// Treat every pair of holdings as the same; only treatment conflicts count.
#[derive(Clone, Copy, Debug, Default)]
pub struct IgnoreHoldings;

impl HoldingComparator for IgnoreHoldings {
    fn same_holding(&self, _a: &str, _b: &str) -> bool {
        true
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictReason {
    /// The pair treats a shared downstream authority in opposite ways.
    Treatment(TreatmentDisagreement),
    /// The comparator judged the recorded holdings different.
    HoldingMismatch,
}

/// An unordered pair of active precedents in conflict; `first < second`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecedentConflict {
    pub first: CaseId,
    pub second: CaseId,
    pub reasons: Vec<ConflictReason>,
    /// Court data for either case was missing, so binding could not be
    /// established.
    pub hierarchy_unknown: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub conflicts: Vec<PrecedentConflict>,
    /// The budget ran out before every pair was examined.
    pub truncated: bool,
    pub warnings: Vec<Warning>,
    /// Candidate ids the tracker has never seen.
    pub unknown_cases: Vec<CaseId>,
}

impl ConflictReport {
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn involves(&self, case_id: &CaseId) -> bool {
        self.conflicts
            .iter()
            .any(|c| c.first == *case_id || c.second == *case_id)
    }
}

pub struct ConflictDetector<'a> {
    graph: &'a CitationGraph,
    tracker: &'a StatusLifecycleTracker,
    hierarchy: &'a CourtHierarchy,
}

impl<'a> ConflictDetector<'a> {
    pub fn new(
        graph: &'a CitationGraph,
        tracker: &'a StatusLifecycleTracker,
        hierarchy: &'a CourtHierarchy,
    ) -> Self {
        Self {
            graph,
            tracker,
            hierarchy,
        }
    }

    /// Pairs among `candidates` that are both `Active`, related by binding
    /// authority in at least one direction, and disagree in treatment of a
    /// shared authority or in holding.
    pub fn detect_conflicts(
        &self,
        candidates: &[CaseId],
        holdings: &dyn HoldingComparator,
        budget: TraversalBudget,
    ) -> ConflictReport {
        let mut report = ConflictReport::default();
        let mut ids: Vec<CaseId> = candidates.to_vec();
        ids.sort();
        ids.dedup();

        let mut active: Vec<TrackedCase> = Vec::with_capacity(ids.len());
        for id in ids {
            match self.tracker.snapshot(&id) {
                Some(tracked) if tracked.status() == CaseStatus::Active => active.push(tracked),
                Some(_) => {}
                None => report.unknown_cases.push(id),
            }
        }
        let treatments: Vec<BTreeMap<CaseId, Vec<Treatment>>> = active
            .iter()
            .map(|t| self.graph.treatments_by_target(&t.case().case_id))
            .collect();

        let mut unknown_courts: BTreeSet<CourtId> = BTreeSet::new();
        let mut meter = budget.meter();
        'pairs: for i in 0..active.len() {
            for j in (i + 1)..active.len() {
                if !meter.tick() {
                    break 'pairs;
                }
                let (a, b) = (active[i].case(), active[j].case());
                let forward = self.hierarchy.authority(&a.court_id, &b.court_id);
                let backward = self.hierarchy.authority(&b.court_id, &a.court_id);
                let hierarchy_unknown =
                    forward == Authority::Unknown || backward == Authority::Unknown;
                if hierarchy_unknown {
                    for court in [&a.court_id, &b.court_id] {
                        if !self.hierarchy.contains(court) {
                            unknown_courts.insert(court.clone());
                        }
                    }
                } else if !forward.is_binding() && !backward.is_binding() {
                    continue;
                }

                let mut reasons: Vec<ConflictReason> = disagreements(&treatments[i], &treatments[j])
                    .into_iter()
                    .map(ConflictReason::Treatment)
                    .collect();
                if let (Some(ha), Some(hb)) = (&a.holding, &b.holding) {
                    if !holdings.same_holding(ha, hb) {
                        reasons.push(ConflictReason::HoldingMismatch);
                    }
                }
                if !reasons.is_empty() {
                    debug!(first = %a.case_id, second = %b.case_id, reasons = reasons.len(), "Precedent conflict");
                    report.conflicts.push(PrecedentConflict {
                        first: a.case_id.clone(),
                        second: b.case_id.clone(),
                        reasons,
                        hierarchy_unknown,
                    });
                }
            }
        }

        report.truncated = meter.is_exhausted();
        report.warnings = unknown_courts
            .into_iter()
            .map(|court_id| Warning::HierarchyUnknown { court_id })
            .collect();
        report
    }
}
