//! Citation Graph: directed, labeled multigraph over cases.
//!
//! Cases are addressed by id, never by reference, so citation cycles are
//! representable without ownership cycles. Every traversal is breadth-first
//! with a visited set keyed by case id, an explicit depth limit, and a
//! [`TraversalBudget`] checked between node visits.

use crate::budget::{BudgetMeter, TraversalBudget};
use dashmap::DashMap;
use lexgraph_types::{CaseId, CitationEdge, CitationKind, Treatment, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Influence weight of a citation kind.
pub fn weight(kind: CitationKind) -> f64 {
    kind.weight()
}

type EdgeList = Arc<Vec<CitationEdge>>;

pub struct CitationGraph {
    /// Edges keyed by citing case.
    outgoing: DashMap<CaseId, EdgeList>,
    /// Edges keyed by cited case.
    incoming: DashMap<CaseId, EdgeList>,
    edge_count: AtomicUsize,
}

/// Direction of a traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Follow citations to the authorities a case relies on.
    Cited,
    /// Follow citations back to the cases that rely on a case.
    Citing,
}

impl CitationGraph {
    pub fn new() -> Self {
        Self {
            outgoing: DashMap::new(),
            incoming: DashMap::new(),
            edge_count: AtomicUsize::new(0),
        }
    }

    /// Insert a citation. Self-citations are rejected; cycles are allowed.
    pub fn add_citation(&self, edge: CitationEdge) -> Result<(), ValidationError> {
        if edge.is_self_loop() {
            return Err(ValidationError::SelfCitation(edge.from));
        }
        debug!(from = %edge.from, to = %edge.to, kind = %edge.kind, "Adding citation");
        Arc::make_mut(&mut *self.incoming.entry(edge.to.clone()).or_default()).push(edge.clone());
        Arc::make_mut(&mut *self.outgoing.entry(edge.from.clone()).or_default()).push(edge);
        self.edge_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Sum of incoming edge weights, recomputed on every call.
    pub fn influence_score(&self, case: &CaseId) -> f64 {
        self.edges_to(case).iter().map(CitationEdge::weight).sum()
    }

    pub fn edges_from(&self, case: &CaseId) -> EdgeList {
        self.outgoing
            .get(case)
            .map(|e| Arc::clone(e.value()))
            .unwrap_or_default()
    }

    pub fn edges_to(&self, case: &CaseId) -> EdgeList {
        self.incoming
            .get(case)
            .map(|e| Arc::clone(e.value()))
            .unwrap_or_default()
    }

    pub fn edges_between(&self, from: &CaseId, to: &CaseId) -> Vec<CitationEdge> {
        self.edges_from(from)
            .iter()
            .filter(|e| &e.to == to)
            .cloned()
            .collect()
    }

    /// Distinct cases cited by `case`, in first-citation order.
    pub fn cited_cases(&self, case: &CaseId) -> Vec<CaseId> {
        distinct(self.edges_from(case).iter().map(|e| &e.to))
    }

    /// Distinct cases citing `case`, in first-citation order.
    pub fn citing_cases(&self, case: &CaseId) -> Vec<CaseId> {
        distinct(self.edges_to(case).iter().map(|e| &e.from))
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count.load(Ordering::Relaxed)
    }

    /// Every edge, grouped by citing case in id order.
    pub fn all_edges(&self) -> Vec<CitationEdge> {
        let mut sources: Vec<CaseId> = self.outgoing.iter().map(|e| e.key().clone()).collect();
        sources.sort();
        sources
            .iter()
            .flat_map(|s| self.edges_from(s).iter().cloned().collect::<Vec<_>>())
            .collect()
    }

    /// Breadth-first walk over the authorities `case` relies on, at most
    /// `max_depth` hops away.
    pub fn precedent_chain(
        &self,
        case: &CaseId,
        max_depth: usize,
        budget: TraversalBudget,
    ) -> PrecedentChain<'_> {
        PrecedentChain::new(self, case.clone(), Direction::Cited, max_depth, budget)
    }

    /// Breadth-first walk over the cases that rely on `case`.
    pub fn citing_chain(
        &self,
        case: &CaseId,
        max_depth: usize,
        budget: TraversalBudget,
    ) -> PrecedentChain<'_> {
        PrecedentChain::new(self, case.clone(), Direction::Citing, max_depth, budget)
    }

    /// Treatments given by each case cited by `case`, keyed by the cited case.
    pub fn treatments_by_target(&self, case: &CaseId) -> BTreeMap<CaseId, Vec<Treatment>> {
        let mut by_target: BTreeMap<CaseId, Vec<Treatment>> = BTreeMap::new();
        for edge in self.edges_from(case).iter() {
            let treatments = by_target.entry(edge.to.clone()).or_default();
            if !treatments.contains(&edge.treatment) {
                treatments.push(edge.treatment);
            }
        }
        by_target
    }

    /// Shared downstream authorities that `a` and `b` treat in opposite ways.
    pub fn treatment_disagreements(&self, a: &CaseId, b: &CaseId) -> Vec<TreatmentDisagreement> {
        let a_targets = self.treatments_by_target(a);
        let b_targets = self.treatments_by_target(b);
        disagreements(&a_targets, &b_targets)
    }

    /// Pairs among `candidates` whose citations to a common downstream case
    /// disagree in treatment. The caller decides which cases are candidates.
    pub fn conflicting_precedents(
        &self,
        candidates: &[CaseId],
        budget: TraversalBudget,
    ) -> TreatmentConflicts {
        let mut ids: Vec<CaseId> = candidates.to_vec();
        ids.sort();
        ids.dedup();
        let targets: Vec<BTreeMap<CaseId, Vec<Treatment>>> =
            ids.iter().map(|c| self.treatments_by_target(c)).collect();

        let mut meter = budget.meter();
        let mut conflicts = Vec::new();
        'outer: for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                if !meter.tick() {
                    break 'outer;
                }
                let found = disagreements(&targets[i], &targets[j]);
                if !found.is_empty() {
                    conflicts.push(TreatmentConflict {
                        first: ids[i].clone(),
                        second: ids[j].clone(),
                        disagreements: found,
                    });
                }
            }
        }
        TreatmentConflicts {
            conflicts,
            truncated: meter.is_exhausted(),
        }
    }
}

impl Default for CitationGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn distinct<'a>(ids: impl Iterator<Item = &'a CaseId>) -> Vec<CaseId> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).cloned().collect()
}

pub(crate) fn disagreements(
    a_targets: &BTreeMap<CaseId, Vec<Treatment>>,
    b_targets: &BTreeMap<CaseId, Vec<Treatment>>,
) -> Vec<TreatmentDisagreement> {
    let mut found = Vec::new();
    for (target, a_treatments) in a_targets {
        let Some(b_treatments) = b_targets.get(target) else {
            continue;
        };
        for ta in a_treatments {
            for tb in b_treatments {
                if ta.disagrees_with(tb) {
                    found.push(TreatmentDisagreement {
                        shared_authority: target.clone(),
                        first: *ta,
                        second: *tb,
                    });
                }
            }
        }
    }
    found
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentDisagreement {
    pub shared_authority: CaseId,
    pub first: Treatment,
    pub second: Treatment,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentConflict {
    pub first: CaseId,
    pub second: CaseId,
    pub disagreements: Vec<TreatmentDisagreement>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentConflicts {
    pub conflicts: Vec<TreatmentConflict>,
    /// The step budget ran out before every pair was examined.
    pub truncated: bool,
}

/// One case reached by a traversal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecedentStep {
    pub case_id: CaseId,
    /// Hops from the root, starting at 1.
    pub depth: usize,
    /// Root first, this case last.
    pub path: Vec<CaseId>,
    /// Kind of the edge this case was first reached through.
    pub via: CitationKind,
}

/// Lazy breadth-first traversal. Yields each reachable case at most once.
pub struct PrecedentChain<'g> {
    graph: &'g CitationGraph,
    direction: Direction,
    max_depth: usize,
    queue: VecDeque<PrecedentStep>,
    visited: HashSet<CaseId>,
    meter: BudgetMeter,
}

impl<'g> PrecedentChain<'g> {
    fn new(
        graph: &'g CitationGraph,
        root: CaseId,
        direction: Direction,
        max_depth: usize,
        budget: TraversalBudget,
    ) -> Self {
        let mut chain = Self {
            graph,
            direction,
            max_depth,
            queue: VecDeque::new(),
            visited: HashSet::new(),
            meter: budget.meter(),
        };
        chain.visited.insert(root.clone());
        if max_depth > 0 {
            chain.enqueue_neighbours(&[root], 0);
        }
        chain
    }

    fn enqueue_neighbours(&mut self, path: &[CaseId], depth: usize) {
        let Some(current) = path.last() else {
            return;
        };
        let edges = match self.direction {
            Direction::Cited => self.graph.edges_from(current),
            Direction::Citing => self.graph.edges_to(current),
        };
        for edge in edges.iter() {
            let next = match self.direction {
                Direction::Cited => &edge.to,
                Direction::Citing => &edge.from,
            };
            if self.visited.insert(next.clone()) {
                let mut next_path = path.to_vec();
                next_path.push(next.clone());
                self.queue.push_back(PrecedentStep {
                    case_id: next.clone(),
                    depth: depth + 1,
                    path: next_path,
                    via: edge.kind,
                });
            }
        }
    }

    /// Whether the walk stopped because the budget ran out.
    pub fn budget_exhausted(&self) -> bool {
        self.meter.is_exhausted()
    }

    pub fn steps_taken(&self) -> usize {
        self.meter.steps()
    }
}

impl Iterator for PrecedentChain<'_> {
    type Item = PrecedentStep;

    fn next(&mut self) -> Option<Self::Item> {
        if self.queue.is_empty() || !self.meter.tick() {
            return None;
        }
        let step = self.queue.pop_front()?;
        if step.depth < self.max_depth {
            let path = step.path.clone();
            self.enqueue_neighbours(&path, step.depth);
        }
        Some(step)
    }
}
