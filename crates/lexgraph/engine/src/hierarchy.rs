//! Court Hierarchy Resolver.
//!
//! Courts form a DAG under `superior_to`. The whole hierarchy lives in one
//! immutable snapshot; loads build the next snapshot, check it for cycles
//! and swap it in, so a rejected batch leaves no trace.

use lexgraph_types::{Authority, AuthorityLevel, Court, CourtId, ValidationError};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, RwLock, RwLockWriteGuard};
use tracing::{debug, info, warn};

#[derive(Clone, Debug, Default)]
struct HierarchySnapshot {
    courts: HashMap<CourtId, Court>,
    /// superior -> courts it binds directly
    inferiors: HashMap<CourtId, BTreeSet<CourtId>>,
    /// inferior -> courts directly above it
    superiors: HashMap<CourtId, BTreeSet<CourtId>>,
}

impl HierarchySnapshot {
    fn link(&mut self, superior: &CourtId, inferior: &CourtId) -> bool {
        let added = self
            .inferiors
            .entry(superior.clone())
            .or_default()
            .insert(inferior.clone());
        self.superiors
            .entry(inferior.clone())
            .or_default()
            .insert(superior.clone());
        added
    }

    fn require(&self, court_id: &CourtId) -> Result<(), ValidationError> {
        if self.courts.contains_key(court_id) {
            Ok(())
        } else {
            Err(ValidationError::UnknownCourt(court_id.clone()))
        }
    }

    /// First cycle found, as a closed path (`[a, b, a]`).
    fn find_cycle(&self) -> Option<Vec<CourtId>> {
        let mut roots: Vec<&CourtId> = self.courts.keys().collect();
        roots.sort();
        let mut marks: HashMap<&CourtId, Mark> = HashMap::new();
        let mut path = Vec::new();
        for root in roots {
            if !marks.contains_key(root) {
                if let Some(cycle) = self.visit(root, &mut marks, &mut path) {
                    return Some(cycle);
                }
            }
        }
        None
    }

    fn visit<'s>(
        &'s self,
        court: &'s CourtId,
        marks: &mut HashMap<&'s CourtId, Mark>,
        path: &mut Vec<&'s CourtId>,
    ) -> Option<Vec<CourtId>> {
        marks.insert(court, Mark::InProgress);
        path.push(court);
        for next in self.inferiors.get(court).into_iter().flatten() {
            match marks.get(next) {
                Some(Mark::InProgress) => {
                    let start = path.iter().position(|c| *c == next).unwrap_or(0);
                    let mut cycle: Vec<CourtId> = path[start..].iter().map(|c| (*c).clone()).collect();
                    cycle.push(next.clone());
                    return Some(cycle);
                }
                Some(Mark::Done) => {}
                None => {
                    if let Some(cycle) = self.visit(next, marks, path) {
                        return Some(cycle);
                    }
                }
            }
        }
        path.pop();
        marks.insert(court, Mark::Done);
        None
    }

    fn reaches(&self, from: &CourtId, to: &CourtId) -> bool {
        if from == to {
            return true;
        }
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([from]);
        while let Some(court) = queue.pop_front() {
            for next in self.inferiors.get(court).into_iter().flatten() {
                if next == to {
                    return true;
                }
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        false
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

pub struct CourtHierarchy {
    snapshot: RwLock<Arc<HierarchySnapshot>>,
}

impl CourtHierarchy {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(HierarchySnapshot::default())),
        }
    }

    // Writers only ever assign a fully built snapshot, so a poisoned lock
    // still holds a consistent value.
    fn read(&self) -> Arc<HierarchySnapshot> {
        let guard = self.snapshot.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Arc<HierarchySnapshot>> {
        self.snapshot.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Register `court`, optionally as superior to already-known courts.
    pub fn add_court(&self, court: Court, superior_to: &[CourtId]) -> Result<(), ValidationError> {
        let mut guard = self.write();
        if guard.courts.contains_key(&court.court_id) {
            return Err(ValidationError::DuplicateCourt(court.court_id));
        }
        for inferior in superior_to {
            if *inferior != court.court_id {
                guard.require(inferior)?;
            }
        }

        let mut next = HierarchySnapshot::clone(&guard);
        let court_id = court.court_id.clone();
        next.courts.insert(court_id.clone(), court);
        for inferior in superior_to {
            next.link(&court_id, inferior);
        }
        if let Some(path) = next.find_cycle() {
            warn!(court_id = %court_id, "Rejected court: hierarchy cycle");
            return Err(ValidationError::CyclicHierarchy { path });
        }
        *guard = Arc::new(next);
        debug!(court_id = %court_id, inferiors = superior_to.len(), "Court registered");
        Ok(())
    }

    /// Add a batch of `(superior, inferior)` edges between known courts.
    ///
    /// All-or-nothing: any unknown court or any cycle rejects the batch.
    /// Returns the number of edges not already present.
    pub fn load_hierarchy(&self, edges: &[(CourtId, CourtId)]) -> Result<usize, ValidationError> {
        let mut guard = self.write();
        for (superior, inferior) in edges {
            guard.require(superior)?;
            guard.require(inferior)?;
        }

        let mut next = HierarchySnapshot::clone(&guard);
        let added = edges
            .iter()
            .filter(|(superior, inferior)| next.link(superior, inferior))
            .count();
        if let Some(path) = next.find_cycle() {
            warn!(edges = edges.len(), "Rejected hierarchy batch: cycle");
            return Err(ValidationError::CyclicHierarchy { path });
        }
        *guard = Arc::new(next);
        info!(edges = edges.len(), added, "Court hierarchy loaded");
        Ok(added)
    }

    /// True iff `precedent_court` is `deciding_court` or reaches it through
    /// `superior_to` edges. Unknown courts bind nothing.
    pub fn is_binding(&self, precedent_court: &CourtId, deciding_court: &CourtId) -> bool {
        let snapshot = self.read();
        snapshot.courts.contains_key(precedent_court)
            && snapshot.courts.contains_key(deciding_court)
            && snapshot.reaches(precedent_court, deciding_court)
    }

    pub fn authority(&self, precedent_court: &CourtId, deciding_court: &CourtId) -> Authority {
        let snapshot = self.read();
        if !snapshot.courts.contains_key(precedent_court) || !snapshot.courts.contains_key(deciding_court) {
            Authority::Unknown
        } else if snapshot.reaches(precedent_court, deciding_court) {
            Authority::Binding
        } else {
            Authority::Persuasive
        }
    }

    pub fn court(&self, court_id: &CourtId) -> Option<Court> {
        self.read().courts.get(court_id).cloned()
    }

    pub fn contains(&self, court_id: &CourtId) -> bool {
        self.read().courts.contains_key(court_id)
    }

    pub fn authority_level(&self, court_id: &CourtId) -> Option<AuthorityLevel> {
        self.read().courts.get(court_id).map(|c| c.authority_level)
    }

    /// Courts in id order.
    pub fn courts(&self) -> Vec<Court> {
        let mut courts: Vec<Court> = self.read().courts.values().cloned().collect();
        courts.sort_by(|a, b| a.court_id.cmp(&b.court_id));
        courts
    }

    /// Every `(superior, inferior)` edge in order.
    pub fn edges(&self) -> Vec<(CourtId, CourtId)> {
        let snapshot = self.read();
        let mut edges: Vec<(CourtId, CourtId)> = snapshot
            .inferiors
            .iter()
            .flat_map(|(sup, infs)| infs.iter().map(move |inf| (sup.clone(), inf.clone())))
            .collect();
        edges.sort();
        edges
    }

    pub fn inferiors_of(&self, court_id: &CourtId) -> Vec<CourtId> {
        self.read()
            .inferiors
            .get(court_id)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn superiors_of(&self, court_id: &CourtId) -> Vec<CourtId> {
        self.read()
            .superiors
            .get(court_id)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.read().courts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().courts.is_empty()
    }
}

impl Default for CourtHierarchy {
    fn default() -> Self {
        Self::new()
    }
}
