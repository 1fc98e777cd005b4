//! Ingestion boundary. Validation errors are returned before anything is
//! applied; consistency warnings ride along with a successful outcome.

use super::{IngestOutcome, LexGraphEngine};
use crate::version_chain::detect_gaps;
use chrono::NaiveDate;
use lexgraph_types::{
    Case, CaseId, CitationEdge, Court, CourtId, EntityVersion, LogicalId,
    StatusChangeEvent, ValidationError, VersionStatus, Warning,
};
use tracing::{debug, instrument, warn};

impl LexGraphEngine {
    /// Insert a version of a statute or section.
    ///
    /// Gaps next to the new version are reported as warnings. A `Repealed`
    /// version supersedes every good-law case interpreting the entity, dated
    /// at the version's `effective_from`.
    #[instrument(skip(self, version), fields(logical_id = %version.logical_id, version = version.version_number))]
    pub fn ingest_version(&self, version: EntityVersion) -> Result<IngestOutcome, ValidationError> {
        let logical_id = version.logical_id.clone();
        let (from, to, status) = (version.effective_from, version.effective_to, version.status);
        self.intervals.put_version(version)?;

        let mut outcome = IngestOutcome {
            warnings: self.adjacent_gaps(&logical_id, from, to),
            ..IngestOutcome::default()
        };
        if status == VersionStatus::Repealed {
            outcome.events = self.statuses.supersede_for_repeal(&logical_id, from);
        }
        debug!(warnings = outcome.warnings.len(), events = outcome.events.len(), "Version ingested");
        Ok(outcome)
    }

    /// Close the open version at `new_version.effective_from` and insert
    /// `new_version`, atomically.
    #[instrument(skip(self, new_version), fields(logical_id = %new_version.logical_id, version = new_version.version_number))]
    pub fn supersede_version(
        &self,
        new_version: EntityVersion,
    ) -> Result<IngestOutcome, ValidationError> {
        let logical_id = new_version.logical_id.clone();
        let (from, to, status) = (
            new_version.effective_from,
            new_version.effective_to,
            new_version.status,
        );
        let closed = self.intervals.supersede(new_version)?;

        let mut outcome = IngestOutcome {
            warnings: self.adjacent_gaps(&logical_id, from, to),
            superseded: Some(closed),
            ..IngestOutcome::default()
        };
        if status == VersionStatus::Repealed {
            outcome.events = self.statuses.supersede_for_repeal(&logical_id, from);
        }
        Ok(outcome)
    }

    /// Bound the open version of `logical_id` without opening a successor.
    pub fn close_version(
        &self,
        logical_id: &LogicalId,
        effective_to: NaiveDate,
    ) -> Result<EntityVersion, ValidationError> {
        self.intervals.close_open_version(logical_id, effective_to)
    }

    fn adjacent_gaps(
        &self,
        logical_id: &LogicalId,
        from: NaiveDate,
        to: Option<NaiveDate>,
    ) -> Vec<Warning> {
        let Some(versions) = self.intervals.snapshot(logical_id) else {
            return Vec::new();
        };
        detect_gaps(logical_id, &versions)
            .into_iter()
            .filter(|gap| gap.gap_end == from || Some(gap.gap_start) == to)
            .inspect(|gap| {
                warn!(logical_id = %logical_id, gap_start = %gap.gap_start, gap_end = %gap.gap_end, "Temporal gap")
            })
            .map(Warning::TemporalGap)
            .collect()
    }

    pub fn ingest_court(&self, court: Court, superior_to: &[CourtId]) -> Result<(), ValidationError> {
        self.courts.add_court(court, superior_to)
    }

    /// Add `(superior, inferior)` edges as one batch.
    pub fn load_hierarchy(&self, edges: &[(CourtId, CourtId)]) -> Result<usize, ValidationError> {
        self.courts.load_hierarchy(edges)
    }

    /// Register a decision as `Active`.
    #[instrument(skip(self, case), fields(case_id = %case.case_id))]
    pub fn ingest_case(&self, case: Case) -> Result<IngestOutcome, ValidationError> {
        let mut outcome = IngestOutcome::default();
        if !self.courts.contains(&case.court_id) {
            if self.config.reject_unknown_court_on_case {
                return Err(ValidationError::UnknownCourt(case.court_id));
            }
            warn!(court_id = %case.court_id, "Case court not in hierarchy");
            outcome.warnings.push(Warning::HierarchyUnknown {
                court_id: case.court_id.clone(),
            });
        }
        outcome.warnings.extend(self.statuses.register(case)?);
        Ok(outcome)
    }

    /// Insert a citation edge and apply its status consequences.
    #[instrument(skip(self, edge), fields(from = %edge.from, to = %edge.to, kind = %edge.kind))]
    pub fn ingest_citation(&self, edge: CitationEdge) -> Result<IngestOutcome, ValidationError> {
        if edge.is_self_loop() {
            return Err(ValidationError::SelfCitation(edge.from));
        }
        if self.config.require_known_cases_for_citation {
            for case_id in [&edge.from, &edge.to] {
                if !self.statuses.contains(case_id) {
                    return Err(ValidationError::UnknownCase(case_id.clone()));
                }
            }
        }

        let citing_date = self.statuses.decision_date(&edge.from);
        let effect = self
            .statuses
            .record_citation(&edge, citing_date, || self.citations.add_citation(edge.clone()))?;
        Ok(IngestOutcome {
            warnings: effect.warnings,
            events: effect.events,
            superseded: None,
        })
    }

    pub fn deprecate_case(
        &self,
        case_id: &CaseId,
        reason: &str,
        change_date: NaiveDate,
    ) -> Result<StatusChangeEvent, ValidationError> {
        self.statuses.deprecate(case_id, reason, change_date)
    }

    pub fn mark_distinguished(
        &self,
        case_id: &CaseId,
        reason: &str,
        change_date: NaiveDate,
    ) -> Result<StatusChangeEvent, ValidationError> {
        self.statuses.mark_distinguished(case_id, reason, change_date)
    }
}
