//! Shared fixtures for the lexgraph end-to-end and property tests.

use chrono::NaiveDate;
use lexgraph_engine::{IngestOutcome, LexGraphEngine};
use lexgraph_types::{
    Case, CaseId, CitationEdge, CitationKind, Court, CourtId, EntityKind, EntityVersion, LogicalId,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a test subscriber once. `RUST_LOG` overrides the `warn` default.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().without_time().with_test_writer())
        .try_init();
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn case_id(id: &str) -> CaseId {
    CaseId::new(id)
}

pub fn court_id(id: &str) -> CourtId {
    CourtId::new(id)
}

/// Supreme ⊐ High ⊐ District, registered as "SC", "HC" and "DC".
pub fn court_ladder(engine: &LexGraphEngine) {
    engine
        .ingest_court(Court::new(court_id("DC"), "District Court", 1).unwrap(), &[])
        .unwrap();
    engine
        .ingest_court(Court::new(court_id("HC"), "High Court", 3).unwrap(), &[court_id("DC")])
        .unwrap();
    engine
        .ingest_court(Court::new(court_id("SC"), "Supreme Court", 5).unwrap(), &[court_id("HC")])
        .unwrap();
}

pub fn section(
    logical_id: &str,
    version_number: u32,
    from: NaiveDate,
    to: Option<NaiveDate>,
    text: &str,
) -> EntityVersion {
    let version = EntityVersion::new(
        LogicalId::new(logical_id),
        EntityKind::Section,
        version_number,
        from,
        text.to_string(),
    );
    match to {
        Some(to) => version.with_effective_to(to),
        None => version,
    }
}

pub fn decided(id: &str, court: &str, on: NaiveDate) -> Case {
    Case::new(case_id(id), format!("[{}] {}", on.format("%Y"), id), on, court_id(court))
}

pub fn cite(engine: &LexGraphEngine, from: &str, to: &str, kind: CitationKind) -> IngestOutcome {
    engine
        .ingest_citation(CitationEdge::new(case_id(from), case_id(to), kind))
        .unwrap()
}
