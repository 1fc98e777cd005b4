//! End-to-end test: reconstructing the law as it stood on a past date.

use lexgraph_engine::{AsOf, EntityRef, LexGraphEngine};
use lexgraph_tests::*;
use lexgraph_types::{CaseStatus, CitationKind, LogicalId, QueryError, VersionStatus};

fn section_377() -> LogicalId {
    LogicalId::new("IPC-377")
}

fn seeded() -> LexGraphEngine {
    init_tracing();
    let engine = LexGraphEngine::default();
    court_ladder(&engine);
    engine
        .ingest_version(section("IPC-377", 1, date(1862, 1, 1), None, "original text"))
        .unwrap();
    engine
        .ingest_case(decided("Naz", "HC", date(2009, 7, 2)).interpreting(section_377()))
        .unwrap();
    engine
        .ingest_case(decided("Koushal", "SC", date(2013, 12, 11)).interpreting(section_377()))
        .unwrap();
    engine
        .ingest_case(decided("Navtej", "SC", date(2018, 9, 6)).interpreting(section_377()))
        .unwrap();
    cite(&engine, "Koushal", "Naz", CitationKind::Overruled);
    cite(&engine, "Navtej", "Koushal", CitationKind::Overruled);
    cite(&engine, "Navtej", "Naz", CitationKind::Approved);
    engine
}

#[test]
fn status_replays_to_any_date() {
    let engine = seeded();
    let naz = EntityRef::from(case_id("Naz"));
    let status_on = |y, m, d| engine.as_of(&naz, date(y, m, d)).unwrap().case_status();

    assert_eq!(status_on(2010, 1, 1), Some(CaseStatus::Active));
    assert_eq!(status_on(2015, 1, 1), Some(CaseStatus::Overruled));
    assert_eq!(status_on(2019, 6, 1), Some(CaseStatus::Active));
    assert!(matches!(
        engine.as_of(&naz, date(2009, 7, 1)),
        Err(QueryError::NotYetExisting { .. })
    ));
}

#[test]
fn as_of_resolves_statute_versions() {
    let engine = seeded();
    engine
        .supersede_version(
            section("IPC-377", 2, date(2018, 9, 6), None, "read down").with_status(VersionStatus::Active),
        )
        .unwrap();
    let sec = EntityRef::from(section_377());

    match engine.as_of(&sec, date(2000, 1, 1)).unwrap() {
        AsOf::Version(v) => assert_eq!(v.version_number, 1),
        other => panic!("expected a version, got {other:?}"),
    }
    assert_eq!(
        engine.as_of(&sec, date(2019, 1, 1)).unwrap().version().map(|v| v.version_number),
        Some(2)
    );
    assert!(matches!(
        engine.as_of(&EntityRef::from(LogicalId::new("IPC-999")), date(2019, 1, 1)),
        Err(QueryError::UnknownEntity(_))
    ));
}

#[test]
fn interpretation_lineage_tracks_good_law() {
    let engine = seeded();

    let in_2015 = engine.interpretation_lineage(&section_377(), date(2015, 1, 1)).unwrap();
    let statuses: Vec<(&str, CaseStatus)> = in_2015
        .interpretations
        .iter()
        .map(|i| (i.case.case_id.as_str(), i.status))
        .collect();
    assert_eq!(
        statuses,
        vec![("Naz", CaseStatus::Overruled), ("Koushal", CaseStatus::Active)]
    );

    let in_2019 = engine.interpretation_lineage(&section_377(), date(2019, 1, 1)).unwrap();
    let good: Vec<&str> = in_2019.good_law().map(|i| i.case.case_id.as_str()).collect();
    assert_eq!(good, vec!["Naz", "Navtej"]);
}

#[test]
fn repeal_supersedes_interpreting_cases_from_its_date() {
    let engine = seeded();
    let outcome = engine
        .supersede_version(
            section("IPC-377", 2, date(2024, 7, 1), None, "repealed").with_status(VersionStatus::Repealed),
        )
        .unwrap();
    // Koushal is already overruled; Naz and Navtej are good law.
    assert_eq!(outcome.events.len(), 2);
    assert_eq!(engine.current_status(&case_id("Navtej")).unwrap(), CaseStatus::Superseded);
    assert_eq!(engine.current_status(&case_id("Koushal")).unwrap(), CaseStatus::Overruled);

    let navtej = EntityRef::from(case_id("Navtej"));
    assert_eq!(
        engine.as_of(&navtej, date(2024, 6, 30)).unwrap().case_status(),
        Some(CaseStatus::Active)
    );
    assert_eq!(
        engine.as_of(&navtej, date(2024, 7, 1)).unwrap().case_status(),
        Some(CaseStatus::Superseded)
    );
}
