//! End-to-end test: overruling and reinstatement of a precedent.
//!
//! Verifies that:
//! - An Overruled edge from a later case moves the target to Overruled
//! - A later Approved/Followed edge reinstates it, with one event per transition
//! - Endorsements that do not postdate the overruling never reinstate
//! - Ingestion order does not change the outcome
//! - A second overruling is recorded, reported, and reapplied after a reinstatement
//! - Concurrent citations of one case settle like sequential ones

use lexgraph_engine::LexGraphEngine;
use lexgraph_tests::*;
use lexgraph_types::{CaseId, CaseStatus, CitationKind, Warning};
use std::thread;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn three_cases() -> LexGraphEngine {
    init_tracing();
    let engine = LexGraphEngine::default();
    court_ladder(&engine);
    engine.ingest_case(decided("A", "SC", date(1980, 3, 1))).unwrap();
    engine.ingest_case(decided("B", "SC", date(1995, 7, 12))).unwrap();
    engine.ingest_case(decided("C", "SC", date(2008, 11, 4))).unwrap();
    engine
}

/// A (1990) overruled by B (2000), approved by C (2010), overruled by D (2015).
fn two_overrulers() -> LexGraphEngine {
    init_tracing();
    let engine = LexGraphEngine::default();
    court_ladder(&engine);
    for (id, year) in [("A", 1990), ("B", 2000), ("C", 2010), ("D", 2015)] {
        engine.ingest_case(decided(id, "SC", date(year, 1, 1))).unwrap();
    }
    engine
}

const TREATMENTS_OF_A: [(&str, CitationKind); 3] = [
    ("B", CitationKind::Overruled),
    ("C", CitationKind::Approved),
    ("D", CitationKind::Overruled),
];

fn transitions(engine: &LexGraphEngine, id: &str) -> Vec<(CaseStatus, chrono::NaiveDate)> {
    engine
        .status_events(&case_id(id))
        .unwrap()
        .iter()
        .map(|e| (e.new_status, e.change_date))
        .collect()
}

fn overruled_by(engine: &LexGraphEngine, id: &str) -> Option<(CaseId, chrono::NaiveDate)> {
    engine
        .statuses()
        .snapshot(&case_id(id))
        .and_then(|t| t.overruled_by().cloned())
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn overruled_then_reinstated() {
    let engine = three_cases();

    let overruled = cite(&engine, "B", "A", CitationKind::Overruled);
    assert_eq!(overruled.events.len(), 1);
    assert_eq!(engine.current_status(&case_id("A")).unwrap(), CaseStatus::Overruled);

    let approved = cite(&engine, "C", "A", CitationKind::Approved);
    assert_eq!(approved.events.len(), 1);
    assert_eq!(engine.current_status(&case_id("A")).unwrap(), CaseStatus::Active);

    let events = engine.status_events(&case_id("A")).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].previous_status, CaseStatus::Active);
    assert_eq!(events[0].new_status, CaseStatus::Overruled);
    assert_eq!(events[0].triggering_case_id, Some(case_id("B")));
    assert_eq!(events[0].change_date, date(1995, 7, 12));
    assert_eq!(events[1].new_status, CaseStatus::Active);
    assert_eq!(events[1].triggering_case_id, Some(case_id("C")));
    assert_eq!(events[1].sequence, 2);
}

#[test]
fn reverse_ingestion_order_reaches_same_state() {
    let engine = three_cases();

    let approved = cite(&engine, "C", "A", CitationKind::Followed);
    assert!(approved.events.is_empty());

    let overruled = cite(&engine, "B", "A", CitationKind::Overruled);
    assert_eq!(overruled.events.len(), 2);
    assert_eq!(engine.current_status(&case_id("A")).unwrap(), CaseStatus::Active);
    assert_eq!(engine.status_events(&case_id("A")).unwrap().len(), 2);
}

#[test]
fn endorsement_predating_overrule_is_ignored() {
    init_tracing();
    let engine = LexGraphEngine::default();
    court_ladder(&engine);
    engine.ingest_case(decided("A", "SC", date(1980, 1, 1))).unwrap();
    engine.ingest_case(decided("EARLY", "HC", date(1990, 1, 1))).unwrap();
    engine.ingest_case(decided("B", "SC", date(2000, 1, 1))).unwrap();

    cite(&engine, "B", "A", CitationKind::Overruled);
    let outcome = cite(&engine, "EARLY", "A", CitationKind::Approved);

    assert!(outcome.events.is_empty());
    assert!(matches!(
        outcome.warnings.as_slice(),
        [Warning::AnachronisticTreatment { .. }]
    ));
    assert_eq!(engine.current_status(&case_id("A")).unwrap(), CaseStatus::Overruled);
}

#[test]
fn citation_count_alone_never_reinstates() {
    let engine = three_cases();
    cite(&engine, "B", "A", CitationKind::Overruled);
    engine.ingest_case(decided("D", "HC", date(2010, 1, 1))).unwrap();
    cite(&engine, "C", "A", CitationKind::Neutral);
    cite(&engine, "D", "A", CitationKind::Distinguished);
    assert_eq!(engine.current_status(&case_id("A")).unwrap(), CaseStatus::Overruled);
}

#[test]
fn deprecation_requires_a_reason_and_is_manual() {
    let engine = three_cases();
    assert!(engine.deprecate_case(&case_id("A"), "", date(2020, 1, 1)).is_err());

    let event = engine
        .deprecate_case(&case_id("A"), "decided per incuriam", date(2020, 1, 1))
        .unwrap();
    assert!(event.triggering_case_id.is_none());
    assert_eq!(engine.current_status(&case_id("A")).unwrap(), CaseStatus::Deprecated);

    let outcome = cite(&engine, "C", "A", CitationKind::Approved);
    assert!(outcome.events.is_empty());
    assert_eq!(engine.current_status(&case_id("A")).unwrap(), CaseStatus::Deprecated);
}

#[test]
fn distinguished_case_can_still_be_overruled() {
    let engine = three_cases();
    engine
        .mark_distinguished(&case_id("A"), "confined to its facts", date(1990, 1, 1))
        .unwrap();
    assert_eq!(engine.current_status(&case_id("A")).unwrap(), CaseStatus::Distinguished);

    cite(&engine, "B", "A", CitationKind::Overruled);
    assert_eq!(engine.current_status(&case_id("A")).unwrap(), CaseStatus::Overruled);
    assert_eq!(engine.status_events(&case_id("A")).unwrap().len(), 2);
}

#[test]
fn second_overruler_before_or_after_the_endorsement() {
    let in_date_order = two_overrulers();
    for (from, kind) in TREATMENTS_OF_A {
        cite(&in_date_order, from, "A", kind);
    }

    let overrulers_first = two_overrulers();
    cite(&overrulers_first, "B", "A", CitationKind::Overruled);
    let second = cite(&overrulers_first, "D", "A", CitationKind::Overruled);
    assert!(second.events.is_empty());
    assert!(matches!(
        second.warnings.as_slice(),
        [Warning::TreatmentWithoutEffect { status: CaseStatus::Overruled, .. }]
    ));
    assert_eq!(overruled_by(&overrulers_first, "A"), Some((case_id("D"), date(2015, 1, 1))));

    let approved = cite(&overrulers_first, "C", "A", CitationKind::Approved);
    assert_eq!(approved.events.len(), 2);

    let expected = vec![
        (CaseStatus::Overruled, date(2000, 1, 1)),
        (CaseStatus::Active, date(2010, 1, 1)),
        (CaseStatus::Overruled, date(2015, 1, 1)),
    ];
    for engine in [&in_date_order, &overrulers_first] {
        let a = case_id("A");
        assert_eq!(transitions(engine, "A"), expected);
        assert_eq!(engine.current_status(&a).unwrap(), CaseStatus::Overruled);
        assert_eq!(engine.statuses().status_at(&a, date(2012, 6, 1)).unwrap(), CaseStatus::Active);
        assert_eq!(engine.statuses().status_at(&a, date(2016, 1, 1)).unwrap(), CaseStatus::Overruled);
        assert_eq!(overruled_by(engine, "A"), Some((case_id("D"), date(2015, 1, 1))));
    }
}

#[test]
fn every_ingestion_order_ends_overruled_by_the_latest_overruler() {
    let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
    for order in orders {
        let engine = two_overrulers();
        for i in order {
            let (from, kind) = TREATMENTS_OF_A[i];
            cite(&engine, from, "A", kind);
        }
        assert_eq!(
            engine.current_status(&case_id("A")).unwrap(),
            CaseStatus::Overruled,
            "order {:?}",
            order
        );
        assert_eq!(overruled_by(&engine, "A"), Some((case_id("D"), date(2015, 1, 1))));
    }
}

#[test]
fn concurrent_citations_of_one_case_settle_like_sequential() {
    let kind_of = |i: i32| if i % 4 == 3 { CitationKind::Approved } else { CitationKind::Overruled };
    let build = || {
        let engine = LexGraphEngine::default();
        court_ladder(&engine);
        engine.ingest_case(decided("T", "SC", date(1950, 1, 1))).unwrap();
        for i in 0..24 {
            engine
                .ingest_case(decided(&format!("C{:02}", i), "SC", date(1960 + i, 1, 1)))
                .unwrap();
        }
        engine
    };
    init_tracing();

    let sequential = build();
    for i in 0..24 {
        cite(&sequential, &format!("C{:02}", i), "T", kind_of(i));
    }

    let concurrent = build();
    thread::scope(|scope| {
        for i in (0..24).rev() {
            let engine = &concurrent;
            scope.spawn(move || {
                cite(engine, &format!("C{:02}", i), "T", kind_of(i));
            });
        }
    });

    let t = case_id("T");
    assert_eq!(concurrent.citations().edge_count(), 24);
    assert_eq!(concurrent.current_status(&t).unwrap(), sequential.current_status(&t).unwrap());
    assert_eq!(concurrent.current_status(&t).unwrap(), CaseStatus::Active);
    assert_eq!(overruled_by(&concurrent, "T"), overruled_by(&sequential, "T"));

    let events = concurrent.status_events(&t).unwrap();
    assert!(events.windows(2).all(|w| w[0].change_date <= w[1].change_date));
    assert!(events.iter().enumerate().all(|(i, e)| e.sequence == i as u64 + 1));
}
