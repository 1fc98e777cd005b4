//! Property tests: the court hierarchy stays acyclic under arbitrary batches,
//! and a rejected batch leaves the hierarchy exactly as it was.

use lexgraph_engine::CourtHierarchy;
use lexgraph_tests::*;
use lexgraph_types::{Court, CourtId, ValidationError};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn court(i: usize) -> CourtId {
    court_id(&format!("CT{}", i))
}

fn with_courts(n: usize) -> CourtHierarchy {
    let hierarchy = CourtHierarchy::new();
    for i in 0..n {
        hierarchy
            .add_court(Court::new(court(i), format!("Court {}", i), 1).unwrap(), &[])
            .unwrap();
    }
    hierarchy
}

/// Court count plus two batches of `(superior, inferior)` index pairs.
fn arb_batches() -> impl Strategy<Value = (usize, Vec<(usize, usize)>, Vec<(usize, usize)>)> {
    (2usize..10).prop_flat_map(|n| {
        let batch = prop::collection::vec((0..n, 0..n), 0..15);
        (Just(n), batch.clone(), batch)
    })
}

fn edges_of(batch: &[(usize, usize)]) -> Vec<(CourtId, CourtId)> {
    batch.iter().map(|(s, i)| (court(*s), court(*i))).collect()
}

fn assert_acyclic(hierarchy: &CourtHierarchy) -> Result<(), TestCaseError> {
    for (superior, inferior) in hierarchy.edges() {
        prop_assert!(hierarchy.is_binding(&superior, &inferior));
        prop_assert!(
            !hierarchy.is_binding(&inferior, &superior),
            "{} and {} bind each other",
            superior,
            inferior
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// After any sequence of batches no court binds a superior of itself.
    #[test]
    fn hierarchy_never_contains_a_cycle((n, first, second) in arb_batches()) {
        let hierarchy = with_courts(n);
        let _ = hierarchy.load_hierarchy(&edges_of(&first));
        assert_acyclic(&hierarchy)?;
        let _ = hierarchy.load_hierarchy(&edges_of(&second));
        assert_acyclic(&hierarchy)?;
    }

    /// A rejected batch applies none of its edges.
    #[test]
    fn rejected_batch_is_all_or_nothing((n, first, second) in arb_batches()) {
        let hierarchy = with_courts(n);
        let _ = hierarchy.load_hierarchy(&edges_of(&first));
        let before = hierarchy.edges();

        match hierarchy.load_hierarchy(&edges_of(&second)) {
            Ok(_) => {
                let after = hierarchy.edges();
                for edge in edges_of(&second) {
                    prop_assert!(after.contains(&edge));
                }
                prop_assert!(before.iter().all(|e| after.contains(e)));
            }
            Err(err) => {
                let is_cycle = matches!(err, ValidationError::CyclicHierarchy { .. });
                prop_assert!(is_cycle);
                prop_assert_eq!(hierarchy.edges(), before);
            }
        }
    }

    /// Every court binds itself; binding is transitive along loaded edges.
    #[test]
    fn binding_is_reflexive_and_transitive((n, first, _second) in arb_batches()) {
        let hierarchy = with_courts(n);
        let _ = hierarchy.load_hierarchy(&edges_of(&first));

        for a in 0..n {
            prop_assert!(hierarchy.is_binding(&court(a), &court(a)));
            for b in 0..n {
                for c in 0..n {
                    if hierarchy.is_binding(&court(a), &court(b))
                        && hierarchy.is_binding(&court(b), &court(c))
                    {
                        prop_assert!(hierarchy.is_binding(&court(a), &court(c)));
                    }
                }
            }
        }
    }
}
