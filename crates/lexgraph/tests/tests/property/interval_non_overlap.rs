//! Property tests: accepted versions of one logical id never overlap.
//!
//! Arbitrary windows are offered to the store in arbitrary order. Whatever
//! is accepted must form disjoint windows, and every date resolves to at
//! most one version.

use chrono::{Duration, NaiveDate};
use lexgraph_engine::TemporalIntervalStore;
use lexgraph_tests::*;
use lexgraph_types::{EntityVersion, LogicalId, ValidationError};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn epoch() -> NaiveDate {
    date(1950, 1, 1)
}

/// `(start offset in days, optional length in days)`.
fn arb_window() -> impl Strategy<Value = (i64, Option<i64>)> {
    (0i64..3_000, prop::option::weighted(0.8, 1i64..400))
}

fn version_for(n: u32, (start, len): (i64, Option<i64>)) -> EntityVersion {
    let from = epoch() + Duration::days(start);
    section("S", n, from, len.map(|l| from + Duration::days(l)), "text")
}

fn overlaps(a: &EntityVersion, b: &EntityVersion) -> bool {
    let a_before_b_ends = b.effective_to.map_or(true, |end| a.effective_from < end);
    let b_before_a_ends = a.effective_to.map_or(true, |end| b.effective_from < end);
    a_before_b_ends && b_before_a_ends
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Whatever subset is accepted is pairwise disjoint.
    #[test]
    fn accepted_windows_are_disjoint(windows in prop::collection::vec(arb_window(), 1..30)) {
        let store = TemporalIntervalStore::new();
        for (i, window) in windows.iter().enumerate() {
            let _ = store.put_version(version_for(i as u32 + 1, *window));
        }

        let Some(accepted) = store.snapshot(&LogicalId::new("S")) else {
            return Ok(());
        };
        for (i, a) in accepted.iter().enumerate() {
            for b in &accepted[i + 1..] {
                prop_assert!(!overlaps(a, b), "v{} overlaps v{}", a.version_number, b.version_number);
            }
        }
        prop_assert!(accepted
            .windows(2)
            .all(|pair| pair[0].effective_from < pair[1].effective_from));
    }

    /// Every probe date resolves to the single accepted version covering it.
    #[test]
    fn each_date_resolves_to_at_most_one_version(
        windows in prop::collection::vec(arb_window(), 1..20),
        probes in prop::collection::vec(0i64..3_500, 1..40),
    ) {
        let store = TemporalIntervalStore::new();
        for (i, window) in windows.iter().enumerate() {
            let _ = store.put_version(version_for(i as u32 + 1, *window));
        }
        let id = LogicalId::new("S");
        let accepted = store.snapshot(&id).map(|v| v.to_vec()).unwrap_or_default();

        for offset in probes {
            let day = epoch() + Duration::days(offset);
            let covering: Vec<u32> = accepted
                .iter()
                .filter(|v| v.is_in_force_at(day))
                .map(|v| v.version_number)
                .collect();
            prop_assert!(covering.len() <= 1);
            let resolved = store.resolve_at(&id, day).ok().map(|v| v.version_number);
            prop_assert_eq!(resolved, covering.first().copied());
        }
    }

    /// Re-offering an accepted window under a fresh number is always an overlap.
    #[test]
    fn accepted_window_cannot_be_claimed_twice(windows in prop::collection::vec(arb_window(), 1..15)) {
        let store = TemporalIntervalStore::new();
        for (i, window) in windows.iter().enumerate() {
            let _ = store.put_version(version_for(i as u32 + 1, *window));
        }
        let accepted = store.snapshot(&LogicalId::new("S")).map(|v| v.to_vec()).unwrap_or_default();

        for (i, existing) in accepted.iter().enumerate() {
            let mut copy = existing.clone();
            copy.version_number = 1_000 + i as u32;
            let result = store.put_version(copy);
            let is_overlap = matches!(result, Err(ValidationError::IntervalOverlap { .. }));
            prop_assert!(is_overlap);
        }
        prop_assert_eq!(store.version_count(), accepted.len());
    }
}
