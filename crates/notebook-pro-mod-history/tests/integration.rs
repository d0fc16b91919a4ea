// Integration tests for the history system.
//
// These tests drive the HistoryStore through realistic editing sessions:
// long undo/redo walks, branch abandonment and eviction at the bound.

use notebook_pro_mod_history::{HistoryConfig, HistoryStore, PushOutcome, Selection, Snapshot};
use proptest::prelude::*;

fn snap(content: &str) -> Snapshot {
    Snapshot::new(content, Selection::caret(content.chars().count()))
}

fn small_store(max_entries: usize) -> HistoryStore {
    HistoryStore::new(&HistoryConfig {
        max_entries,
        ..Default::default()
    })
}

// ── Full Workflow ──────────────────────────────────────────────────────

#[test]
fn test_typing_session_undo_all_redo_all() {
    let mut store = HistoryStore::default();
    store.push(Snapshot::empty());
    let mut text = String::new();
    for word in ["the", " quick", " brown", " fox"] {
        text.push_str(word);
        store.push(snap(&text));
    }
    assert_eq!(store.len(), 5);

    let mut seen = Vec::new();
    while let Some(s) = store.undo() {
        seen.push(s.content().to_string());
    }
    assert_eq!(
        seen,
        vec!["the quick brown", "the quick", "the", ""]
    );

    let mut seen = Vec::new();
    while let Some(s) = store.redo() {
        seen.push(s.content().to_string());
    }
    assert_eq!(
        seen,
        vec!["the", "the quick", "the quick brown", "the quick brown fox"]
    );
}

#[test]
fn test_branch_abandoned_after_undo_then_edit() {
    let mut store = HistoryStore::default();
    for c in ["A", "B", "C"] {
        store.push(snap(c));
    }
    store.undo();
    store.push(snap("D"));

    let contents: Vec<&str> = store.entries().map(Snapshot::content).collect();
    assert_eq!(contents, vec!["A", "B", "D"]);
    assert_eq!(store.position(), Some(2));
    assert!(store.redo().is_none());

    // A and B are still reachable
    assert_eq!(store.undo().map(Snapshot::content), Some("B"));
    assert_eq!(store.undo().map(Snapshot::content), Some("A"));
}

#[test]
fn test_restored_selection_travels_with_snapshot() {
    let mut store = HistoryStore::default();
    store.push(Snapshot::new("hello", Selection::new(1, 3)));
    store.push(Snapshot::new("hello world", Selection::caret(11)));
    let prev = store.undo().expect("undo");
    assert_eq!(prev.selection(), Selection::new(1, 3));
}

// ── Eviction ───────────────────────────────────────────────────────────

#[test]
fn test_long_session_never_exceeds_bound() {
    let mut store = small_store(10);
    for i in 0..100 {
        let outcome = store.push(snap(&format!("rev {i}")));
        assert!(store.len() <= 10);
        assert_eq!(outcome, PushOutcome::Appended { evicted: i >= 10 });
        assert_eq!(store.position(), Some(store.len() - 1));
    }
    assert_eq!(store.entries().next().map(Snapshot::content), Some("rev 90"));
}

#[test]
fn test_eviction_while_behind_head() {
    let mut store = small_store(3);
    for c in ["a", "b", "c"] {
        store.push(snap(c));
    }
    store.undo();
    store.undo();
    // At "a"; pushing truncates to [a] and appends, no eviction needed
    assert_eq!(store.push(snap("x")), PushOutcome::Appended { evicted: false });
    let contents: Vec<&str> = store.entries().map(Snapshot::content).collect();
    assert_eq!(contents, vec!["a", "x"]);
}

#[test]
fn test_undo_stops_at_oldest_surviving_entry() {
    let mut store = small_store(4);
    for i in 0..8 {
        store.push(snap(&format!("{i}")));
    }
    let mut undone = 0;
    while store.undo().is_some() {
        undone += 1;
    }
    assert_eq!(undone, 3);
    assert_eq!(store.current().map(Snapshot::content), Some("4"));
}

// ── Properties ─────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        cases: 64,
        ..Default::default()
    })]

    /// Undoing n-1 times then redoing n-1 times returns to the newest state,
    /// visiting every intermediate state in order.
    #[test]
    fn prop_undo_redo_reversible(n in 1usize..40) {
        let mut store = small_store(40);
        let states: Vec<String> = (0..n).map(|i| format!("state-{i}")).collect();
        for s in &states {
            store.push(snap(s));
        }

        for i in (0..n - 1).rev() {
            let got = store.undo().map(|s| s.content().to_string());
            prop_assert_eq!(got.as_deref(), Some(states[i].as_str()));
        }
        prop_assert!(store.undo().is_none());

        for state in states.iter().skip(1) {
            let got = store.redo().map(|s| s.content().to_string());
            prop_assert_eq!(got.as_deref(), Some(state.as_str()));
        }
        prop_assert!(store.redo().is_none());
        prop_assert_eq!(store.current().map(Snapshot::content), states.last().map(String::as_str));
    }

    /// Whatever the sequence of pushes and steps, the store stays within its
    /// bound, its position stays valid and no two neighbours are equal.
    #[test]
    fn prop_invariants_hold(
        max_entries in 1usize..12,
        ops in proptest::collection::vec(0u8..6, 0..80),
    ) {
        let mut store = small_store(max_entries);
        for (i, op) in ops.iter().enumerate() {
            match *op {
                0 => { store.undo(); }
                1 => { store.redo(); }
                // Small alphabet so duplicates happen
                _ => { store.push(snap(&format!("{}", i % 3))); }
            }
            prop_assert!(store.len() <= max_entries);
            match store.position() {
                None => prop_assert!(store.is_empty()),
                Some(p) => prop_assert!(p < store.len()),
            }
            let contents: Vec<&str> = store.entries().map(Snapshot::content).collect();
            for pair in contents.windows(2) {
                prop_assert_ne!(pair[0], pair[1]);
            }
        }
    }
}
