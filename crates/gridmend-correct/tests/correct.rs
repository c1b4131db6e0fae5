//! Behavior tests for the correction adapter.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use gridmend_correct::{CorrectionAdapter, CorrectionBatch, CorrectionService};
use gridmend_model::{CellFullState, CellKey, Suggestion, ValidationStatus};
use gridmend_store::{CellStateStore, GridBounds};

fn store_with_players() -> CellStateStore {
    let mut store = CellStateStore::new();
    store.reset(GridBounds::new(
        4,
        vec!["Player".to_string(), "Score".to_string()],
    ));
    store
}

fn seed_invalid(store: &mut CellStateStore, key: CellKey, message: &str) {
    let mut changes = BTreeMap::new();
    changes.insert(
        key,
        CellFullState::validated(ValidationStatus::Invalid, Some(message.to_string()), None),
    );
    store.update_states(changes);
}

#[test]
fn suggestions_force_correctable_and_keep_error() {
    let mut store = store_with_players();
    let adapter = CorrectionAdapter::new();
    let key = CellKey::new(3, 0);
    seed_invalid(&mut store, key, "unknown player");

    let batch = CorrectionBatch::new(store.generation())
        .with_cell(key, vec![Suggestion::new("John Smith")]);
    let changed = adapter.apply(&mut store, &batch);

    assert!(changed.contains(&key));
    let state = store.get(3, 0).unwrap();
    assert_eq!(state.validation_status, ValidationStatus::Correctable);
    assert_eq!(state.error_details.as_deref(), Some("unknown player"));
    assert_eq!(state.correction_suggestions.len(), 1);
    assert_eq!(state.underlying_status, Some(ValidationStatus::Invalid));
}

#[test]
fn empty_list_clears_and_restores_underlying() {
    let mut store = store_with_players();
    let adapter = CorrectionAdapter::new();
    let key = CellKey::new(3, 0);
    seed_invalid(&mut store, key, "unknown player");

    let overlay = CorrectionBatch::new(store.generation())
        .with_cell(key, vec![Suggestion::new("John Smith")]);
    adapter.apply(&mut store, &overlay);

    // The corrector re-ran and no longer suggests anything for the cell:
    // the explicit empty list clears the overlay.
    let clear = CorrectionBatch::new(store.generation()).with_cell(key, Vec::new());
    let changed = adapter.apply(&mut store, &clear);

    assert!(changed.contains(&key));
    let state = store.get(3, 0).unwrap();
    assert_eq!(state.validation_status, ValidationStatus::Invalid);
    assert_eq!(state.error_details.as_deref(), Some("unknown player"));
    assert!(state.correction_suggestions.is_empty());
}

#[test]
fn absent_keys_are_untouched() {
    let mut store = store_with_players();
    let adapter = CorrectionAdapter::new();
    let first = CellKey::new(0, 0);
    let second = CellKey::new(1, 0);
    seed_invalid(&mut store, first, "a");
    seed_invalid(&mut store, second, "b");

    let overlay = CorrectionBatch::new(store.generation())
        .with_cell(first, vec![Suggestion::new("A")])
        .with_cell(second, vec![Suggestion::new("B")]);
    adapter.apply(&mut store, &overlay);

    // The next batch only mentions `first`; `second` keeps its overlay.
    let partial =
        CorrectionBatch::new(store.generation()).with_cell(first, vec![Suggestion::new("A2")]);
    adapter.apply(&mut store, &partial);

    assert_eq!(
        store.get(1, 0).unwrap().validation_status,
        ValidationStatus::Correctable
    );
    assert_eq!(
        store.get(0, 0).unwrap().correction_suggestions[0].corrected_value,
        "A2"
    );
}

#[test]
fn stale_batch_is_discarded() {
    let mut store = store_with_players();
    let adapter = CorrectionAdapter::new();
    let old_generation = store.generation();

    store.reset(GridBounds::new(4, vec!["Player".to_string()]));

    let batch = CorrectionBatch::new(old_generation)
        .with_cell(CellKey::new(0, 0), vec![Suggestion::new("x")]);
    assert!(adapter.apply(&mut store, &batch).is_empty());
    assert!(store.is_empty());
}

struct RecordingCorrector {
    calls: Rc<RefCell<Vec<(CellKey, String)>>>,
    fail_connect: bool,
}

impl CorrectionService for RecordingCorrector {
    fn connect(&mut self) -> anyhow::Result<()> {
        if self.fail_connect {
            anyhow::bail!("corrector unreachable");
        }
        Ok(())
    }

    fn apply_correction(&mut self, key: CellKey, value: &str) -> bool {
        self.calls.borrow_mut().push((key, value.to_string()));
        true
    }
}

#[test]
fn apply_correction_forwards_without_touching_store() {
    let mut store = store_with_players();
    let mut adapter = CorrectionAdapter::new();
    let calls = Rc::new(RefCell::new(Vec::new()));
    assert!(adapter.connect(Box::new(RecordingCorrector {
        calls: Rc::clone(&calls),
        fail_connect: false,
    })));

    let key = CellKey::new(3, 0);
    assert!(adapter.request_correction(key, "John Smith"));
    assert_eq!(calls.borrow().len(), 1);
    assert_eq!(calls.borrow()[0], (key, "John Smith".to_string()));
    // The store only changes once the corrector answers through the normal
    // result path.
    assert!(store.is_empty());
}

#[test]
fn degraded_mode_without_corrector() {
    let mut adapter = CorrectionAdapter::new();
    assert!(!adapter.is_connected());
    assert!(!adapter.request_correction(CellKey::new(0, 0), "x"));
}

#[test]
fn failed_connect_leaves_adapter_degraded() {
    let mut adapter = CorrectionAdapter::new();
    let calls = Rc::new(RefCell::new(Vec::new()));
    assert!(!adapter.connect(Box::new(RecordingCorrector {
        calls,
        fail_connect: true,
    })));
    assert!(!adapter.is_connected());
    assert!(!adapter.request_correction(CellKey::new(0, 0), "x"));
}
