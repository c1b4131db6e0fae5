//! The cell state store proper.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use gridmend_model::{CellFullState, CellKey, Generation};
use serde::Serialize;

use crate::observer::{ObserverRegistry, StoreEvent, SubscriberId};

/// Row count and ordered column names of the loaded dataset generation.
/// Writes outside these bounds are stale and get dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridBounds {
    row_count: usize,
    columns: Vec<String>,
}

impl GridBounds {
    pub fn new(row_count: usize, columns: Vec<String>) -> Self {
        Self { row_count, columns }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn contains(&self, key: CellKey) -> bool {
        key.row < self.row_count && key.col < self.columns.len()
    }
}

/// Owns the authoritative `(row, col) -> CellFullState` map.
///
/// Single-threaded by design: every write runs to completion before control
/// returns to the event loop, so subscribers only ever observe the map with
/// a whole `update_states` batch applied.
#[derive(Default)]
pub struct CellStateStore {
    states: BTreeMap<CellKey, CellFullState>,
    bounds: GridBounds,
    generation: Generation,
    observers: ObserverRegistry,
}

#[derive(Serialize)]
struct SnapshotEntry<'a> {
    row: usize,
    col: usize,
    state: &'a CellFullState,
}

impl CellStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current dataset generation. Producer payloads stamped with an older
    /// generation must be discarded by the adapters.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn bounds(&self) -> &GridBounds {
        &self.bounds
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.bounds.column_index(name)
    }

    /// Stored state for one cell; `None` means the cell has never been
    /// written (implicit untouched/Normal), which is not an error.
    pub fn get(&self, row: usize, col: usize) -> Option<&CellFullState> {
        self.states.get(&CellKey::new(row, col))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Replace the stored record for every supplied key.
    ///
    /// Callers are responsible for having merged in any fields they do not
    /// own (see the adapter crates). Returns exactly the subset of keys
    /// whose resulting value differs from the prior value under structural
    /// equality; no-op writes are dropped from the set and trigger no
    /// notification. Keys outside the current bounds are skipped and
    /// logged, never raised, because producers may race a dataset reload.
    pub fn update_states(
        &mut self,
        changes: BTreeMap<CellKey, CellFullState>,
    ) -> BTreeSet<CellKey> {
        let mut changed = BTreeSet::new();
        for (key, next) in changes {
            if !self.bounds.contains(key) {
                tracing::debug!(
                    row = key.row,
                    col = key.col,
                    rows = self.bounds.row_count(),
                    cols = self.bounds.column_count(),
                    "dropping cell write outside dataset bounds"
                );
                continue;
            }
            let differs = match self.states.get(&key) {
                Some(previous) => *previous != next,
                None => next != CellFullState::untouched(),
            };
            self.states.insert(key, next);
            if differs {
                changed.insert(key);
            }
        }
        if !changed.is_empty() {
            self.observers.emit(&StoreEvent::CellsChanged(changed.clone()));
        }
        changed
    }

    /// Clear everything and start a new generation with fresh bounds.
    ///
    /// Emits `StoreEvent::Reset` (a full invalidate, distinct from a diff)
    /// because row/column indices from the previous dataset are no longer
    /// meaningful.
    pub fn reset(&mut self, bounds: GridBounds) {
        self.states.clear();
        self.bounds = bounds;
        self.generation = self.generation.next();
        tracing::debug!(
            generation = self.generation.value(),
            rows = self.bounds.row_count(),
            cols = self.bounds.column_count(),
            "cell state store reset"
        );
        self.observers.emit(&StoreEvent::Reset {
            generation: self.generation,
        });
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&StoreEvent) + 'static) -> SubscriberId {
        self.observers.subscribe(Box::new(callback))
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Diagnostic JSON dump of every stored annotation, row-major order.
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        let entries: Vec<SnapshotEntry<'_>> = self
            .states
            .iter()
            .map(|(key, state)| SnapshotEntry {
                row: key.row,
                col: key.col,
                state,
            })
            .collect();
        serde_json::to_string_pretty(&entries)
    }
}

impl fmt::Debug for CellStateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellStateStore")
            .field("cells", &self.states.len())
            .field("bounds", &self.bounds)
            .field("generation", &self.generation)
            .field("observers", &self.observers.len())
            .finish()
    }
}
