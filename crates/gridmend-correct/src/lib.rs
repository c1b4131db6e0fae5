//! Correction Adapter: merges corrector suggestion batches into the cell
//! state store and forwards apply requests to the external corrector.
//!
//! Both adapters follow the same clearing rule: presence in a producer
//! payload is an assertion, absence is silence. A key carried with a
//! non-empty list overlays `Correctable`; a key carried with an EMPTY list
//! is an explicit "no suggestions" that clears the overlay and restores the
//! validator-owned status. Keys absent from a batch are untouched.
//!
//! Applying a correction never mutates the store directly. The request is
//! forwarded to the external [`CorrectionService`]; the store only changes
//! once the corrector's next result cycle arrives through the normal
//! adapter path, so an applied correction is eventually consistent.

mod error;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use gridmend_model::{CellFullState, CellKey, Generation, Suggestion};
use gridmend_store::CellStateStore;

pub use error::{CorrectError, Result};

/// The external corrector, as seen from this subsystem.
pub trait CorrectionService {
    /// Called once when the adapter attaches; a failing handshake leaves
    /// the adapter in degraded mode (no corrections, everything else keeps
    /// working).
    fn connect(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Ask the corrector to apply `value` to the cell. Fire-and-forget:
    /// the effect reaches the store via the corrector's next result cycle.
    fn apply_correction(&mut self, key: CellKey, value: &str) -> bool;
}

/// One corrector run, stamped with the dataset generation it ran against.
#[derive(Debug, Clone, Default)]
pub struct CorrectionBatch {
    pub generation: Generation,
    pub suggestions: BTreeMap<CellKey, Vec<Suggestion>>,
}

impl CorrectionBatch {
    pub fn new(generation: Generation) -> Self {
        Self {
            generation,
            suggestions: BTreeMap::new(),
        }
    }

    pub fn with_cell(mut self, key: CellKey, suggestions: Vec<Suggestion>) -> Self {
        self.suggestions.insert(key, suggestions);
        self
    }
}

/// Translates corrector batches into store writes.
#[derive(Default)]
pub struct CorrectionAdapter {
    service: Option<Box<dyn CorrectionService>>,
}

impl CorrectionAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the external corrector. A failed handshake is logged as an
    /// error and leaves the adapter degraded; suggestion batches handed in
    /// by the embedding application still merge normally.
    pub fn connect(&mut self, mut service: Box<dyn CorrectionService>) -> bool {
        match service.connect() {
            Ok(()) => {
                self.service = Some(service);
                true
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    "failed to connect to correction service, corrections disabled"
                );
                false
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.service.is_some()
    }

    /// Merge one suggestion batch into the store.
    ///
    /// Returns the keys whose state actually changed. A stale or empty
    /// batch is logged and treated as a no-op.
    pub fn apply(
        &self,
        store: &mut CellStateStore,
        batch: &CorrectionBatch,
    ) -> BTreeSet<CellKey> {
        match self.build_changes(store, batch) {
            Ok(changes) => store.update_states(changes),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring correction batch");
                BTreeSet::new()
            }
        }
    }

    /// Forward "apply correction" to the external corrector. The store is
    /// untouched here by contract.
    pub fn request_correction(&mut self, key: CellKey, value: &str) -> bool {
        match self.service.as_mut() {
            Some(service) => service.apply_correction(key, value),
            None => {
                tracing::warn!(
                    row = key.row,
                    col = key.col,
                    "correction requested but no corrector is attached"
                );
                false
            }
        }
    }

    fn build_changes(
        &self,
        store: &CellStateStore,
        batch: &CorrectionBatch,
    ) -> Result<BTreeMap<CellKey, CellFullState>> {
        let store_generation = store.generation();
        if batch.generation != store_generation {
            return Err(CorrectError::StaleGeneration {
                payload: batch.generation.value(),
                store: store_generation.value(),
            });
        }
        if batch.suggestions.is_empty() {
            return Err(CorrectError::UnusableBatch {
                reason: "batch carries no cells".to_string(),
            });
        }

        let mut changes = BTreeMap::new();
        for (&key, suggestions) in &batch.suggestions {
            let previous = store.get(key.row, key.col);
            let state = if suggestions.is_empty() {
                CellFullState::without_suggestions(previous)
            } else {
                CellFullState::with_suggestions(suggestions.clone(), previous)
            };
            changes.insert(key, state);
        }
        Ok(changes)
    }
}

impl fmt::Debug for CorrectionAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrectionAdapter")
            .field("connected", &self.is_connected())
            .finish()
    }
}
