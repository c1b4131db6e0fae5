//! The review session: one loaded dataset, one store, two adapters, one
//! scheduler.

use std::collections::BTreeSet;
use std::fmt;
use std::time::{Duration, Instant};

use polars::prelude::DataFrame;

use gridmend_correct::{CorrectionAdapter, CorrectionBatch, CorrectionService};
use gridmend_model::{CellFullState, CellKey, DataDependency, DataState, DataStateDiff, Generation};
use gridmend_schedule::{Consumer, UpdateScheduler};
use gridmend_store::{CellStateStore, GridBounds, StoreEvent, SubscriberId};
use gridmend_validate::{ValidationAdapter, ValidationOutcome};

use crate::error::{Result, SessionError};

/// Owns the whole annotation subsystem for one loaded dataset at a time.
#[derive(Default)]
pub struct ReviewSession {
    store: CellStateStore,
    validation: ValidationAdapter,
    correction: CorrectionAdapter,
    scheduler: UpdateScheduler,
    dataset: Option<DataFrame>,
}

impl ReviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the external corrector. Returns false (and logs) when the
    /// service handshake fails; the session then runs degraded, with
    /// suggestion batches still merging but apply requests going nowhere.
    pub fn attach_corrector(&mut self, service: Box<dyn CorrectionService>) -> bool {
        self.correction.connect(service)
    }

    /// Load or replace the dataset.
    ///
    /// Resets the store (every prior key is invalid, a new generation
    /// begins) and feeds the new DataState into the scheduler so
    /// data-dependent consumers get scheduled. Returns the DataState diff
    /// against the previously loaded dataset.
    pub fn load_dataset(&mut self, df: DataFrame, now: Instant) -> Result<DataStateDiff> {
        if df.width() == 0 {
            return Err(SessionError::EmptyDataset);
        }
        let state = DataState::from_frame(&df);
        let bounds = GridBounds::new(state.row_count, state.columns.clone());
        self.store.reset(bounds);
        let diff = self.scheduler.on_data_state_updated(state, now);
        tracing::debug!(
            generation = self.store.generation().value(),
            rows = df.height(),
            cols = df.width(),
            "dataset loaded"
        );
        self.dataset = Some(df);
        Ok(diff)
    }

    pub fn dataset(&self) -> Option<&DataFrame> {
        self.dataset.as_ref()
    }

    pub fn generation(&self) -> Generation {
        self.store.generation()
    }

    // === producer side ===

    /// The validator finished a run. Returns the minimal changed-key set;
    /// subscribers are notified by the store itself.
    pub fn validation_complete(&mut self, outcome: &ValidationOutcome) -> BTreeSet<CellKey> {
        self.validation.apply(&mut self.store, outcome)
    }

    /// The corrector produced suggestion lists.
    pub fn correction_suggestions_available(
        &mut self,
        batch: &CorrectionBatch,
    ) -> BTreeSet<CellKey> {
        self.correction.apply(&mut self.store, batch)
    }

    /// Forward an "apply correction" request to the external corrector.
    /// The store is not touched here; the effect arrives through the next
    /// producer cycle.
    pub fn apply_correction(&mut self, row: usize, col: usize, value: &str) -> bool {
        self.correction.request_correction(CellKey::new(row, col), value)
    }

    // === consumer side ===

    pub fn cell_state(&self, row: usize, col: usize) -> Option<&CellFullState> {
        self.store.get(row, col)
    }

    pub fn store(&self) -> &CellStateStore {
        &self.store
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&StoreEvent) + 'static) -> SubscriberId {
        self.store.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.store.unsubscribe(id)
    }

    pub fn register_consumer(
        &mut self,
        id: impl Into<String>,
        consumer: Box<dyn Consumer>,
        default_window: Duration,
    ) {
        self.scheduler.register(id, consumer, default_window);
    }

    pub fn register_dependency(&mut self, parent: impl Into<String>, child: impl Into<String>) {
        self.scheduler.register_dependency(parent, child);
    }

    pub fn register_data_dependency(
        &mut self,
        id: impl Into<String>,
        dependency: DataDependency,
    ) {
        self.scheduler.register_data_dependency(id, dependency);
    }

    pub fn schedule(&mut self, id: &str, now: Instant) {
        self.scheduler.schedule(id, now);
    }

    pub fn cancel(&mut self, id: &str) -> bool {
        self.scheduler.cancel(id)
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.scheduler.is_pending(id)
    }

    /// Advance the cooperative event loop: fire every consumer whose
    /// debounce deadline has passed.
    pub fn tick(&mut self, now: Instant) -> usize {
        self.scheduler.tick(now)
    }

    /// Fire everything pending right now, bypassing debounce. Used where
    /// deterministic immediate consistency is required (snapshots, paints).
    pub fn flush(&mut self, now: Instant) -> usize {
        self.scheduler.flush(now)
    }
}

impl fmt::Debug for ReviewSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReviewSession")
            .field("store", &self.store)
            .field("scheduler", &self.scheduler)
            .field("corrector", &self.correction.is_connected())
            .field("dataset_loaded", &self.dataset.is_some())
            .finish()
    }
}
