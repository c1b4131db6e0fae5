//! Validation Adapter: merges validator results into the cell state store.
//!
//! The external validator reports one status (and optional message) per
//! processed row and validatable column, as a result frame with companion
//! columns: for a dataset column `Player` the frame carries
//! `Player__status` and optionally `Player__message`. An optional `__row`
//! column maps result rows onto dataset rows; without it the mapping is
//! positional.
//!
//! The adapter writes a full replacement `CellFullState` for every
//! (row, column) pair present in the result, including cells that became
//! fine. Skipping now-valid cells would leave a stale INVALID annotation
//! in the store forever, because the store's diff only sees keys that are
//! explicitly supplied.

mod error;

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::{AnyValue, Column, DataFrame};

use gridmend_model::{
    CellFullState, CellKey, Generation, ValidationStatus, value_to_string, value_to_usize,
};
use gridmend_store::CellStateStore;

pub use error::{Result, ValidateError};

/// Suffix of per-column status columns in a validator result frame.
pub const STATUS_SUFFIX: &str = "__status";
/// Suffix of per-column message columns in a validator result frame.
pub const MESSAGE_SUFFIX: &str = "__message";
/// Optional dataset-row index column for partial results.
pub const ROW_INDEX_COLUMN: &str = "__row";

/// One validator run, stamped with the dataset generation it ran against.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub generation: Generation,
    pub frame: DataFrame,
}

impl ValidationOutcome {
    pub fn new(generation: Generation, frame: DataFrame) -> Self {
        Self { generation, frame }
    }
}

/// Translates validator result frames into store writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationAdapter;

impl ValidationAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Merge one validator result into the store.
    ///
    /// Returns the keys whose state actually changed. A malformed or stale
    /// payload is logged and treated as a no-op, never raised.
    pub fn apply(
        &self,
        store: &mut CellStateStore,
        outcome: &ValidationOutcome,
    ) -> BTreeSet<CellKey> {
        match self.build_changes(store, outcome) {
            Ok(changes) => store.update_states(changes),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring validation result");
                BTreeSet::new()
            }
        }
    }

    fn build_changes(
        &self,
        store: &CellStateStore,
        outcome: &ValidationOutcome,
    ) -> Result<BTreeMap<CellKey, CellFullState>> {
        let store_generation = store.generation();
        if outcome.generation != store_generation {
            return Err(ValidateError::StaleGeneration {
                payload: outcome.generation.value(),
                store: store_generation.value(),
            });
        }

        let df = &outcome.frame;
        if df.height() == 0 || df.width() == 0 {
            return Err(ValidateError::UnusableResult {
                reason: "empty result frame".to_string(),
            });
        }

        let row_map = resolve_row_map(df)?;
        let mut changes = BTreeMap::new();
        let mut matched_columns = 0usize;

        for name in df.get_column_names() {
            let name = name.as_str();
            let Some(base) = name.strip_suffix(STATUS_SUFFIX) else {
                continue;
            };
            let Some(col_index) = store.column_index(base) else {
                tracing::debug!(column = base, "validation result for unknown column");
                continue;
            };
            let status_column = match df.column(name) {
                Ok(column) => column,
                Err(_) => continue,
            };
            let message_column = df.column(&format!("{base}{MESSAGE_SUFFIX}")).ok();
            matched_columns += 1;

            for (result_idx, &row) in row_map.iter().enumerate() {
                let key = CellKey::new(row, col_index);
                let state = build_replacement(
                    store,
                    key,
                    base,
                    status_column,
                    message_column,
                    result_idx,
                );
                changes.insert(key, state);
            }
        }

        if matched_columns == 0 {
            return Err(ValidateError::UnusableResult {
                reason: "no status column matches a dataset column".to_string(),
            });
        }
        Ok(changes)
    }
}

/// Build the full replacement record for one cell, carrying the stored
/// correction suggestions forward untouched.
fn build_replacement(
    store: &CellStateStore,
    key: CellKey,
    base: &str,
    status_column: &Column,
    message_column: Option<&Column>,
    result_idx: usize,
) -> CellFullState {
    let code = value_to_string(status_column.get(result_idx).unwrap_or(AnyValue::Null));
    let status = match ValidationStatus::parse_code(&code) {
        Some(status) => status,
        None => {
            // Still re-assert the cell so it can never stay stuck INVALID.
            tracing::warn!(
                column = base,
                value = %code,
                "unrecognized validation status code, treating as normal"
            );
            ValidationStatus::Normal
        }
    };
    let message = message_column.and_then(|column| {
        let text = value_to_string(column.get(result_idx).unwrap_or(AnyValue::Null));
        if text.trim().is_empty() { None } else { Some(text) }
    });
    CellFullState::validated(status, message, store.get(key.row, key.col))
}

fn resolve_row_map(df: &DataFrame) -> Result<Vec<usize>> {
    let Ok(column) = df.column(ROW_INDEX_COLUMN) else {
        return Ok((0..df.height()).collect());
    };
    let mut rows = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = column.get(idx).unwrap_or(AnyValue::Null);
        let Some(row) = value_to_usize(&value) else {
            return Err(ValidateError::UnusableResult {
                reason: format!("non-integer {ROW_INDEX_COLUMN} value at result row {idx}"),
            });
        };
        rows.push(row);
    }
    Ok(rows)
}
