//! Dataset fingerprinting and consumer data dependencies.
//!
//! A `DataState` is a cheap structural fingerprint of the loaded dataset:
//! row count, ordered column names, and a per-column digest. It exists so
//! "did the data change" can be answered without comparing every cell. The
//! digests are fingerprints only, never business logic, so a digest
//! collision (two different column contents with the same digest) is an
//! accepted miss, not a bug.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use polars::prelude::{AnyValue, Column, DataFrame};
use serde::{Deserialize, Serialize};

use crate::value::{is_missing_value, value_to_f64, value_to_string};

/// Per-column statistical digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnDigest {
    Numeric {
        min: Option<f64>,
        max: Option<f64>,
        mean: Option<f64>,
    },
    Categorical {
        distinct: usize,
        most_frequent: Option<String>,
    },
}

impl ColumnDigest {
    /// Digest one column. A column where every non-missing value is numeric
    /// (natively or as parseable text) gets a numeric digest; everything
    /// else is summarized categorically.
    pub fn from_column(column: &Column) -> Self {
        let mut numbers = Vec::new();
        let mut texts = Vec::new();
        let mut all_numeric = true;

        for idx in 0..column.len() {
            let value = column.get(idx).unwrap_or(AnyValue::Null);
            if is_missing_value(&value) {
                continue;
            }
            match value_to_f64(&value) {
                Some(number) => numbers.push(number),
                None => all_numeric = false,
            }
            texts.push(value_to_string(value));
        }

        if all_numeric && !numbers.is_empty() {
            let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
            let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;
            return Self::Numeric {
                min: Some(min),
                max: Some(max),
                mean: Some(mean),
            };
        }

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for text in texts {
            *counts.entry(text).or_insert(0) += 1;
        }
        // Ties break toward the lexicographically smallest value so the
        // digest is deterministic.
        let most_frequent = counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(value, _)| value.clone());
        Self::Categorical {
            distinct: counts.len(),
            most_frequent,
        }
    }
}

/// Structural fingerprint of the whole dataset, created once per load and
/// superseded (never mutated) on each subsequent load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataState {
    pub row_count: usize,
    pub columns: Vec<String>,
    pub digests: BTreeMap<String, ColumnDigest>,
    /// Snapshot time; metadata only, excluded from diffing.
    pub captured_at: DateTime<Utc>,
}

impl DataState {
    pub fn from_frame(df: &DataFrame) -> Self {
        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let mut digests = BTreeMap::new();
        for column in df.get_columns() {
            digests.insert(column.name().to_string(), ColumnDigest::from_column(column));
        }
        Self {
            row_count: df.height(),
            columns,
            digests,
            captured_at: Utc::now(),
        }
    }

    /// Compare this snapshot (the older one) against `newer`.
    pub fn diff(&self, newer: &DataState) -> DataStateDiff {
        let old_set: BTreeSet<&String> = self.columns.iter().collect();
        let new_set: BTreeSet<&String> = newer.columns.iter().collect();

        let new_columns: Vec<String> = newer
            .columns
            .iter()
            .filter(|name| !old_set.contains(name))
            .cloned()
            .collect();
        let removed_columns: Vec<String> = self
            .columns
            .iter()
            .filter(|name| !new_set.contains(name))
            .cloned()
            .collect();
        let columns_changed = self.columns != newer.columns;

        let mut per_column_changed = BTreeMap::new();
        for name in &newer.columns {
            if !old_set.contains(name) {
                continue;
            }
            let changed = self.digests.get(name) != newer.digests.get(name);
            per_column_changed.insert(name.clone(), changed);
        }

        DataStateDiff {
            row_count_changed: self.row_count != newer.row_count,
            columns_changed,
            new_columns,
            removed_columns,
            per_column_changed,
        }
    }
}

/// Result of comparing two `DataState` snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataStateDiff {
    pub row_count_changed: bool,
    pub columns_changed: bool,
    pub new_columns: Vec<String>,
    pub removed_columns: Vec<String>,
    pub per_column_changed: BTreeMap<String, bool>,
}

impl DataStateDiff {
    /// The diff used for the very first snapshot, where there is no
    /// previous state: everything counts as changed.
    pub fn everything(state: &DataState) -> Self {
        Self {
            row_count_changed: true,
            columns_changed: true,
            new_columns: state.columns.clone(),
            removed_columns: Vec::new(),
            per_column_changed: state
                .columns
                .iter()
                .map(|name| (name.clone(), true))
                .collect(),
        }
    }

    pub fn any_change(&self) -> bool {
        self.row_count_changed
            || self.columns_changed
            || self.per_column_changed.values().any(|changed| *changed)
    }
}

/// A declared interest binding one consumer to a subset of DataState
/// transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataDependency {
    /// Depends on the number of rows.
    RowCount,
    /// Depends on the set (or order) of columns.
    ColumnSet,
    /// Depends on the named columns; also fires when one of them is added
    /// or removed, not only when its values change.
    Columns(BTreeSet<String>),
    /// Depends on any change at all.
    Any,
}

impl DataDependency {
    pub fn columns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Columns(names.into_iter().map(Into::into).collect())
    }

    pub fn should_update(&self, diff: &DataStateDiff) -> bool {
        match self {
            Self::RowCount => diff.row_count_changed,
            Self::ColumnSet => diff.columns_changed,
            Self::Columns(names) => names.iter().any(|name| {
                diff.new_columns.contains(name)
                    || diff.removed_columns.contains(name)
                    || diff.per_column_changed.get(name).copied().unwrap_or(false)
            }),
            Self::Any => diff.any_change(),
        }
    }
}
