//! Per-cell annotation records.
//!
//! `CellFullState` is immutable once constructed: every update builds a new
//! record from an incoming partial intent merged over the previous record.
//! The constructors here are the only merge paths, so each producer can only
//! touch the fields it owns.

use serde::{Deserialize, Serialize};

use crate::status::{Suggestion, ValidationStatus};

/// Identity of one grid cell, zero-based, valid only within one dataset
/// generation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CellKey {
    pub row: usize,
    pub col: usize,
}

impl CellKey {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Logical version of the loaded dataset. Bumped on every store reset;
/// producer payloads stamped with an older generation are discarded.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

/// Everything known about one cell's annotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellFullState {
    /// The status the presentation layer shows.
    pub validation_status: ValidationStatus,
    /// The validator-owned status recorded when the corrector overlays
    /// `Correctable`, so clearing suggestions can restore it. `None`
    /// whenever the validator last asserted this cell.
    pub underlying_status: Option<ValidationStatus>,
    /// Human-readable explanation; present only for Invalid / InvalidRow /
    /// Warning statuses.
    pub error_details: Option<String>,
    /// Ordered candidate corrections, possibly empty.
    pub correction_suggestions: Vec<Suggestion>,
}

impl CellFullState {
    /// The implicit state of a cell that has never been written.
    pub fn untouched() -> Self {
        Self::default()
    }

    /// Build the validator-owned replacement of `previous`.
    ///
    /// Status and message come from the validator; suggestions carry forward
    /// unchanged because validation never erases correction data it does
    /// not own. A fine status drops the message even if one was supplied.
    pub fn validated(
        status: ValidationStatus,
        message: Option<String>,
        previous: Option<&CellFullState>,
    ) -> Self {
        let error_details = if status.carries_error() {
            message.filter(|text| !text.trim().is_empty())
        } else {
            None
        };
        Self {
            validation_status: status,
            underlying_status: None,
            error_details,
            correction_suggestions: previous
                .map(|prev| prev.correction_suggestions.clone())
                .unwrap_or_default(),
        }
    }

    /// Overlay a non-empty suggestion list on `previous`.
    ///
    /// Forces `Correctable`, keeps the existing error text, and records the
    /// validator-owned status so [`CellFullState::without_suggestions`] can
    /// restore it later. An empty list delegates to `without_suggestions`.
    pub fn with_suggestions(
        suggestions: Vec<Suggestion>,
        previous: Option<&CellFullState>,
    ) -> Self {
        if suggestions.is_empty() {
            return Self::without_suggestions(previous);
        }
        let underlying = match previous {
            Some(prev) if prev.validation_status == ValidationStatus::Correctable => {
                prev.underlying_status
            }
            Some(prev) => Some(prev.validation_status),
            None => Some(ValidationStatus::Normal),
        };
        Self {
            validation_status: ValidationStatus::Correctable,
            underlying_status: underlying,
            error_details: previous.and_then(|prev| prev.error_details.clone()),
            correction_suggestions: suggestions,
        }
    }

    /// The corrector's explicit "no suggestions" assertion for a cell.
    ///
    /// Clears the suggestion list and restores the validator-owned status
    /// (defaulting to `Normal`); error text is kept because the validator
    /// still owns it.
    pub fn without_suggestions(previous: Option<&CellFullState>) -> Self {
        let status = match previous {
            Some(prev) if prev.validation_status == ValidationStatus::Correctable => {
                prev.underlying_status.unwrap_or_default()
            }
            Some(prev) => prev.validation_status,
            None => ValidationStatus::Normal,
        };
        Self {
            validation_status: status,
            underlying_status: None,
            error_details: previous.and_then(|prev| prev.error_details.clone()),
            correction_suggestions: Vec::new(),
        }
    }

    pub fn has_suggestions(&self) -> bool {
        !self.correction_suggestions.is_empty()
    }
}
