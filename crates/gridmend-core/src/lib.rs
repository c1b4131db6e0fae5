//! Session wiring for the cell annotation subsystem.
//!
//! Everything is constructed once and passed by reference: the store, the
//! two producer adapters, and the scheduler live inside a [`ReviewSession`]
//! handed to whoever needs them. There is no global lookup.

mod error;
mod session;

pub use error::{Result, SessionError};
pub use session::ReviewSession;

pub use gridmend_correct::{CorrectionBatch, CorrectionService};
pub use gridmend_model::{
    CellFullState, CellKey, DataDependency, DataState, DataStateDiff, Generation, Suggestion,
    ValidationStatus,
};
pub use gridmend_schedule::Consumer;
pub use gridmend_store::{StoreEvent, SubscriberId};
pub use gridmend_validate::ValidationOutcome;
