//! Authoritative per-cell annotation store.
//!
//! The store exclusively owns the `(row, col) -> CellFullState` map.
//! Producers write through [`CellStateStore::update_states`] and consumers
//! learn about changes through the observer registry; nobody holds a
//! long-lived reference into the map itself.

mod observer;
mod store;

pub use observer::{StoreEvent, SubscriberId};
pub use store::{CellStateStore, GridBounds};
