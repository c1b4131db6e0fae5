//! Explicit observer registry for store notifications.
//!
//! An ordered list of subscriber callbacks with deterministic
//! registration-order dispatch and explicit unsubscribe. There is no
//! global event bus; anything that wants notifications subscribes on the
//! store it was handed.

use std::collections::BTreeSet;
use std::fmt;

use gridmend_model::{CellKey, Generation};

/// Notification emitted by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The minimal set of keys whose state actually changed in one write.
    CellsChanged(BTreeSet<CellKey>),
    /// Full invalidate: the dataset was reloaded and every prior key is
    /// meaningless. Not a diff.
    Reset { generation: Generation },
}

/// Handle returned by `subscribe`, used for explicit unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

type Callback = Box<dyn FnMut(&StoreEvent)>;

#[derive(Default)]
pub(crate) struct ObserverRegistry {
    subscribers: Vec<(SubscriberId, Callback)>,
    next_id: u64,
}

impl ObserverRegistry {
    pub(crate) fn subscribe(&mut self, callback: Callback) -> SubscriberId {
        self.next_id += 1;
        let id = SubscriberId(self.next_id);
        self.subscribers.push((id, callback));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    pub(crate) fn emit(&mut self, event: &StoreEvent) {
        for (_, callback) in &mut self.subscribers {
            callback(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
