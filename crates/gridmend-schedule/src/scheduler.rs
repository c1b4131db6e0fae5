//! Debounce scheduler driven by a monotonic-deadline queue.
//!
//! Timers are emulated with a `BinaryHeap` of `(deadline, seq)` entries
//! processed by [`UpdateScheduler::tick`]; rescheduling bumps the
//! sequence number, which lazily cancels the superseded heap entry when it
//! surfaces. The scheduler never reads the clock itself: `schedule`,
//! `tick`, and `flush` take `now` from the caller's event loop, which also
//! keeps the debounce behavior testable without sleeping.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};
use std::fmt;
use std::time::{Duration, Instant};

use gridmend_model::{DataDependency, DataState, DataStateDiff};

use crate::consumer::Consumer;

struct Entry {
    // Taken out while firing so cascades can re-borrow the scheduler.
    consumer: Option<Box<dyn Consumer>>,
    default_window: Duration,
    pending_seq: Option<u64>,
}

impl Entry {
    fn is_pending(&self) -> bool {
        self.pending_seq.is_some()
    }
}

/// Debounces and batches refresh requests, and filters data-dependent
/// consumers against DataState transitions.
///
/// Per consumer the state machine is IDLE -> PENDING -> IDLE: only the
/// last `schedule` call inside a debounce window results in a fire,
/// earlier calls are coalesced away.
#[derive(Default)]
pub struct UpdateScheduler {
    entries: BTreeMap<String, Entry>,
    queue: BinaryHeap<Reverse<(Instant, u64, String)>>,
    next_seq: u64,
    cascades: BTreeMap<String, Vec<String>>,
    data_dependencies: Vec<(String, DataDependency)>,
    last_data_state: Option<DataState>,
}

impl UpdateScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a consumer under a stable id with its default debounce
    /// window. Re-registering an id replaces the consumer and drops any
    /// pending fire.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        consumer: Box<dyn Consumer>,
        default_window: Duration,
    ) {
        let id = id.into();
        self.entries.insert(
            id,
            Entry {
                consumer: Some(consumer),
                default_window,
                pending_seq: None,
            },
        );
    }

    /// Remove a consumer entirely. Cascade edges naming it simply stop
    /// matching.
    pub fn deregister(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Whenever `parent` is fired, `child` is also scheduled (with its own
    /// default window). Used for compound consumers that must refresh
    /// together.
    pub fn register_dependency(&mut self, parent: impl Into<String>, child: impl Into<String>) {
        self.cascades
            .entry(parent.into())
            .or_default()
            .push(child.into());
    }

    /// Bind a consumer to a predicate over DataState transitions; it is
    /// scheduled on `on_data_state_updated` only when the diff matches.
    pub fn register_data_dependency(
        &mut self,
        id: impl Into<String>,
        dependency: DataDependency,
    ) {
        self.data_dependencies.push((id.into(), dependency));
    }

    /// Schedule (or restart) a consumer's debounce timer with its default
    /// window.
    pub fn schedule(&mut self, id: &str, now: Instant) {
        let Some(window) = self.entries.get(id).map(|entry| entry.default_window) else {
            tracing::debug!(consumer = id, "schedule requested for unknown consumer");
            return;
        };
        self.schedule_with(id, window, now);
    }

    /// Schedule (or restart) a consumer's debounce timer with an explicit
    /// window. Restarting cancels the previous deadline; only the last
    /// call inside a window results in a fire.
    pub fn schedule_with(&mut self, id: &str, window: Duration, now: Instant) {
        let Some(entry) = self.entries.get_mut(id) else {
            tracing::debug!(consumer = id, "schedule requested for unknown consumer");
            return;
        };
        self.next_seq += 1;
        entry.pending_seq = Some(self.next_seq);
        self.queue
            .push(Reverse((now + window, self.next_seq, id.to_string())));
    }

    /// Cancel a pending fire without running it; the consumer goes back to
    /// IDLE. Returns whether anything was pending.
    pub fn cancel(&mut self, id: &str) -> bool {
        self.entries
            .get_mut(id)
            .is_some_and(|entry| entry.pending_seq.take().is_some())
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.entries.get(id).is_some_and(Entry::is_pending)
    }

    /// Feed a fresh DataState snapshot. Computes the diff against the
    /// previous snapshot (the very first snapshot counts as
    /// everything-changed) and schedules every consumer whose dependency
    /// matches. Returns the diff.
    pub fn on_data_state_updated(&mut self, state: DataState, now: Instant) -> DataStateDiff {
        let diff = match &self.last_data_state {
            Some(previous) => previous.diff(&state),
            None => DataStateDiff::everything(&state),
        };
        let matched: Vec<String> = self
            .data_dependencies
            .iter()
            .filter(|(_, dependency)| dependency.should_update(&diff))
            .map(|(id, _)| id.clone())
            .collect();
        for id in matched {
            self.schedule(&id, now);
        }
        self.last_data_state = Some(state);
        diff
    }

    pub fn data_state(&self) -> Option<&DataState> {
        self.last_data_state.as_ref()
    }

    /// Fire every consumer whose deadline has passed. Returns the number
    /// of consumers fired.
    pub fn tick(&mut self, now: Instant) -> usize {
        let mut fired = 0;
        while let Some(Reverse((deadline, _, _))) = self.queue.peek() {
            if *deadline > now {
                break;
            }
            let Some(Reverse((_, seq, id))) = self.queue.pop() else {
                break;
            };
            if self.take_pending(&id, seq) {
                self.fire(&id, now);
                fired += 1;
            }
        }
        fired
    }

    /// Synchronously fire everything currently pending, bypassing
    /// debounce, in deadline order. Consumers scheduled as a cascade of a
    /// flushed parent stay pending for the next tick/flush. Returns the
    /// number of consumers fired.
    pub fn flush(&mut self, now: Instant) -> usize {
        let mut batch = Vec::new();
        while let Some(Reverse(item)) = self.queue.pop() {
            batch.push(item);
        }
        let mut fired = 0;
        for (_, seq, id) in batch {
            if self.take_pending(&id, seq) {
                self.fire(&id, now);
                fired += 1;
            }
        }
        fired
    }

    /// Claim a heap entry: true only if it is still the consumer's most
    /// recent schedule. Superseded and cancelled entries fall through.
    fn take_pending(&mut self, id: &str, seq: u64) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) if entry.pending_seq == Some(seq) => {
                entry.pending_seq = None;
                true
            }
            _ => false,
        }
    }

    fn fire(&mut self, id: &str, now: Instant) {
        let Some(mut consumer) = self
            .entries
            .get_mut(id)
            .and_then(|entry| entry.consumer.take())
        else {
            return;
        };
        if let Err(err) = consumer.refresh() {
            tracing::warn!(consumer = id, error = %err, "consumer refresh failed");
        }
        if let Some(entry) = self.entries.get_mut(id) {
            entry.consumer = Some(consumer);
        }
        let children = self.cascades.get(id).cloned().unwrap_or_default();
        for child in children {
            self.schedule(&child, now);
        }
    }
}

impl fmt::Debug for UpdateScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pending = self
            .entries
            .values()
            .filter(|entry| entry.is_pending())
            .count();
        f.debug_struct("UpdateScheduler")
            .field("consumers", &self.entries.len())
            .field("pending", &pending)
            .field("cascades", &self.cascades.len())
            .field("data_dependencies", &self.data_dependencies.len())
            .finish()
    }
}
