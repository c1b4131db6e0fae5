//! Update scheduling: debounced, dependency-filtered consumer refresh.
//!
//! Decouples "the store changed" from "a consumer re-runs now" so a burst
//! of producer activity (a full validation pass immediately followed by a
//! full correction pass) collapses into one refresh per consumer.

mod consumer;
mod scheduler;

pub use consumer::Consumer;
pub use scheduler::UpdateScheduler;
