//! Behavior tests for the update scheduler.
//!
//! All tests drive time explicitly through `Instant` arithmetic; nothing
//! sleeps.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use polars::prelude::{DataFrame, NamedFrom, Series};

use gridmend_model::{DataDependency, DataState};
use gridmend_schedule::{Consumer, UpdateScheduler};

struct Recorder {
    name: &'static str,
    log: Rc<RefCell<Vec<String>>>,
    fail: bool,
}

impl Recorder {
    fn boxed(name: &'static str, log: &Rc<RefCell<Vec<String>>>) -> Box<dyn Consumer> {
        Box::new(Self {
            name,
            log: Rc::clone(log),
            fail: false,
        })
    }

    fn failing(name: &'static str, log: &Rc<RefCell<Vec<String>>>) -> Box<dyn Consumer> {
        Box::new(Self {
            name,
            log: Rc::clone(log),
            fail: true,
        })
    }
}

impl Consumer for Recorder {
    fn refresh(&mut self) -> anyhow::Result<()> {
        self.log.borrow_mut().push(self.name.to_string());
        if self.fail {
            anyhow::bail!("refresh failed");
        }
        Ok(())
    }
}

const WINDOW: Duration = Duration::from_millis(50);

fn frame(columns: Vec<(&str, Vec<&str>)>) -> DataFrame {
    DataFrame::new(
        columns
            .into_iter()
            .map(|(name, values)| Series::new(name.into(), values).into())
            .collect(),
    )
    .unwrap()
}

#[test]
fn debounce_coalesces_repeated_schedules() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = UpdateScheduler::new();
    scheduler.register("grid", Recorder::boxed("grid", &log), WINDOW);

    let t0 = Instant::now();
    for offset in [0u64, 10, 20, 30, 40] {
        scheduler.schedule("grid", t0 + Duration::from_millis(offset));
    }

    // Exactly one fire, no matter how far time advances.
    assert_eq!(scheduler.tick(t0 + Duration::from_millis(500)), 1);
    assert_eq!(*log.borrow(), vec!["grid"]);
    assert_eq!(scheduler.tick(t0 + Duration::from_millis(1000)), 0);
}

#[test]
fn reschedule_restarts_the_deadline() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = UpdateScheduler::new();
    scheduler.register("grid", Recorder::boxed("grid", &log), WINDOW);

    let t0 = Instant::now();
    scheduler.schedule("grid", t0);
    scheduler.schedule("grid", t0 + Duration::from_millis(30));

    // The first deadline (t0+50) was cancelled by the restart.
    assert_eq!(scheduler.tick(t0 + Duration::from_millis(60)), 0);
    assert!(scheduler.is_pending("grid"));
    // The restarted deadline (t0+80) fires.
    assert_eq!(scheduler.tick(t0 + Duration::from_millis(80)), 1);
    assert!(!scheduler.is_pending("grid"));
}

#[test]
fn cancel_leaves_consumer_idle() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = UpdateScheduler::new();
    scheduler.register("grid", Recorder::boxed("grid", &log), WINDOW);

    let t0 = Instant::now();
    scheduler.schedule("grid", t0);
    assert!(scheduler.cancel("grid"));
    assert!(!scheduler.cancel("grid"));

    assert_eq!(scheduler.tick(t0 + Duration::from_millis(500)), 0);
    assert!(log.borrow().is_empty());
}

#[test]
fn flush_fires_pending_immediately() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = UpdateScheduler::new();
    scheduler.register("grid", Recorder::boxed("grid", &log), WINDOW);
    scheduler.register("chart", Recorder::boxed("chart", &log), WINDOW);

    let t0 = Instant::now();
    scheduler.schedule("grid", t0);
    scheduler.schedule("chart", t0 + Duration::from_millis(1));

    // Deadlines are nowhere near due; flush bypasses them, in deadline
    // order.
    assert_eq!(scheduler.flush(t0 + Duration::from_millis(2)), 2);
    assert_eq!(*log.borrow(), vec!["grid", "chart"]);
}

#[test]
fn cascade_schedules_child_on_parent_fire() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = UpdateScheduler::new();
    scheduler.register("grid", Recorder::boxed("grid", &log), WINDOW);
    scheduler.register("summary", Recorder::boxed("summary", &log), WINDOW);
    scheduler.register_dependency("grid", "summary");

    let t0 = Instant::now();
    scheduler.schedule("grid", t0);
    assert_eq!(scheduler.tick(t0 + WINDOW), 1);
    assert!(scheduler.is_pending("summary"));

    assert_eq!(scheduler.tick(t0 + WINDOW + WINDOW), 1);
    assert_eq!(*log.borrow(), vec!["grid", "summary"]);
}

#[test]
fn failing_consumer_does_not_block_the_batch() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = UpdateScheduler::new();
    scheduler.register("broken", Recorder::failing("broken", &log), WINDOW);
    scheduler.register("grid", Recorder::boxed("grid", &log), WINDOW);

    let t0 = Instant::now();
    scheduler.schedule("broken", t0);
    scheduler.schedule("grid", t0 + Duration::from_millis(1));

    assert_eq!(scheduler.tick(t0 + Duration::from_millis(100)), 2);
    assert_eq!(*log.borrow(), vec!["broken", "grid"]);
}

#[test]
fn data_dependency_filters_consumers() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = UpdateScheduler::new();
    scheduler.register("score-view", Recorder::boxed("score-view", &log), WINDOW);
    scheduler.register("source-view", Recorder::boxed("source-view", &log), WINDOW);

    let t0 = Instant::now();
    // Feed the baseline before binding dependencies so the initial
    // everything-changed diff does not schedule anyone.
    let baseline = DataState::from_frame(&frame(vec![
        ("Score", vec!["1", "2"]),
        ("Source", vec!["alpha", "beta"]),
    ]));
    scheduler.on_data_state_updated(baseline, t0);

    scheduler.register_data_dependency("score-view", DataDependency::columns(["Score"]));
    scheduler.register_data_dependency("source-view", DataDependency::columns(["Source"]));

    // Only the Source column changes.
    let updated = DataState::from_frame(&frame(vec![
        ("Score", vec!["1", "2"]),
        ("Source", vec!["alpha", "alpha"]),
    ]));
    let diff = scheduler.on_data_state_updated(updated, t0);

    assert!(diff.any_change());
    assert!(!scheduler.is_pending("score-view"));
    assert!(scheduler.is_pending("source-view"));

    scheduler.tick(t0 + WINDOW);
    assert_eq!(*log.borrow(), vec!["source-view"]);
}

#[test]
fn first_data_state_schedules_everything() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut scheduler = UpdateScheduler::new();
    scheduler.register("rows", Recorder::boxed("rows", &log), WINDOW);
    scheduler.register_data_dependency("rows", DataDependency::RowCount);

    let t0 = Instant::now();
    let state = DataState::from_frame(&frame(vec![("A", vec!["x"])]));
    scheduler.on_data_state_updated(state, t0);

    assert!(scheduler.is_pending("rows"));
}

#[test]
fn schedule_for_unknown_consumer_is_a_noop() {
    let mut scheduler = UpdateScheduler::new();
    let t0 = Instant::now();
    scheduler.schedule("ghost", t0);
    assert_eq!(scheduler.tick(t0 + Duration::from_millis(500)), 0);
}
