//! # Tasks
//!
//! Defines the schedulable-unit contract ([`Schedule`]) and the plain leaf
//! implementation ([`Task`]). Groups implement the same contract, which is
//! what lets them nest.
//!
//! ## Run Protocol
//!
//! Every poll pass asks each unit the same two questions:
//!
//! 1. `should_run(now)`: enabled, and `now` has reached the cached next run?
//! 2. if so, `run(now)`: `execute(now)` followed by exactly one `mark_run(now)`
//!
//! `run` is a provided method. Implementors override `execute` and leave `run`
//! alone, so the bookkeeping step cannot be forgotten.
//!
//! ## State Machine
//!
//! ```text
//!   ┌──────────┐  now >= next_run && enabled   ┌─────────┐
//!   │   Idle   │ ────────────────────────────► │   Due   │
//!   └──────────┘                               └─────────┘
//!        ▲                                          │ run(now)
//!        │          mark_run(now)             ┌─────────┐
//!        └─────────────────────────────────── │ Running │
//!                                             └─────────┘
//! ```
//!
//! There is no terminal state. Disabling only blocks the Idle → Due edge.

use core::cell::Cell;
use core::fmt;

use crate::time::Timestamp;
use crate::timing::{TaskId, Timing};

// ---------------------------------------------------------------------------
// Schedulable-unit contract
// ---------------------------------------------------------------------------

/// Capability shared by tasks, groups and user-defined units.
///
/// Implementors provide their [`Timing`] block and an `execute` body; every
/// other method has a default built on those two. Groups additionally
/// override [`next_wake`](Schedule::next_wake) to look through to their
/// members.
pub trait Schedule<T: Timestamp = u32> {
    /// Interval, timestamps, enabled flag and identity of this unit.
    fn timing(&self) -> &Timing<T>;

    /// The unit's action. Must not call `mark_run`; [`run`](Schedule::run)
    /// does that afterwards.
    fn execute(&self, now: T);

    /// Stable identity, used by groups for de-duplication and removal.
    #[inline]
    fn id(&self) -> TaskId {
        self.timing().id()
    }

    /// Enabled and due at `now`.
    #[inline]
    fn should_run(&self, now: T) -> bool {
        self.timing().should_run(now)
    }

    /// Signed ticks until due, or [`T::NEVER`](Timestamp::NEVER) while disabled.
    #[inline]
    fn till_run(&self, now: T) -> T::Signed {
        self.timing().till_run(now)
    }

    /// Record a completed run at `now`.
    #[inline]
    fn mark_run(&self, now: T) {
        self.timing().mark_run(now)
    }

    /// Execute, then mark run. Panics from `execute` propagate unchanged.
    #[inline]
    fn run(&self, now: T) {
        self.execute(now);
        self.mark_run(now);
    }

    /// Ticks until this unit next has work to do. Equal to
    /// [`till_run`](Schedule::till_run) for leaves.
    #[inline]
    fn next_wake(&self, now: T) -> T::Signed {
        self.till_run(now)
    }
}

impl<T, S> Schedule<T> for &S
where
    T: Timestamp,
    S: Schedule<T> + ?Sized,
{
    #[inline]
    fn timing(&self) -> &Timing<T> {
        (**self).timing()
    }

    #[inline]
    fn execute(&self, now: T) {
        (**self).execute(now)
    }

    #[inline]
    fn id(&self) -> TaskId {
        (**self).id()
    }

    #[inline]
    fn should_run(&self, now: T) -> bool {
        (**self).should_run(now)
    }

    #[inline]
    fn till_run(&self, now: T) -> T::Signed {
        (**self).till_run(now)
    }

    #[inline]
    fn mark_run(&self, now: T) {
        (**self).mark_run(now)
    }

    #[inline]
    fn run(&self, now: T) {
        (**self).run(now)
    }

    #[inline]
    fn next_wake(&self, now: T) -> T::Signed {
        (**self).next_wake(now)
    }
}

// ---------------------------------------------------------------------------
// Leaf task
// ---------------------------------------------------------------------------

/// Callback bound to a task or group. Borrowed, never boxed.
pub type Callback<'a> = &'a dyn Fn();

/// A periodic action with an optional callback.
///
/// The callback is borrowed for `'a`; closures that need state capture
/// `Cell`s. A task with no callback still keeps time, which is useful as a
/// pure timer polled with [`Schedule::should_run`].
pub struct Task<'a, T: Timestamp = u32> {
    timing: Timing<T>,
    callback: Cell<Option<Callback<'a>>>,
}

impl<'a, T: Timestamp> Task<'a, T> {
    /// A task with no callback, due `interval` ticks after tick zero.
    pub fn new(interval: T) -> Self {
        Self {
            timing: Timing::new(interval),
            callback: Cell::new(None),
        }
    }

    /// A task with no callback, first due at `now + interval`.
    ///
    /// Use this for units created long after boot whose cadence should count
    /// from creation rather than from tick zero.
    pub fn starting_at(interval: T, now: T) -> Self {
        Self {
            timing: Timing::starting_at(interval, now),
            callback: Cell::new(None),
        }
    }

    /// A task that calls `callback` every `interval` ticks.
    pub fn with_callback(interval: T, callback: Callback<'a>) -> Self {
        let task = Self::new(interval);
        task.on_run(callback);
        task
    }

    /// Bind (or replace) the callback.
    pub fn on_run(&self, callback: Callback<'a>) {
        self.callback.set(Some(callback));
    }

    /// Unbind the callback. The task keeps its schedule.
    pub fn clear_callback(&self) {
        self.callback.set(None);
    }

    /// Whether a callback is bound.
    pub fn has_callback(&self) -> bool {
        self.callback.get().is_some()
    }

    /// Desired spacing between runs.
    #[inline]
    pub fn interval(&self) -> T {
        self.timing.interval()
    }

    /// See [`Timing::set_interval`].
    pub fn set_interval(&self, interval: T) {
        self.timing.set_interval(interval);
    }

    /// See [`Timing::set_interval_signed`].
    pub fn set_interval_signed(&self, interval: i64) {
        self.timing.set_interval_signed(interval);
    }

    /// Tick of the last completed run.
    #[inline]
    pub fn last_run(&self) -> T {
        self.timing.last_run()
    }

    /// Cached next-run tick.
    #[inline]
    pub fn next_run(&self) -> T {
        self.timing.next_run()
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.timing.is_enabled()
    }

    #[inline]
    pub fn set_enabled(&self, enabled: bool) {
        self.timing.set_enabled(enabled);
    }

    pub fn enable(&self) {
        self.set_enabled(true);
    }

    pub fn disable(&self) {
        self.set_enabled(false);
    }
}

impl<T: Timestamp> Default for Task<'_, T> {
    fn default() -> Self {
        Self::new(T::ZERO)
    }
}

impl<T: Timestamp> Schedule<T> for Task<'_, T> {
    #[inline]
    fn timing(&self) -> &Timing<T> {
        &self.timing
    }

    #[inline]
    fn execute(&self, _now: T) {
        if let Some(callback) = self.callback.get() {
            callback();
        }
    }
}

impl<T: Timestamp> fmt::Debug for Task<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("timing", &self.timing)
            .field("has_callback", &self.has_callback())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_invokes_callback_and_marks_run() {
        let hits = Cell::new(0u32);
        let bump = || hits.set(hits.get() + 1);
        let task = Task::with_callback(10u32, &bump);

        assert!(!task.should_run(9));
        assert!(task.should_run(10));

        task.run(10);
        assert_eq!(hits.get(), 1);
        assert_eq!(task.last_run(), 10);
        assert_eq!(task.next_run(), 20);
        assert!(!task.should_run(10), "Not due at the instant it just ran");
        assert!(task.should_run(20));
    }

    #[test]
    fn test_run_without_callback_still_marks_run() {
        let task: Task<'_, u32> = Task::new(5);
        assert!(!task.has_callback());
        task.run(7);
        assert_eq!(task.last_run(), 7);
        assert_eq!(task.next_run(), 12);
    }

    #[test]
    fn test_default_task_due_on_first_check() {
        let task: Task<'_, u32> = Task::default();
        assert_eq!(task.interval(), 0);
        assert!(task.should_run(0));
        assert!(task.should_run(3_000_000_000), "Due even past the half-range horizon");

        let compact: Task<'_, u16> = Task::default();
        assert!(compact.should_run(40_000));
        compact.run(40_000);
        assert_eq!(compact.last_run(), 40_000);
    }

    #[test]
    fn test_starting_at_counts_from_creation() {
        let task: Task<'_, u32> = Task::starting_at(10, 3_000_000_000);
        assert!(!task.should_run(3_000_000_009));
        assert!(task.should_run(3_000_000_010));
        assert_eq!(task.till_run(3_000_000_000), 10);
    }

    #[test]
    fn test_rebind_and_clear_callback() {
        let first = Cell::new(0u32);
        let second = Cell::new(0u32);
        let a = || first.set(first.get() + 1);
        let b = || second.set(second.get() + 1);

        let task = Task::with_callback(0u32, &a);
        task.run(0);
        task.on_run(&b);
        task.run(1);
        task.clear_callback();
        task.run(2);

        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 1);
        assert_eq!(task.last_run(), 2);
    }

    #[test]
    fn test_due_predicate_across_wrap_native_width() {
        let task: Task<'_, u32> = Task::new(10);
        let t0 = u32::MAX - 5;
        task.mark_run(t0);

        for offset in 0..10u32 {
            let now = t0.wrapping_add(offset);
            assert!(!task.should_run(now), "Should not be due at {}", now);
        }
        for offset in 10..20u32 {
            let now = t0.wrapping_add(offset);
            assert!(task.should_run(now), "Should be due at {}", now);
        }
        assert_eq!(task.till_run(u32::MAX), 5);
    }

    #[test]
    fn test_due_predicate_across_wrap_u16() {
        let task: Task<'_, u16> = Task::new(10);
        let t0 = u16::MAX - 5;
        task.mark_run(t0);

        assert!(!task.should_run(u16::MAX));
        assert!(!task.should_run(3));
        assert!(task.should_run(4));
        assert!(task.should_run(100));
        assert_eq!(task.till_run(0), 4);
    }

    #[test]
    fn test_disable_suspends_without_losing_schedule() {
        let hits = Cell::new(0u32);
        let bump = || hits.set(hits.get() + 1);
        let task = Task::with_callback(10u32, &bump);
        task.disable();

        assert!(!task.should_run(500));
        assert_eq!(task.till_run(500), i32::MAX);

        task.enable();
        assert!(task.should_run(500));
        assert_eq!(task.till_run(500), -490);
    }

    // A user type that overrides `execute` and relies on the provided `run`.
    struct Counter {
        timing: Timing<u32>,
        count: Cell<u32>,
        last_seen: Cell<u32>,
    }

    impl Schedule<u32> for Counter {
        fn timing(&self) -> &Timing<u32> {
            &self.timing
        }

        fn execute(&self, now: u32) {
            self.count.set(self.count.get() + 1);
            self.last_seen.set(now);
        }
    }

    #[test]
    fn test_overridden_execute_gets_marked() {
        let counter = Counter {
            timing: Timing::new(3),
            count: Cell::new(0),
            last_seen: Cell::new(0),
        };

        counter.run(3);
        assert_eq!(counter.count.get(), 1);
        assert_eq!(counter.last_seen.get(), 3);
        assert_eq!(counter.timing().next_run(), 6);
        assert!(!counter.should_run(5));
    }

    #[test]
    fn test_schedule_through_trait_object() {
        let task: Task<'_, u32> = Task::new(4);
        let unit: &dyn Schedule<u32> = &task;
        assert_eq!(unit.id(), task.id());
        unit.run(8);
        assert_eq!(task.next_run(), 12);
        assert_eq!((&unit).next_wake(9), 3);
    }
}
