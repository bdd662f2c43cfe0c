//! # Run Bookkeeping
//!
//! [`Timing`] is the small state block every schedulable unit carries: the
//! interval, when it last ran, the cached next-run instant, the enabled flag
//! and its identity. [`Task`](crate::task::Task) and both group kinds embed
//! one, and so should any user type implementing
//! [`Schedule`](crate::task::Schedule) by hand.
//!
//! ## Cached Next Run
//!
//! `next_run` is never set directly. It is recomputed as
//! `last_run + interval` (wrapping) by every method that changes either
//! input, so the due check in the hot loop is a single subtraction.
//!
//! ```text
//!      last_run                next_run = last_run + interval
//!  ────────┼───────────────────────┼──────────────────────────►  ticks
//!          │◄────── interval ─────►│
//!          │      till_run > 0     │   till_run <= 0 (due)
//! ```

use core::cell::Cell;
use core::fmt;

use crate::time::Timestamp;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Opaque identity of a schedulable unit: the address of its [`Timing`]
/// block.
///
/// A unit can only join a group through a borrow, and a borrowed value cannot
/// move, so the identity is stable for as long as any group can see it. Two
/// live units never share one. Groups use it to refuse duplicates and to find
/// a member on removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(usize);

impl TaskId {
    /// Identity of the unit owning `timing`.
    #[inline]
    pub fn of<T: Timestamp>(timing: &Timing<T>) -> Self {
        Self(timing as *const Timing<T> as usize)
    }

    /// Raw numeric value, for diagnostics.
    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Timing block
// ---------------------------------------------------------------------------

/// Interval, last run, cached next run and enabled flag.
///
/// A fresh block counts as never run: its first due check compares `now`
/// against `interval` measured from tick zero, without wrapping, so a unit
/// built late in the counter's range is still due at once. The first
/// [`mark_run`](Self::mark_run) switches it to the wraparound-safe check.
/// [`starting_at`](Self::starting_at) anchors the schedule to a given tick
/// instead.
///
/// All fields are `Cell`s: a unit is reconfigured through shared references
/// while a group holds it. That also makes `Timing` `!Sync`, which is the
/// point: a scheduler tree belongs to exactly one poller.
pub struct Timing<T: Timestamp = u32> {
    interval: Cell<T>,
    last_run: Cell<T>,
    next_run: Cell<T>,
    enabled: Cell<bool>,
    started: Cell<bool>,
}

impl<T: Timestamp> Timing<T> {
    /// Enabled, never run (`last_run` = 0), with the given interval.
    ///
    /// An interval of zero makes the unit due on its first check.
    pub fn new(interval: T) -> Self {
        let timing = Self {
            interval: Cell::new(T::ZERO),
            last_run: Cell::new(T::ZERO),
            next_run: Cell::new(T::ZERO),
            enabled: Cell::new(true),
            started: Cell::new(false),
        };
        timing.set_interval(interval);
        timing
    }

    /// Enabled, anchored at `now`: first due at `now + interval`.
    pub fn starting_at(interval: T, now: T) -> Self {
        let timing = Self::new(interval);
        timing.mark_run(now);
        timing
    }

    /// Identity of the owning unit.
    #[inline]
    pub fn id(&self) -> TaskId {
        TaskId::of(self)
    }

    /// Whether the unit has been marked run (or anchored) at least once.
    #[inline]
    pub fn has_started(&self) -> bool {
        self.started.get()
    }

    /// Desired spacing between runs.
    #[inline]
    pub fn interval(&self) -> T {
        self.interval.get()
    }

    /// Tick of the last completed run.
    #[inline]
    pub fn last_run(&self) -> T {
        self.last_run.get()
    }

    /// Cached `last_run + interval`.
    #[inline]
    pub fn next_run(&self) -> T {
        self.next_run.get()
    }

    /// Set the spacing between runs and reschedule from the last run.
    ///
    /// Intervals past [`T::MAX_INTERVAL`](Timestamp::MAX_INTERVAL) cannot be
    /// ordered correctly by the sign-bit test and are clamped to it.
    pub fn set_interval(&self, interval: T) {
        let interval = if interval > T::MAX_INTERVAL {
            log::debug!(
                "task {}: interval {:?} beyond horizon, clamped to {:?}",
                self.id(),
                interval,
                T::MAX_INTERVAL
            );
            T::MAX_INTERVAL
        } else {
            interval
        };
        self.interval.set(interval);
        self.next_run.set(self.last_run.get().wrapping_add(interval));
    }

    /// Set the spacing from a signed value; negative intervals become zero.
    pub fn set_interval_signed(&self, interval: i64) {
        if interval < 0 {
            log::debug!("task {}: negative interval {} clamped to 0", self.id(), interval);
        }
        self.set_interval(T::clamp_signed(interval));
    }

    /// Whether the unit takes part in due checks.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Enable or disable. Timestamps are left alone, so re-enabling resumes the
    /// previous cadence (and fires at once if the next run already passed).
    #[inline]
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    /// True when enabled and `now` has reached the cached next run.
    #[inline]
    pub fn should_run(&self, now: T) -> bool {
        self.enabled.get() && self.reached(now)
    }

    /// Signed ticks until due; [`T::NEVER`](Timestamp::NEVER) while disabled.
    #[inline]
    pub fn till_run(&self, now: T) -> T::Signed {
        if !self.enabled.get() {
            return T::NEVER;
        }
        let delay = now.delay_until(self.next_run.get());
        let zero = T::ZERO.reinterpret();
        if delay > zero && self.reached(now) {
            // Never run and far past its first deadline
            zero
        } else {
            delay
        }
    }

    /// Record a run at `now` and recompute the cached next run.
    #[inline]
    pub fn mark_run(&self, now: T) {
        self.started.set(true);
        self.last_run.set(now);
        self.next_run.set(now.wrapping_add(self.interval.get()));
    }

    fn reached(&self, now: T) -> bool {
        let next_run = self.next_run.get();
        if self.started.get() {
            now.has_reached(next_run)
        } else {
            now >= next_run
        }
    }
}

impl<T: Timestamp> fmt::Debug for Timing<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timing")
            .field("id", &self.id())
            .field("interval", &self.interval.get())
            .field("last_run", &self.last_run.get())
            .field("next_run", &self.next_run.get())
            .field("enabled", &self.enabled.get())
            .field("started", &self.started.get())
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
    fn test_fresh_timing() {
        let timing = Timing::<u32>::new(10);
        assert_eq!(timing.interval(), 10);
        assert_eq!(timing.last_run(), 0);
        assert_eq!(timing.next_run(), 10);
        assert!(timing.is_enabled());
    }

    #[test]
    fn test_zero_interval_due_immediately() {
        let timing = Timing::<u32>::new(0);
        assert!(timing.should_run(0));
        assert_eq!(timing.till_run(0), 0);
    }

    #[test]
    fn test_set_interval_recomputes_from_last_run() {
        let timing = Timing::<u32>::new(10);
        timing.mark_run(100);
        assert_eq!(timing.next_run(), 110);

        timing.set_interval(50);
        assert_eq!(timing.last_run(), 100);
        assert_eq!(timing.next_run(), 150);
    }

    #[test]
    fn test_interval_clamping() {
        let timing = Timing::<u16>::new(u16::MAX);
        assert_eq!(timing.interval(), i16::MAX as u16);

        timing.set_interval_signed(-25);
        assert_eq!(timing.interval(), 0);
        assert_eq!(timing.next_run(), timing.last_run());

        timing.set_interval_signed(300);
        assert_eq!(timing.interval(), 300);
    }

    #[test]
    fn test_mark_run_then_due_after_interval() {
        let timing = Timing::<u32>::new(25);
        timing.mark_run(1_000);
        assert!(!timing.should_run(1_000), "Never due at the instant it ran");
        assert!(!timing.should_run(1_024));
        assert!(timing.should_run(1_025));
        assert_eq!(timing.till_run(1_000), 25);
        assert_eq!(timing.till_run(1_030), -5);
    }

    #[test]
    fn test_disabled_keeps_bookkeeping() {
        let timing = Timing::<u32>::new(10);
        timing.mark_run(40);
        timing.set_enabled(false);

        assert!(!timing.should_run(1_000));
        assert_eq!(timing.till_run(1_000), i32::MAX);
        assert_eq!(timing.next_run(), 50);

        timing.set_enabled(true);
        assert!(timing.should_run(1_000), "Catches up once after re-enable");
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Timing::<u32>::new(0);
        let b = Timing::<u32>::new(0);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.id(), TaskId::of(&a));
    }

    #[test]
    fn test_ids_stay_distinct_after_many_constructions() {
        let a = Timing::<u32>::new(1);
        // Far more units than a 16-bit counter could number
        for _ in 0..70_000u32 {
            let scratch = Timing::<u32>::new(1);
            assert_ne!(scratch.id(), a.id());
        }
        let b = Timing::<u32>::new(1);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_fresh_unit_due_late_in_counter_range() {
        let wide = Timing::<u32>::new(0);
        assert!(wide.should_run(3_000_000_000));
        assert_eq!(wide.till_run(3_000_000_000), 0);

        let narrow = Timing::<u16>::new(0);
        assert!(narrow.should_run(40_000));
        assert_eq!(narrow.till_run(40_000), 0);

        let spaced = Timing::<u16>::new(100);
        assert!(!spaced.should_run(99));
        assert!(spaced.should_run(40_000));

        // Once run, the wraparound-safe check takes over
        narrow.mark_run(40_000);
        assert!(narrow.has_started());
        assert!(narrow.should_run(40_000));
        spaced.mark_run(40_000);
        assert!(!spaced.should_run(40_099));
        assert!(spaced.should_run(40_100));
    }

    #[test]
    fn test_starting_at_anchors_schedule() {
        let timing = Timing::<u16>::starting_at(10, 65_530);
        assert!(timing.has_started());
        assert_eq!(timing.next_run(), 4);
        assert!(!timing.should_run(65_535));
        assert!(!timing.should_run(3));
        assert!(timing.should_run(4));
        assert_eq!(timing.till_run(0), 4);
    }
}
