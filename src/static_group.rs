//! # Static Task Groups
//!
//! When the task set is known up front, [`StaticTaskGroup`] stores exactly
//! `N` members inline and drops all slot bookkeeping: no occupancy checks, no
//! cached count, no add or remove. It is still a [`Schedule`], so it nests in
//! either kind of group.
//!
//! Members are stored by value. For a heterogeneous set, use
//! `&dyn Schedule<T>` as the member type:
//!
//! ```ignore
//! let members: [&dyn Schedule; 3] = [&blink, &sensors, &watchdog];
//! let group = StaticTaskGroup::new(members);
//! ```

use core::cell::Cell;
use core::fmt;
use core::ops::Index;
use core::slice;

use crate::group::nested_wake;
use crate::task::{Callback, Schedule};
use crate::time::Timestamp;
use crate::timing::Timing;

/// Exactly `N` members of type `M`, fixed at construction.
pub struct StaticTaskGroup<'a, M, const N: usize, T: Timestamp = u32> {
    timing: Timing<T>,
    hook: Cell<Option<Callback<'a>>>,
    members: [M; N],
}

impl<'a, M, const N: usize, T> StaticTaskGroup<'a, M, N, T>
where
    M: Schedule<T>,
    T: Timestamp,
{
    /// A group that runs its members on every pass.
    pub fn new(members: [M; N]) -> Self {
        Self::with_interval(T::ZERO, members)
    }

    /// A group that only runs its members every `interval` ticks.
    pub fn with_interval(interval: T, members: [M; N]) -> Self {
        Self {
            timing: Timing::new(interval),
            hook: Cell::new(None),
            members,
        }
    }

    /// Member count, fixed by the type.
    pub const fn size() -> usize {
        N
    }

    #[inline]
    pub const fn len(&self) -> usize {
        N
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Member at `index`, or `None` outside `[0, N)`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&M> {
        self.members.get(index)
    }

    /// Member at `index` without a bounds check.
    ///
    /// # Safety
    /// `index` must be below `N`. Anything else is undefined behavior.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &M {
        // SAFETY: the caller guarantees `index < N`.
        unsafe { self.members.get_unchecked(index) }
    }

    pub fn members(&self) -> &[M; N] {
        &self.members
    }

    pub fn iter(&self) -> slice::Iter<'_, M> {
        self.members.iter()
    }

    /// Bind a hook that runs at the start of every pass, before any member.
    pub fn on_run(&self, hook: Callback<'a>) {
        self.hook.set(Some(hook));
    }

    pub fn clear_hook(&self) {
        self.hook.set(None);
    }

    #[inline]
    pub fn interval(&self) -> T {
        self.timing.interval()
    }

    /// See [`Timing::set_interval`].
    pub fn set_interval(&self, interval: T) {
        self.timing.set_interval(interval);
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.timing.is_enabled()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.timing.set_enabled(enabled);
    }

    /// Run one pass, then report how long until any member is next due.
    pub fn run_or_delay(&self, now: T) -> T::Signed {
        self.run(now);
        self.member_delay(now)
    }

    /// Smallest [`next_wake`](Schedule::next_wake) across members.
    pub fn member_delay(&self, now: T) -> T::Signed {
        self.members
            .iter()
            .map(|member| member.next_wake(now))
            .min()
            .unwrap_or(T::NEVER)
    }
}

impl<M, const N: usize, T> Schedule<T> for StaticTaskGroup<'_, M, N, T>
where
    M: Schedule<T>,
    T: Timestamp,
{
    #[inline]
    fn timing(&self) -> &Timing<T> {
        &self.timing
    }

    fn execute(&self, now: T) {
        if let Some(hook) = self.hook.get() {
            hook();
        }
        for member in self.members.iter() {
            if member.should_run(now) {
                log::trace!("static group {}: running task {} at {:?}", self.timing.id(), member.id(), now);
                member.run(now);
            }
        }
    }

    fn next_wake(&self, now: T) -> T::Signed {
        nested_wake(&self.timing, self.hook.get().is_some(), now, || self.member_delay(now))
    }
}

/// Panics when `index >= N`.
impl<M, const N: usize, T: Timestamp> Index<usize> for StaticTaskGroup<'_, M, N, T> {
    type Output = M;

    #[inline]
    fn index(&self, index: usize) -> &M {
        &self.members[index]
    }
}

impl<M: fmt::Debug, const N: usize, T: Timestamp> fmt::Debug for StaticTaskGroup<'_, M, N, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTaskGroup")
            .field("timing", &self.timing)
            .field("members", &self.members)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::TaskGroup;
    use crate::task::Task;
    use crate::testing::Recorder;

    #[test]
    fn test_runs_every_due_member_in_order() {
        let order = Recorder::new();
        let first = || order.record(1);
        let second = || order.record(2);
        let third = || order.record(3);

        let group: StaticTaskGroup<'_, Task<'_>, 3> = StaticTaskGroup::new([
            Task::with_callback(10, &first),
            Task::with_callback(30, &second),
            Task::with_callback(10, &third),
        ]);

        group.run(10);
        assert_eq!(order.ticks(), [1, 3]);
        group.run(15);
        assert_eq!(order.ticks(), [1, 3]);
        assert_eq!(group[0].last_run(), 10, "Not due again until 20");

        group.run(30);
        assert_eq!(order.ticks(), [1, 3, 1, 2, 3]);
    }

    #[test]
    fn test_bounds_checked_access() {
        let group: StaticTaskGroup<'_, Task<'_>, 2> =
            StaticTaskGroup::new([Task::new(1), Task::new(2)]);

        assert_eq!(StaticTaskGroup::<Task<'_>, 2, u32>::size(), 2);
        assert_eq!(group.len(), 2);
        assert_eq!(group.get(1).map(|t| t.interval()), Some(2));
        assert!(group.get(2).is_none());
        // SAFETY: 0 < N
        let first = unsafe { group.get_unchecked(0) };
        assert_eq!(first.interval(), 1);
        assert_eq!(group.iter().count(), 2);
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_range_panics() {
        let group: StaticTaskGroup<'_, Task<'_>, 1> = StaticTaskGroup::new([Task::new(1)]);
        let _ = &group[1];
    }

    #[test]
    fn test_heterogeneous_members_and_nesting() {
        let hits = Recorder::new();
        let leaf_hit = || hits.record(1);
        let inner_hit = || hits.record(2);

        let leaf = Task::with_callback(5, &leaf_hit);
        let inner: TaskGroup<'_, 2> = TaskGroup::new();
        let inner_task = Task::with_callback(20, &inner_hit);
        inner.add(&inner_task);

        let members: [&dyn Schedule; 2] = [&leaf, &inner];
        let group: StaticTaskGroup<'_, &dyn Schedule, 2> = StaticTaskGroup::new(members);

        assert_eq!(group.run_or_delay(0), 5);
        assert_eq!(group.run_or_delay(5), 5);
        assert_eq!(hits.ticks(), [1]);
        assert_eq!(group.run_or_delay(20), 5);
        assert_eq!(hits.ticks(), [1, 1, 2]);
    }

    #[test]
    fn test_hook_and_mark_run() {
        let hooks = Recorder::new();
        let hook = || hooks.record(0);

        let group: StaticTaskGroup<'_, Task<'_>, 1> =
            StaticTaskGroup::with_interval(100, [Task::new(1)]);
        group.on_run(&hook);

        assert!(!group.should_run(50));
        assert!(group.should_run(100));
        group.run(100);
        assert_eq!(hooks.count(), 1);
        assert_eq!(group.timing().next_run(), 200);
        assert_eq!(group.next_wake(100), 100, "Hook makes own schedule the wake-up");
    }

    #[test]
    fn test_disabled_members_never_wake() {
        let a = Task::new(5);
        let b = Task::new(9);
        a.disable();
        b.disable();
        let members: [&dyn Schedule; 2] = [&a, &b];
        let group: StaticTaskGroup<'_, &dyn Schedule, 2> = StaticTaskGroup::new(members);
        assert_eq!(group.run_or_delay(0), i32::MAX);
    }
}
