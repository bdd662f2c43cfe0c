//! # Task Groups
//!
//! A [`TaskGroup`] is a fixed-capacity, runtime-reconfigurable set of
//! schedulable units that is itself schedulable. Put groups inside groups to
//! build a tree and drive the whole tree from one poll call.
//!
//! ## Slot Layout
//!
//! ```text
//!   slots:  [ A ][   ][ B ][ G ][   ][   ] ... [   ]     capacity C
//!             │         │    │
//!             │         │    └── nested TaskGroup (same protocol, depth-first)
//!             └─────────┴─────── &dyn Schedule, borrowed from the caller
//!
//!   cached_count = 3
//! ```
//!
//! - `add` takes the first empty slot, so vacated slots are reused.
//! - Identity ([`TaskId`], the member's address) is unique across occupied
//!   slots.
//! - Slot order is the run order within a pass, nothing more.
//!
//! ## Bounded Run Pass
//!
//! A pass stops scanning once it has visited `cached_count` occupants, so a
//! mostly-empty large group costs little. That relies on every mutating path
//! keeping the count exact. If a callback reshapes the group in the middle of
//! a pass, the early stop is switched off for the rest of that pass so no
//! occupant is skipped.
//!
//! ## Ownership
//!
//! Members are borrowed for `'a`, never owned. The borrow checker guarantees
//! a member outlives its membership, which is the precondition the C-style
//! designs leave to the caller.

use core::cell::Cell;
use core::fmt;

use crate::config::DEFAULT_GROUP_CAPACITY;
use crate::error::Error;
use crate::task::{Callback, Schedule};
use crate::time::Timestamp;
use crate::timing::{TaskId, Timing};

/// Fixed-capacity group of borrowed schedulable units.
///
/// `C` is the slot count (default [`DEFAULT_GROUP_CAPACITY`]); `T` the
/// timestamp width shared by the group and all its members.
pub struct TaskGroup<'a, const C: usize = DEFAULT_GROUP_CAPACITY, T: Timestamp = u32> {
    timing: Timing<T>,
    hook: Cell<Option<Callback<'a>>>,
    slots: [Cell<Option<&'a dyn Schedule<T>>>; C],
    cached_count: Cell<usize>,
    /// Bumped on every occupancy change; lets a pass notice reshaping.
    epoch: Cell<u16>,
}

impl<'a, const C: usize, T: Timestamp> TaskGroup<'a, C, T> {
    /// An empty group that runs its members on every pass.
    pub fn new() -> Self {
        Self::with_interval(T::ZERO)
    }

    /// An empty group that only runs its members every `interval` ticks.
    pub fn with_interval(interval: T) -> Self {
        Self {
            timing: Timing::new(interval),
            hook: Cell::new(None),
            slots: core::array::from_fn(|_| Cell::new(None)),
            cached_count: Cell::new(0),
            epoch: Cell::new(0),
        }
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Add `task`, returning `false` only when the group is full (or `task`
    /// is this group). Adding a task that is already present is a no-op
    /// that succeeds.
    ///
    /// The caller must keep the tree acyclic. Only direct self-membership is
    /// refused; a group reachable from one of its own members (`a` holds `b`,
    /// `b` holds `a`) is accepted and recurses without bound on its first
    /// pass.
    pub fn add(&self, task: &'a dyn Schedule<T>) -> bool {
        self.try_add(task).is_ok()
    }

    /// Add `task` and return its slot index.
    ///
    /// # Errors
    /// - [`Error::GroupFull`] when no slot is free; the group is unchanged.
    /// - [`Error::SelfReference`] when `task` is this group.
    pub fn try_add(&self, task: &'a dyn Schedule<T>) -> Result<usize, Error> {
        let id = task.id();
        if id == self.timing.id() {
            log::warn!("group {}: refusing to contain itself", id);
            return Err(Error::SelfReference);
        }

        if let Some(index) = self.position(id) {
            return Ok(index);
        }

        let Some(index) = self.slots.iter().position(|slot| slot.get().is_none()) else {
            log::warn!("group {}: full ({} slots), task {} refused", self.timing.id(), C, id);
            return Err(Error::GroupFull { capacity: C });
        };

        self.slots[index].set(Some(task));
        self.cached_count.set(self.cached_count.get() + 1);
        self.reshaped();
        log::debug!("group {}: task {} added to slot {}", self.timing.id(), id, index);
        Ok(index)
    }

    /// Remove `task` if present. Returns whether anything was removed.
    pub fn remove<S: Schedule<T> + ?Sized>(&self, task: &S) -> bool {
        self.remove_id(task.id())
    }

    /// Remove the member with identity `id` if present. Unknown identities and
    /// empty groups are a no-op.
    pub fn remove_id(&self, id: TaskId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        self.slots[index].set(None);
        self.cached_count.set(self.cached_count.get() - 1);
        self.reshaped();
        log::debug!("group {}: task {} removed from slot {}", self.timing.id(), id, index);
        true
    }

    /// Empty every slot.
    pub fn clear(&self) {
        for slot in self.slots.iter() {
            slot.set(None);
        }
        self.cached_count.set(0);
        self.reshaped();
        log::debug!("group {}: cleared", self.timing.id());
    }

    /// Whether a member with the same identity as `task` is present.
    pub fn contains<S: Schedule<T> + ?Sized>(&self, task: &S) -> bool {
        self.position(task.id()).is_some()
    }

    /// Raw slot index of the member with identity `id`.
    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.get().is_some_and(|member| member.id() == id))
    }

    fn reshaped(&self) {
        self.epoch.set(self.epoch.get().wrapping_add(1));
    }

    // -----------------------------------------------------------------------
    // Size and lookup
    // -----------------------------------------------------------------------

    /// Number of occupied slots.
    ///
    /// With `use_cache` the maintained counter is returned in O(1). Without
    /// it every slot is scanned and the counter refreshed.
    pub fn size(&self, use_cache: bool) -> usize {
        if use_cache {
            self.cached_count.get()
        } else {
            self.recount()
        }
    }

    /// Cached member count.
    #[inline]
    pub fn len(&self) -> usize {
        self.cached_count.get()
    }

    /// Count occupied slots by scanning, and refresh the cached count.
    pub fn recount(&self) -> usize {
        let count = self.slots.iter().filter(|slot| slot.get().is_some()).count();
        self.cached_count.set(count);
        count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == C
    }

    /// Slot count, fixed by the type.
    #[inline]
    pub const fn capacity(&self) -> usize {
        C
    }

    /// The `index`-th occupied slot in iteration order (not the raw slot).
    pub fn get(&self, index: usize) -> Option<&'a dyn Schedule<T>> {
        self.iter().nth(index)
    }

    /// Members in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &'a dyn Schedule<T>> + '_ {
        self.slots.iter().filter_map(Cell::get)
    }

    // -----------------------------------------------------------------------
    // Group-as-task configuration
    // -----------------------------------------------------------------------

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

    /// A disabled group is skipped by its parent along with all its members.
    pub fn set_enabled(&self, enabled: bool) {
        self.timing.set_enabled(enabled);
    }

    // -----------------------------------------------------------------------
    // Run pass
    // -----------------------------------------------------------------------

    /// Run one pass, then report how long until any member is next due.
    ///
    /// Returns [`T::NEVER`](Timestamp::NEVER) when no member is present or
    /// enabled. The value is advice for the caller's idle strategy; nothing
    /// here sleeps.
    pub fn run_or_delay(&self, now: T) -> T::Signed {
        self.run(now);
        self.member_delay(now)
    }

    /// Smallest [`next_wake`](Schedule::next_wake) across members, recursing
    /// into nested groups.
    pub fn member_delay(&self, now: T) -> T::Signed {
        self.iter()
            .map(|member| member.next_wake(now))
            .min()
            .unwrap_or(T::NEVER)
    }

    fn run_members(&self, now: T) {
        let epoch = self.epoch.get();
        let mut visited = 0;

        for slot in self.slots.iter() {
            if visited >= self.cached_count.get() && self.epoch.get() == epoch {
                break;
            }
            let Some(member) = slot.get() else {
                continue;
            };
            visited += 1;

            if member.should_run(now) {
                log::trace!("group {}: running task {} at {:?}", self.timing.id(), member.id(), now);
                member.run(now);
            }
        }
    }
}

impl<const C: usize, T: Timestamp> Default for TaskGroup<'_, C, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const C: usize, T: Timestamp> Schedule<T> for TaskGroup<'_, C, T> {
    #[inline]
    fn timing(&self) -> &Timing<T> {
        &self.timing
    }

    fn execute(&self, now: T) {
        if let Some(hook) = self.hook.get() {
            hook();
        }
        self.run_members(now);
    }

    fn next_wake(&self, now: T) -> T::Signed {
        nested_wake(&self.timing, self.hook.get().is_some(), now, || self.member_delay(now))
    }
}

/// Wake-up delay of a group seen from its parent.
///
/// A nested group only gets to run its members when it is itself due, so the
/// answer is the later of its own next run and its earliest member. A bound
/// hook counts as work on every one of the group's own runs.
pub(crate) fn nested_wake<T: Timestamp>(
    timing: &Timing<T>,
    has_hook: bool,
    now: T,
    member_delay: impl FnOnce() -> T::Signed,
) -> T::Signed {
    if !timing.is_enabled() {
        return T::NEVER;
    }
    let own = timing.till_run(now);
    let pending = if has_hook { own } else { member_delay() };
    if pending == T::NEVER {
        T::NEVER
    } else {
        own.max(pending)
    }
}

impl<const C: usize, T: Timestamp> fmt::Debug for TaskGroup<'_, C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskGroup")
            .field("timing", &self.timing)
            .field("len", &self.len())
            .field("capacity", &C)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
