//! # Compact Tasks
//!
//! On parts with a few hundred bytes of RAM, three `u32` timestamps per task
//! add up. The compact variants keep every timestamp in a `u16`:
//!
//! | Type | Timestamp | Wraps after | Longest interval |
//! |------|-----------|-------------|------------------|
//! | [`Task`] | `u32` | 2^32 ticks (~49.7 days at 1 kHz) | 2^31 - 1 ticks |
//! | [`CompactTask`] | `u16` | 2^16 ticks (~65.5 s at 1 kHz) | [`COMPACT_HORIZON`] = 32 767 ticks |
//!
//! The due check is the same sign-bit test over 16 bits, so compact tasks are
//! exactly as wraparound-safe, just over a shorter horizon. Intervals must
//! stay well below [`COMPACT_HORIZON`]; a task that is starved for longer than
//! that reads as "far in the future" and silently skips a cycle.
//!
//! A compact tree needs a `u16` clock. [`Compact`] narrows any `u32` clock by
//! truncation, which keeps modular ordering intact.

use crate::clock::Clock;
use crate::config::DEFAULT_GROUP_CAPACITY;
use crate::group::TaskGroup;
use crate::static_group::StaticTaskGroup;
use crate::task::Task;
use crate::time::Timestamp;

/// Longest interval a compact task can be given (half the `u16` range).
pub const COMPACT_HORIZON: u16 = <u16 as Timestamp>::MAX_INTERVAL;

/// A [`Task`] with 16-bit timestamps.
pub type CompactTask<'a> = Task<'a, u16>;

/// A [`TaskGroup`] of compact members.
pub type CompactTaskGroup<'a, const C: usize = DEFAULT_GROUP_CAPACITY> = TaskGroup<'a, C, u16>;

/// A [`StaticTaskGroup`] of compact members, stored inline.
pub type StaticCompactGroup<'a, M, const N: usize> = StaticTaskGroup<'a, M, N, u16>;

/// Adapts a 32-bit clock to the 16-bit compact timestamps.
///
/// Only the low 16 bits survive. Because the compact due check works modulo
/// 2^16 anyway, no ordering information is lost.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compact<C>(pub C);

impl<C> Compact<C> {
    pub const fn new(clock: C) -> Self {
        Self(clock)
    }

    pub fn inner(&self) -> &C {
        &self.0
    }
}

impl<C: Clock<Instant = u32>> Clock for Compact<C> {
    type Instant = u16;

    #[inline]
    fn now(&self) -> u16 {
        self.0.now() as u16
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
