//! # Clock Sources
//!
//! The scheduler never reads hardware itself. Whoever drives it supplies a
//! [`Clock`]: anything that returns a monotonic, wrapping [`Timestamp`].
//!
//! - Any `Fn() -> T` closure is a clock, which covers the usual "read the
//!   millisecond counter" free function.
//! - [`ManualClock`] is advanced by hand; host tests and simulations use it.
//! - [`Compact`](crate::compact::Compact) narrows a `u32` clock for `u16` tasks.
//! - On Cortex-M, [`SysTickClock`](crate::arch::cortex_m4::SysTickClock)
//!   counts SysTick interrupts.

use core::cell::Cell;

use crate::time::Timestamp;

/// A monotonic tick source. Must never go backwards except by wrapping.
pub trait Clock {
    /// Tick type produced by this clock.
    type Instant: Timestamp;

    /// Current tick count.
    fn now(&self) -> Self::Instant;
}

impl<F, T> Clock for F
where
    F: Fn() -> T,
    T: Timestamp,
{
    type Instant = T;

    #[inline]
    fn now(&self) -> T {
        self()
    }
}

// ---------------------------------------------------------------------------
// Manual clock
// ---------------------------------------------------------------------------

/// A clock that only moves when told to.
///
/// Interior mutability lets a callback running inside a pass observe the same
/// clock the driver holds, without `&mut` plumbing.
#[derive(Debug, Default)]
pub struct ManualClock<T: Timestamp = u32> {
    ticks: Cell<T>,
}

impl<T: Timestamp> ManualClock<T> {
    /// Start the clock at `start`.
    pub const fn starting_at(start: T) -> Self {
        Self {
            ticks: Cell::new(start),
        }
    }

    /// Start the clock at zero.
    pub const fn new() -> Self {
        Self::starting_at(T::ZERO)
    }

    /// Jump to an absolute tick value.
    pub fn set(&self, ticks: T) {
        self.ticks.set(ticks);
    }

    /// Move forward by `delta` ticks, wrapping at the type's width.
    pub fn advance(&self, delta: T) -> T {
        let next = self.ticks.get().wrapping_add(delta);
        self.ticks.set(next);
        next
    }
}

impl<T: Timestamp> Clock for ManualClock<T> {
    type Instant = T;

    #[inline]
    fn now(&self) -> T {
        self.ticks.get()
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn read<C: Clock>(clock: &C) -> C::Instant {
        clock.now()
    }

    #[test]
    fn test_manual_clock_advance_wraps() {
        let clock = ManualClock::<u16>::starting_at(u16::MAX - 1);
        assert_eq!(clock.now(), u16::MAX - 1);
        assert_eq!(clock.advance(3), 1);
        assert_eq!(read(&clock), 1);

        clock.set(500);
        assert_eq!(clock.now(), 500);
    }

    #[test]
    fn test_closure_is_a_clock() {
        let ticks = Cell::new(7u32);
        let clock = || ticks.get();
        assert_eq!(read(&clock), 7);
        ticks.set(9);
        assert_eq!(read(&clock), 9);
    }

    #[test]
    fn test_default_starts_at_zero() {
        let clock: ManualClock = ManualClock::default();
        assert_eq!(clock.now(), 0u32);
        assert_eq!(ManualClock::<u64>::new().now(), 0);
    }
}
