//! # Wrapping Timestamps
//!
//! Every free-running hardware counter eventually overflows. A millisecond
//! counter in a `u32` wraps after ~49.7 days, a `u16` one after ~65 seconds.
//! The scheduler must keep deciding "is it time yet?" correctly across that
//! boundary, so it never compares two timestamps with `>=`.
//!
//! ## Sign-Bit Ordering
//!
//! Instead it subtracts in the unsigned domain and inspects the top bit:
//!
//! ```text
//!   now - deadline  (wrapping)
//!   ┌─┬───────────────────────┐
//!   │s│        magnitude      │   s == 0  → deadline reached
//!   └─┴───────────────────────┘   s == 1  → deadline still ahead
//! ```
//!
//! This is modular ordering: it is correct whenever the true distance between
//! the two instants is below half the counter range. That bound is
//! [`Timestamp::MAX_INTERVAL`], and it is a documented precondition rather
//! than something checked at run time.

use core::fmt;

/// An unsigned, wrapping tick count as produced by a [`Clock`](crate::clock::Clock).
///
/// Implemented for `u16`, `u32` and `u64`. The associated `Signed` type is the
/// same-width signed integer used for delays, where a negative value means
/// "already overdue".
pub trait Timestamp: Copy + Eq + Ord + fmt::Debug + 'static {
    /// Same-width signed integer used for delays.
    type Signed: Copy + Ord + fmt::Debug;

    /// The zero instant.
    const ZERO: Self;

    /// Largest interval that still orders correctly (half the range, minus one).
    const MAX_INTERVAL: Self;

    /// Delay reported for something that will never become due.
    const NEVER: Self::Signed;

    /// Counter width in bits.
    const BITS: u32;

    /// Modular addition.
    fn wrapping_add(self, rhs: Self) -> Self;

    /// Modular subtraction.
    fn wrapping_sub(self, rhs: Self) -> Self;

    /// Reinterpret the bit pattern as the same-width signed integer.
    fn reinterpret(self) -> Self::Signed;

    /// Convert a signed interval, clamping negatives to zero and anything past
    /// [`MAX_INTERVAL`](Self::MAX_INTERVAL) down to it.
    fn clamp_signed(raw: i64) -> Self;

    /// True if `self` is at or past `deadline` in modular order.
    #[inline]
    fn has_reached(self, deadline: Self) -> bool {
        // Sign bit of the difference is clear
        self.wrapping_sub(deadline) <= Self::MAX_INTERVAL
    }

    /// Signed distance from `self` to `deadline`. Negative when overdue.
    #[inline]
    fn delay_until(self, deadline: Self) -> Self::Signed {
        deadline.wrapping_sub(self).reinterpret()
    }
}

macro_rules! impl_timestamp {
    ($($unsigned:ty => $signed:ty),* $(,)?) => {
        $(
            impl Timestamp for $unsigned {
                type Signed = $signed;

                const ZERO: Self = 0;
                const MAX_INTERVAL: Self = <$signed>::MAX as $unsigned;
                const NEVER: $signed = <$signed>::MAX;
                const BITS: u32 = <$unsigned>::BITS;

                #[inline]
                fn wrapping_add(self, rhs: Self) -> Self {
                    <$unsigned>::wrapping_add(self, rhs)
                }

                #[inline]
                fn wrapping_sub(self, rhs: Self) -> Self {
                    <$unsigned>::wrapping_sub(self, rhs)
                }

                #[inline]
                fn reinterpret(self) -> $signed {
                    self as $signed
                }

                #[inline]
                fn clamp_signed(raw: i64) -> Self {
                    if raw <= 0 {
                        0
                    } else if raw as u64 > Self::MAX_INTERVAL as u64 {
                        Self::MAX_INTERVAL
                    } else {
                        raw as $unsigned
                    }
                }
            }
        )*
    };
}

impl_timestamp!(u16 => i16, u32 => i32, u64 => i64);

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
