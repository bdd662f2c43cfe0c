//! # Interrupt-Safe Sharing
//!
//! Scheduler trees are `!Sync` and belong to the main loop. The only state an
//! interrupt handler shares with them is small and `Copy`, like the tick
//! counter or an event count. [`Shared`] wraps such a value in a
//! `cortex_m::interrupt::Mutex` so both sides go through a critical section.
//!
//! ```ignore
//! static PRESSES: Shared<u32> = Shared::new(0);
//!
//! // EXTI handler
//! PRESSES.update(|n| n.wrapping_add(1));
//!
//! // task callback, main loop
//! let presses = PRESSES.get();
//! ```

use core::cell::Cell;

use cortex_m::interrupt::{self, CriticalSection, Mutex};

/// Run `f` with interrupts disabled, restoring the previous state on exit.
///
/// Keep the body short: every interrupt, SysTick included, waits for it.
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce(&CriticalSection) -> R,
{
    interrupt::free(f)
}

/// A `Copy` value shared between interrupt handlers and the main loop.
pub struct Shared<T: Copy> {
    inner: Mutex<Cell<T>>,
}

impl<T: Copy> Shared<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(Cell::new(value)),
        }
    }

    pub fn get(&self) -> T {
        critical_section(|cs| self.inner.borrow(cs).get())
    }

    pub fn set(&self, value: T) {
        critical_section(|cs| self.inner.borrow(cs).set(value));
    }

    /// Apply `f` to the value in place, atomically; returns the new value.
    pub fn update(&self, f: impl FnOnce(T) -> T) -> T {
        critical_section(|cs| {
            let cell = self.inner.borrow(cs);
            let next = f(cell.get());
            cell.set(next);
            next
        })
    }
}
