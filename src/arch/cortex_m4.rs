//! # Cortex-M4 Tick Source
//!
//! Counts SysTick interrupts in a 32-bit millisecond counter and exposes it as
//! a [`Clock`].
//!
//! ```text
//!   SysTick (TICK_HZ)          main loop
//!   ─────────────────          ──────────────────────────────
//!   TICKS += 1  ──────────►    SysTickClock::now()  (critical section)
//!                                   └─► Poller::poll()
//!                                          └─► wfi while nothing is due
//! ```
//!
//! The counter wraps after 2^32 ticks (~49.7 days at 1 kHz). The scheduler's
//! due check is wraparound-safe, so nothing special happens at that point.
//!
//! ## Interrupt Priority
//!
//! SysTick is put at the lowest priority so it never delays application
//! interrupts. Its handler is a single increment.

use cortex_m::peripheral::scb::SystemHandler;
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::{SCB, SYST};

use crate::clock::Clock;
use crate::config::{SYSTEM_CLOCK_HZ, TICK_HZ};
use crate::sync::Shared;

/// Ticks since [`SysTickClock::start`], wrapping.
static TICKS: Shared<u32> = Shared::new(0);

/// Lowest priority with 4 implemented priority bits.
const SYSTICK_PRIORITY: u8 = 0xF0;

// ---------------------------------------------------------------------------
// Clock handle
// ---------------------------------------------------------------------------

/// Millisecond clock driven by SysTick.
///
/// Owning the `SYST` peripheral makes this a singleton: there is one counter
/// and exactly one thing configuring it.
pub struct SysTickClock {
    _syst: SYST,
}

impl SysTickClock {
    /// Configure SysTick to interrupt at [`TICK_HZ`] from the core clock and
    /// start counting from zero.
    pub fn start(mut syst: SYST, scb: &mut SCB) -> Self {
        let reload = SYSTEM_CLOCK_HZ / TICK_HZ - 1;
        TICKS.set(0);

        syst.set_reload(reload);
        syst.clear_current();
        syst.set_clock_source(SystClkSource::Core);
        // SAFETY: changing SysTick's priority cannot break a critical section;
        // its handler touches nothing but `TICKS`.
        unsafe {
            scb.set_priority(SystemHandler::SysTick, SYSTICK_PRIORITY);
        }
        syst.enable_interrupt();
        syst.enable_counter();

        Self { _syst: syst }
    }
}

impl Clock for SysTickClock {
    type Instant = u32;

    #[inline]
    fn now(&self) -> u32 {
        TICKS.get()
    }
}

// ---------------------------------------------------------------------------
// SysTick handler
// ---------------------------------------------------------------------------

/// SysTick exception handler, linked into the vector table by name.
#[no_mangle]
pub extern "C" fn SysTick() {
    TICKS.update(|ticks| ticks.wrapping_add(1));
}
