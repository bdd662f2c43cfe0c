//! # tickpoll Demo Firmware
//!
//! A bare-metal polling loop built from one tree of periodic tasks:
//!
//! | Unit | Kind | Interval | Behavior |
//! |------|------|----------|----------|
//! | `heartbeat` | Task | 500 ms | Toggles the heartbeat state |
//! | `sampler` | Task | 20 ms | Accumulates a (simulated) sensor reading |
//! | `housekeeping` | TaskGroup | 1000 ms | Hook snapshots the sample window |
//! | `report` | Task (in housekeeping) | 0 ms | Runs on every housekeeping pass |
//! | `watchdog` | Task (in housekeeping) | 5000 ms | Rolls the uptime counter |
//!
//! ## Main Loop
//!
//! ```text
//! loop
//!   ├─► delay = poller.poll()       ← one pass over the tree
//!   └─► delay > 0 ? wfi             ← SysTick wakes us every tick
//! ```
//!
//! The `report` task only ever runs as often as its group, which shows how a
//! nested group's interval gates its members.

#![no_std]
#![no_main]

use core::cell::Cell;

use cortex_m::asm;
use cortex_m_rt::entry;
use panic_halt as _;

use tickpoll::arch::cortex_m4::SysTickClock;
use tickpoll::{Poller, Task, TaskGroup};

#[entry]
fn main() -> ! {
    let Some(mut cp) = cortex_m::Peripherals::take() else {
        // Only reachable if something else already took the peripherals
        loop {
            asm::wfi();
        }
    };
    let clock = SysTickClock::start(cp.SYST, &mut cp.SCB);

    // --- Application state ---

    let led_on = Cell::new(false);
    let sample_sum = Cell::new(0u32);
    let sample_count = Cell::new(0u32);
    let last_average = Cell::new(0u32);
    let uptime_s = Cell::new(0u32);

    let toggle = || led_on.set(!led_on.get());
    let sample = || {
        // Stand-in for an ADC read
        let reading = 2048u32.wrapping_add(sample_count.get() % 7);
        sample_sum.set(sample_sum.get().wrapping_add(reading));
        sample_count.set(sample_count.get() + 1);
    };
    let snapshot = || {
        let count = sample_count.get();
        if count > 0 {
            last_average.set(sample_sum.get() / count);
        }
        sample_sum.set(0);
        sample_count.set(0);
    };
    let report = || {
        let _average = last_average.get();
    };
    let roll_uptime = || uptime_s.set(uptime_s.get().wrapping_add(5));

    // --- Task tree ---

    let heartbeat = Task::with_callback(500, &toggle);
    let sampler = Task::with_callback(20, &sample);
    let reporter = Task::with_callback(0, &report);
    let watchdog = Task::with_callback(5_000, &roll_uptime);

    let housekeeping: TaskGroup<'_, 4> = TaskGroup::with_interval(1_000);
    housekeeping.on_run(&snapshot);

    let root: TaskGroup<'_, 4> = TaskGroup::new();

    let wired = housekeeping.add(&reporter)
        && housekeeping.add(&watchdog)
        && root.add(&heartbeat)
        && root.add(&sampler)
        && root.add(&housekeeping);
    assert!(wired, "task tree does not fit its groups");

    // --- Poll loop ---

    let mut poller = Poller::new(&clock, &root);
    loop {
        if poller.poll() > 0 {
            asm::wfi();
        }
    }
}
