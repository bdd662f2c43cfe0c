//! # tickpoll: Cooperative Interval Scheduling
//!
//! A small scheduler for bare-metal main loops. Work is expressed as
//! periodic tasks; tasks are collected into groups; groups are tasks too,
//! so they nest. One poll call walks the whole tree.
//!
//! ## Overview
//!
//! - **No heap**: groups are fixed-capacity arrays of borrowed members
//! - **No preemption**: a task runs to completion inside the poll pass
//! - **Wraparound-safe**: due checks use sign-bit ordering on a free-running
//!   counter, so the clock may overflow at any time
//! - **Width-generic**: `u32` timestamps by default, `u16` for tiny parts
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │          Application loop / firmware (main.rs)          │
//! ├────────────────────────────────────────────────────────┤
//! │               Poll driver (poll.rs)                     │
//! │        Poller::poll() → run root → next wake-up         │
//! ├──────────────────┬──────────────────┬──────────────────┤
//! │  TaskGroup       │ StaticTaskGroup  │  Task            │
//! │  group.rs        │ static_group.rs  │  task.rs         │
//! │  ─ add/remove    │ ─ fixed members  │  ─ callback      │
//! │  ─ run_or_delay  │ ─ index access   │  ─ enable        │
//! ├──────────────────┴──────────────────┴──────────────────┤
//! │        Schedule trait (task.rs) · Timing (timing.rs)    │
//! │     should_run · till_run · mark_run · run · next_wake  │
//! ├────────────────────────────────────────────────────────┤
//! │   Timestamp (time.rs) · Clock (clock.rs) · compact.rs   │
//! ├────────────────────────────────────────────────────────┤
//! │   Cortex-M4 port (arch/cortex_m4.rs, sync.rs)           │
//! │        SysTick counter · critical sections              │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! let clock = ManualClock::new();
//! let blink = || toggle_led();
//!
//! let led = Task::with_callback(500, &blink);
//! let root: TaskGroup<'_, 4> = TaskGroup::new();
//! root.add(&led);
//!
//! let mut poller = Poller::new(&clock, &root);
//! loop {
//!     let delay = poller.poll();
//!     // sleep up to `delay` ticks
//! }
//! ```
//!
//! ## Memory Model
//!
//! - Members are borrowed (`&'a dyn Schedule`), never owned; the borrow
//!   checker guarantees they outlive their membership
//! - All state sits in `Cell`s, so the tree is reconfigured through shared
//!   references, including from inside a running callback
//! - Trees are `!Sync`: one poller owns one tree. Interrupt handlers talk to
//!   it through [`sync`] on Cortex-M

#![no_std]

pub mod clock;
pub mod compact;
pub mod config;
pub mod error;
pub mod group;
pub mod poll;
pub mod static_group;
pub mod task;
pub mod time;
pub mod timing;

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod arch;
#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod sync;

#[cfg(test)]
mod testing;

pub use clock::{Clock, ManualClock};
pub use compact::{Compact, CompactTask, CompactTaskGroup, StaticCompactGroup};
pub use error::Error;
pub use group::TaskGroup;
pub use poll::Poller;
pub use static_group::StaticTaskGroup;
pub use task::{Callback, Schedule, Task};
pub use time::Timestamp;
pub use timing::{TaskId, Timing};
