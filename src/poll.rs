//! # Poll Driver
//!
//! [`Poller`] is the outermost loop body: it pairs a [`Clock`] with the root
//! of a scheduler tree and turns "what time is it" into one run pass.
//!
//! ## Pass
//!
//! ```text
//! poll()
//!   ├─► now = clock.now()            ← read once, shared by the whole tree
//!   ├─► root.should_run(now)?
//!   │     └─► root.run(now)          ← depth-first through nested groups
//!   └─► root.next_wake(now)          ← advisory delay for the idle strategy
//! ```
//!
//! Every unit in one pass sees the same `now`, so a slow callback cannot
//! make a later sibling look late. The returned delay is only advice; the
//! poller never sleeps. On Cortex-M the firmware loop feeds it to `wfi`.

use crate::clock::Clock;
use crate::task::Schedule;
use crate::time::Timestamp;

/// Drives one scheduler tree from one clock.
pub struct Poller<'a, C, S>
where
    C: Clock,
    S: Schedule<C::Instant> + ?Sized,
{
    clock: &'a C,
    root: &'a S,
    passes: u32,
}

impl<'a, C, S> Poller<'a, C, S>
where
    C: Clock,
    S: Schedule<C::Instant> + ?Sized,
{
    pub fn new(clock: &'a C, root: &'a S) -> Self {
        log::debug!("poller: driving root {}", root.id());
        Self {
            clock,
            root,
            passes: 0,
        }
    }

    /// Run one pass at the clock's current time.
    ///
    /// Returns the signed ticks until the tree next has work; zero or negative
    /// means poll again immediately, [`NEVER`](Timestamp::NEVER) means nothing
    /// is enabled.
    pub fn poll(&mut self) -> <C::Instant as Timestamp>::Signed {
        let now = self.clock.now();
        self.passes = self.passes.wrapping_add(1);

        if self.root.should_run(now) {
            self.root.run(now);
        }
        self.root.next_wake(now)
    }

    pub fn clock(&self) -> &'a C {
        self.clock
    }

    pub fn root(&self) -> &'a S {
        self.root
    }

    /// Number of calls to [`poll`](Self::poll), wrapping.
    pub fn passes(&self) -> u32 {
        self.passes
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
