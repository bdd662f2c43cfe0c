//! Host-side helpers shared by the unit tests.

extern crate std;

use core::cell::RefCell;
use std::vec::Vec;

/// Route `log` output to the test harness. Safe to call from every test.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Collects the ticks at which a callback fired.
#[derive(Default)]
pub struct Recorder {
    ticks: RefCell<Vec<u32>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, tick: u32) {
        self.ticks.borrow_mut().push(tick);
    }

    pub fn count(&self) -> usize {
        self.ticks.borrow().len()
    }

    pub fn ticks(&self) -> Vec<u32> {
        self.ticks.borrow().clone()
    }
}
