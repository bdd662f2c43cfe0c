//! # tickpoll Configuration
//!
//! Compile-time constants governing group sizing and the Cortex-M tick
//! source. All limits are fixed at compile time; nothing is allocated.

/// Slot count used by [`TaskGroup`](crate::group::TaskGroup) when no
/// explicit capacity is given. Each slot costs two words of RAM (a fat
/// reference) plus the `Option` niche, so keep it close to the real need.
pub const DEFAULT_GROUP_CAPACITY: usize = 15;

/// SysTick frequency in Hz. At 1 kHz one clock tick is one millisecond,
/// which is the unit every interval in the demo firmware is written in.
pub const TICK_HZ: u32 = 1000;

/// System clock frequency in Hz (default for STM32F4 at 16 MHz HSI).
pub const SYSTEM_CLOCK_HZ: u32 = 16_000_000;
