//! # Architecture Ports
//!
//! Hardware tick sources. The scheduler core is target-independent; a port
//! only has to provide a [`Clock`](crate::clock::Clock). Other cores get a
//! sibling module.

pub mod cortex_m4;
