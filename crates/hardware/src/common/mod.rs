//! Common types and constants shared across the simulator.
//!
//! This module collects the building blocks the rest of the crate depends on:
//! 1. **Addressing:** Tag/index/offset decomposition for a given cache geometry.
//! 2. **Constants:** Word size, latencies, core count, and the runaway bound.
//! 3. **Errors:** Configuration and simulation error types.

/// Address decomposition for set-associative caches.
pub mod addr;
/// Fixed hardware constants (latencies, word size, core count).
pub mod constants;
/// Error types for configuration and simulation failures.
pub mod error;

/// A 32-bit physical address, as carried by the memory-reference traces.
pub type Addr = u32;

/// A point on the global simulation clock.
pub type Cycle = u64;
