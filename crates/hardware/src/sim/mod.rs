//! Trace loading and the cycle-stepped simulation driver.

/// Trace file discovery, opening, and record parsing.
pub mod loader;

/// The lock-step driver: bus tick, core ticks, completion check.
pub mod simulator;

pub use simulator::Simulator;
