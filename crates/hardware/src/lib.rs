//! Shared-memory multiprocessor cache-coherence simulator library.
//!
//! This crate implements a cycle-accurate simulator of a small SMP with private
//! L1 caches kept coherent by a snooping MESI protocol over a single shared bus:
//! 1. **Cores:** One trace-driven core per cache; issues one access per cycle or stalls.
//! 2. **Caches:** S-set x E-way MESI tag arrays with LRU replacement and a single
//!    outstanding miss per cache.
//! 3. **Bus:** Per-core request queues, round-robin arbitration, snoop broadcast,
//!    and latency modeling for memory and cache-to-cache transfers.
//! 4. **Simulation:** Trace loading, the lock-step cycle driver, configuration,
//!    and statistics collection.

/// Common types and constants (addresses, cycles, latencies, errors).
pub mod common;
/// Simulator configuration (defaults, hierarchical config structures).
pub mod config;
/// Trace-driven core (issue/stall discipline).
pub mod core;
/// Coherence protocol types (MESI states, bus transactions, snoop results).
pub mod protocol;
/// Per-core L1 cache (tag array, MESI transitions, pending miss).
pub mod cache;
/// Trace loader and the cycle-stepped simulation driver.
pub mod sim;
/// Shared-bus interconnect and system assembly.
pub mod smp;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Top-level driver; construct with `Simulator::new` and call `run`.
pub use crate::sim::Simulator;
/// The bus plus all caches; construct with `System::new`.
pub use crate::smp::System;
