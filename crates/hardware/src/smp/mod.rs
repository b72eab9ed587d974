//! Shared-bus interconnect and system assembly.
//!
//! The bus serializes all coherence traffic; the [`System`] owns the bus and
//! every cache, resolving the bus/cache reference cycle by passing the cache
//! slice into the bus tick instead of storing back-references.

/// System assembly (bus + caches) and coherence auditing.
pub mod builder;

/// The snooping bus: queues, arbitration, snoop broadcast, latency.
pub mod interconnect;

pub use builder::System;
