//! Fixed hardware constants.
//!
//! These values are part of the simulated machine's contract: changing any of
//! them changes every reported cycle count, so they are constants rather than
//! configuration knobs. The configurable geometry (s, E, b) lives in
//! [`crate::config`].

use super::Cycle;

/// Number of cores (and therefore caches and trace files) in the system.
pub const NUM_CORES: usize = 4;

/// Word size in bytes. Trace addresses are word-granular; bus transfer
/// latency is computed per word.
pub const WORD_SIZE: u32 = 4;

/// L1 hit latency in cycles. A hit retires in the cycle it is issued.
pub const L1_HIT_CYCLES: Cycle = 1;

/// Latency of a main-memory fetch or writeback, in cycles.
pub const MEM_ACCESS_CYCLES: Cycle = 100;

/// Per-word cycle factor for a cache-to-cache block transfer. A full block
/// transfer costs this many cycles per word in the block.
pub const C2C_WORD_CYCLES: Cycle = 2;

/// Address width in bits; shifts of `s + b` at or beyond this width collapse
/// the tag to zero.
pub const ADDR_BITS: u32 = 32;

/// Upper bound on the global cycle counter. Exceeding it aborts the run with
/// a diagnostic instead of spinning forever on a buggy input.
pub const MAX_SIM_CYCLES: Cycle = 2_000_000_000;
