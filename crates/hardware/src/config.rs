//! Configuration system for the simulator.
//!
//! This module defines the configuration structures used to parameterize a
//! run. It provides:
//! 1. **Defaults:** The fixed machine constants (word size, latencies, core
//!    count) re-exposed as configuration defaults.
//! 2. **Structures:** Hierarchical config for the system, cache geometry, and
//!    bus timing.
//! 3. **Validation:** Geometry checks mirroring the CLI contract (`E > 0`,
//!    `b >= 2`).
//!
//! Configuration can be deserialized from JSON by a host harness, or built
//! from CLI arguments via `Config::default()` plus field assignment.

use serde::Deserialize;

use crate::common::constants;
use crate::common::error::ConfigError;

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// ```
/// use mesi_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.system.num_cores, 4);
/// assert_eq!(config.cache.block_size(), 32);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Core count and run bounds.
    #[serde(default)]
    pub system: SystemConfig,
    /// Per-core cache geometry.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Bus and memory timing parameters.
    #[serde(default)]
    pub timing: TimingConfig,
}

impl Config {
    /// Checks the configuration against the startup contract.
    ///
    /// # Returns
    ///
    /// `Ok(())` for a runnable configuration, or the first violated
    /// constraint as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.ways == 0 {
            return Err(ConfigError::ZeroAssociativity);
        }
        if self.cache.block_bits < 2 {
            return Err(ConfigError::BlockBitsTooSmall(self.cache.block_bits));
        }
        if self.cache.block_bits >= constants::ADDR_BITS {
            return Err(ConfigError::BlockBitsTooLarge(self.cache.block_bits));
        }
        if self.system.num_cores == 0 {
            return Err(ConfigError::NoCores);
        }
        if self.cache.set_bits + self.cache.block_bits >= constants::ADDR_BITS {
            // Legal but degenerate: every address maps to tag 0.
            log::warn!(
                "s + b = {} consumes the whole address; tags collapse to zero",
                self.cache.set_bits + self.cache.block_bits
            );
        }
        Ok(())
    }
}

/// System-level settings: how many cores run and how long a run may last.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    /// Number of cores (one cache and one trace file each).
    #[serde(default = "SystemConfig::default_num_cores")]
    pub num_cores: usize,

    /// Sanity bound on the global cycle counter; exceeding it aborts the run.
    #[serde(default = "SystemConfig::default_max_cycles")]
    pub max_cycles: u64,
}

impl SystemConfig {
    fn default_num_cores() -> usize {
        constants::NUM_CORES
    }

    fn default_max_cycles() -> u64 {
        constants::MAX_SIM_CYCLES
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            num_cores: constants::NUM_CORES,
            max_cycles: constants::MAX_SIM_CYCLES,
        }
    }
}

/// Per-core L1 geometry: `2^set_bits` sets, `ways` lines per set,
/// `2^block_bits`-byte blocks.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Set index bits (`s`); `0` means one fully associative set.
    #[serde(default)]
    pub set_bits: u32,

    /// Associativity (`E`); must be greater than zero.
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,

    /// Block offset bits (`b`); at least 2 for 4-byte words.
    #[serde(default = "CacheConfig::default_block_bits")]
    pub block_bits: u32,
}

impl CacheConfig {
    /// Block size in bytes (`2^b`).
    #[inline]
    pub fn block_size(&self) -> u32 {
        1u32 << self.block_bits
    }

    /// Number of sets (`2^s`).
    #[inline]
    pub fn num_sets(&self) -> usize {
        1usize << self.set_bits
    }

    fn default_ways() -> usize {
        2
    }

    fn default_block_bits() -> u32 {
        5
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            set_bits: 1,
            ways: 2,
            block_bits: 5,
        }
    }
}

/// Bus and memory timing. These mirror the fixed machine constants; they are
/// configurable only so tests can shrink latencies.
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// Word size in bytes.
    #[serde(default = "TimingConfig::default_word_size")]
    pub word_size: u32,

    /// Main memory access latency in cycles (fetch or writeback).
    #[serde(default = "TimingConfig::default_mem_latency")]
    pub mem_latency: u64,

    /// Cycles per word for a cache-to-cache block transfer.
    #[serde(default = "TimingConfig::default_c2c_word_factor")]
    pub c2c_word_factor: u64,
}

impl TimingConfig {
    fn default_word_size() -> u32 {
        constants::WORD_SIZE
    }

    fn default_mem_latency() -> u64 {
        constants::MEM_ACCESS_CYCLES
    }

    fn default_c2c_word_factor() -> u64 {
        constants::C2C_WORD_CYCLES
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            word_size: constants::WORD_SIZE,
            mem_latency: constants::MEM_ACCESS_CYCLES,
            c2c_word_factor: constants::C2C_WORD_CYCLES,
        }
    }
}
