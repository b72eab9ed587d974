//! Error types for configuration and simulation failures.
//!
//! This module defines the fatal error surface of the simulator:
//! 1. **Configuration errors:** Bad geometry or an unreadable trace file;
//!    detected at startup, the simulator refuses to run.
//! 2. **Simulation errors:** A runaway cycle counter, reported with the bound
//!    that was exceeded.
//!
//! Recoverable runtime anomalies (a completion for an unknown block, a
//! double data supplier) are not errors: they are logged and the offending
//! event is discarded, per the liveness policy.

use std::fmt;
use std::io;

/// Startup configuration errors. All of these are fatal: the simulator
/// reports which parameter was bad and exits before running a single cycle.
#[derive(Debug)]
pub enum ConfigError {
    /// Associativity (`-E`) was zero.
    ZeroAssociativity,

    /// Block offset bits (`-b`) below the 4-byte-word minimum of 2.
    ///
    /// The associated value is the rejected bit count.
    BlockBitsTooSmall(u32),

    /// Block offset bits (`-b`) at or beyond the 32-bit address width.
    ///
    /// The associated value is the rejected bit count.
    BlockBitsTooLarge(u32),

    /// The configured core count was zero.
    NoCores,

    /// A per-core trace file could not be opened.
    ///
    /// Carries the core id, the path that failed, and the underlying I/O error.
    TraceOpen {
        /// Core whose trace file failed to open.
        core: usize,
        /// The path that was attempted.
        path: String,
        /// The underlying I/O error.
        source: io::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroAssociativity => {
                write!(f, "associativity (-E) must be greater than 0")
            }
            ConfigError::BlockBitsTooSmall(b) => {
                write!(
                    f,
                    "block offset bits (-b) must be at least 2 for 4-byte words, got {}",
                    b
                )
            }
            ConfigError::BlockBitsTooLarge(b) => {
                write!(
                    f,
                    "block offset bits (-b) must be below the 32-bit address width, got {}",
                    b
                )
            }
            ConfigError::NoCores => write!(f, "core count must be greater than 0"),
            ConfigError::TraceOpen { core, path, source } => {
                write!(f, "could not open trace file {} for core {}: {}", path, core, source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::TraceOpen { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors surfaced by a simulation run.
#[derive(Debug)]
pub enum SimError {
    /// Setup failed before the first cycle.
    Config(ConfigError),

    /// The global cycle counter exceeded the sanity bound; the run is aborted
    /// rather than allowed to spin forever. Carries the bound that was hit.
    Runaway {
        /// The cycle bound that was exceeded.
        bound: u64,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Config(e) => write!(f, "configuration error: {}", e),
            SimError::Runaway { bound } => {
                write!(f, "simulation exceeded {} cycles without completing", bound)
            }
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Config(e) => Some(e),
            SimError::Runaway { .. } => None,
        }
    }
}

impl From<ConfigError> for SimError {
    fn from(e: ConfigError) -> Self {
        SimError::Config(e)
    }
}
