//! The lock-step simulation driver.
//!
//! Owns the cores, the system (bus + caches), and the statistics sink, and
//! advances them on one discrete clock. Within a cycle the order is fixed:
//! the bus ticks first (completing and then dispatching transactions), then
//! every core in ascending id order, then the driver checks for completion.

use crate::common::error::SimError;
use crate::common::Cycle;
use crate::config::Config;
use crate::core::Core;
use crate::sim::loader::{self, TraceFile};
use crate::smp::System;
use crate::stats::SimStats;

/// Top-level simulator: cores, system, stats, and the global clock.
pub struct Simulator {
    /// The shared bus and per-core caches.
    pub system: System,
    /// Trace-driven cores, indexed by id.
    pub cores: Vec<Core>,
    /// The statistics sink.
    pub stats: SimStats,
    /// Global cycle counter; the first simulated cycle is 1.
    pub cycle: Cycle,
    max_cycles: Cycle,
}

impl Simulator {
    /// Builds a simulator from a validated config and opened trace files.
    ///
    /// One trace per core; the caller ensures `traces.len()` matches the
    /// configured core count (the loader's `open_traces` does).
    pub fn new(config: &Config, traces: Vec<TraceFile>) -> Self {
        let cores = traces
            .into_iter()
            .enumerate()
            .map(|(id, trace)| Core::new(id, trace))
            .collect();
        Self {
            system: System::new(config),
            cores,
            stats: SimStats::new(config.system.num_cores),
            cycle: 0,
            max_cycles: config.system.max_cycles,
        }
    }

    /// Validates the config, opens the trace files, and builds a simulator.
    pub fn from_traces(config: &Config, trace_base: &str) -> Result<Self, SimError> {
        config.validate()?;
        let traces = loader::open_traces(trace_base, config.system.num_cores)?;
        Ok(Self::new(config, traces))
    }

    /// Whether every core has retired its whole trace.
    pub fn all_finished(&self) -> bool {
        self.cores.iter().all(Core::is_finished)
    }

    /// Advances the machine by one cycle.
    pub fn tick(&mut self) {
        self.cycle += 1;
        let System { bus, caches } = &mut self.system;
        bus.tick(self.cycle, caches, &mut self.stats);
        for (core, cache) in self.cores.iter_mut().zip(caches.iter_mut()) {
            if !core.is_finished() {
                core.tick(self.cycle, cache, bus, &mut self.stats);
            }
        }
    }

    /// Runs to completion.
    ///
    /// Loops `tick` until every core is finished, then stamps each core's
    /// final cycle count and the bus transaction total into the stats.
    ///
    /// # Errors
    ///
    /// [`SimError::Runaway`] if the cycle counter exceeds the configured
    /// sanity bound, which indicates a livelock bug rather than a long trace.
    pub fn run(&mut self) -> Result<(), SimError> {
        loop {
            self.tick();

            if self.all_finished() {
                for core in 0..self.stats.num_cores() {
                    self.stats.set_core_cycles(core, self.cycle);
                }
                self.stats
                    .set_total_transactions(self.system.bus.total_transactions());
                return Ok(());
            }

            if self.cycle >= self.max_cycles {
                return Err(SimError::Runaway {
                    bound: self.max_cycles,
                });
            }
        }
    }
}
