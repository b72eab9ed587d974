//! System assembly: the bus plus one cache per core.
//!
//! The `System` is the ownership root for everything the cores share. It
//! resolves the bus/cache reference cycle by owning both sides and passing
//! `&mut` slices between them, and it exposes the coherence audit used by
//! the test suite.

use std::collections::HashMap;

use crate::cache::Cache;
use crate::common::{Addr, Cycle};
use crate::config::Config;
use crate::protocol::MesiState;
use crate::smp::interconnect::Bus;
use crate::stats::SimStats;

/// The bus and all caches of the simulated machine.
pub struct System {
    /// The shared snooping bus.
    pub bus: Bus,
    /// One private L1 per core, indexed by core id.
    pub caches: Vec<Cache>,
}

impl System {
    /// Assembles a system from the configuration.
    pub fn new(config: &Config) -> Self {
        let bus = Bus::new(config.system.num_cores, &config.cache, &config.timing);
        let caches = (0..config.system.num_cores)
            .map(|id| Cache::new(id, &config.cache))
            .collect();
        Self { bus, caches }
    }

    /// Advances the bus by one cycle (completion, then arbitration/dispatch).
    pub fn tick(&mut self, cycle: Cycle, stats: &mut SimStats) {
        self.bus.tick(cycle, &mut self.caches, stats);
    }

    /// Audits the MESI single-writer invariants at a cycle boundary.
    ///
    /// Checks, for every block held anywhere:
    /// - a Modified or Exclusive copy excludes every other copy;
    /// - Shared copies coexist only with other Shared copies;
    ///
    /// and, per cache, that the stall flag and the pending miss agree.
    ///
    /// # Returns
    ///
    /// `Ok(())`, or a description of the first violated invariant.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut holders: HashMap<Addr, Vec<(usize, MesiState)>> = HashMap::new();
        for cache in &self.caches {
            for (block, state) in cache.valid_lines() {
                holders.entry(block).or_default().push((cache.id(), state));
            }
        }

        for (block, copies) in &holders {
            let owners = copies
                .iter()
                .filter(|(_, s)| matches!(s, MesiState::Modified | MesiState::Exclusive))
                .count();
            if owners > 1 {
                return Err(format!(
                    "block {:#010x} has {} owning copies: {:?}",
                    block, owners, copies
                ));
            }
            if owners == 1 && copies.len() > 1 {
                return Err(format!(
                    "block {:#010x} is owned but also held elsewhere: {:?}",
                    block, copies
                ));
            }
        }

        for cache in &self.caches {
            if cache.is_stalled() != cache.pending().is_some() {
                return Err(format!(
                    "core {}: stalled={} but pending_miss={}",
                    cache.id(),
                    cache.is_stalled(),
                    cache.pending().is_some()
                ));
            }
        }

        Ok(())
    }
}
