//! Per-core L1 cache with MESI coherence.
//!
//! This module implements the cache side of the coherence engine:
//! 1. **Access path:** Hit/miss classification per MESI state, silent E-to-M
//!    upgrade on write hits, LRU touch on hits only.
//! 2. **Miss handling:** Upgrade path (write hit on Shared issues `BusUpgr`)
//!    and fill path (allocate a way, evict and write back as needed, issue
//!    `BusRd`/`BusRdX`).
//! 3. **Snooping:** MESI downgrades and invalidations observed from other
//!    cores' transactions, with cache-to-cache supply and implicit writeback
//!    of Modified copies.
//! 4. **Completion:** Fill-state selection (Exclusive vs Shared from the
//!    aggregated snoop summary), pending-miss retirement, and un-stall.
//!
//! A cache tracks at most one outstanding miss; while it is pending the cache
//! reports itself stalled and its core issues nothing new.

/// Cache line (state, tag, LRU timestamp).
pub mod line;
/// Fixed E-way set with timestamp LRU.
pub mod set;

use log::warn;

use crate::common::addr::AddressMap;
use crate::common::{Addr, Cycle};
use crate::config::CacheConfig;
use crate::protocol::{
    BusRequest, BusTransaction, MesiState, Operation, SnoopReply, SnoopSummary, Snooper,
};
use crate::smp::interconnect::Bus;
use crate::stats::SimStats;
use set::CacheSet;

/// The single outstanding miss a cache may carry.
///
/// Created when a miss is detected and its bus request enqueued; destroyed
/// when the bus delivers completion for the block.
#[derive(Debug, Clone, Copy)]
pub struct PendingMiss {
    /// The operation that missed.
    pub op: Operation,
    /// Block address the fill or upgrade concerns.
    pub block_addr: Addr,
    /// Way reserved (fill) or already holding the block (upgrade).
    pub target_way: usize,
    /// Cycle the miss was detected.
    pub issued_at: Cycle,
}

/// One core's private L1 cache.
pub struct Cache {
    id: usize,
    map: AddressMap,
    ways: usize,
    sets: Vec<CacheSet>,
    pending: Option<PendingMiss>,
    stalled: bool,
}

impl Cache {
    /// Creates a cache for `core_id` with the given geometry.
    pub fn new(core_id: usize, config: &CacheConfig) -> Self {
        let map = AddressMap::new(config.set_bits, config.block_bits);
        let sets = (0..map.num_sets())
            .map(|_| CacheSet::new(config.ways))
            .collect();
        Self {
            id: core_id,
            map,
            ways: config.ways,
            sets,
            pending: None,
            stalled: false,
        }
    }

    /// The core id this cache belongs to.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Whether an outstanding miss is blocking the core.
    #[inline]
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    /// The outstanding miss, if any.
    #[inline]
    pub fn pending(&self) -> Option<&PendingMiss> {
        self.pending.as_ref()
    }

    /// The address map for this cache's geometry.
    #[inline]
    pub fn address_map(&self) -> &AddressMap {
        &self.map
    }

    /// MESI state of the line holding `addr`, or `Invalid` if absent.
    pub fn line_state(&self, addr: Addr) -> MesiState {
        let block = self.map.block_addr(addr);
        let index = self.map.index(block);
        let tag = self.map.tag(block);
        match self.sets[index].find_line(tag) {
            Some(way) => self.sets[index].line(way).state,
            None => MesiState::Invalid,
        }
    }

    /// All valid lines as `(block_address, state)`, for coherence audits.
    pub fn valid_lines(&self) -> Vec<(Addr, MesiState)> {
        let mut out = Vec::new();
        for (index, set) in self.sets.iter().enumerate() {
            for line in set.iter() {
                if line.is_valid() {
                    out.push((self.map.reconstruct(line.tag, index), line.state));
                }
            }
        }
        out
    }

    /// Services one access from the owning core.
    ///
    /// Records the access, classifies hit/miss per the MESI state of the
    /// matching line, and on a miss stalls the cache and begins bus
    /// interaction.
    ///
    /// # Returns
    ///
    /// `true` if the access hits and retires this cycle, `false` if the cache
    /// stalled on a miss.
    pub fn access(
        &mut self,
        addr: Addr,
        op: Operation,
        cycle: Cycle,
        bus: &mut Bus,
        stats: &mut SimStats,
    ) -> bool {
        if self.stalled {
            warn!("core {} accessed its cache while stalled", self.id);
            return false;
        }

        let block = self.map.block_addr(addr);
        let index = self.map.index(block);
        let tag = self.map.tag(block);

        stats.record_access(self.id, op);

        if let Some(way) = self.sets[index].find_line(tag) {
            let state = self.sets[index].line(way).state;
            match (op, state) {
                (Operation::Read, _) | (Operation::Write, MesiState::Modified) => {
                    self.sets[index].touch(way, cycle);
                    true
                }
                (Operation::Write, MesiState::Exclusive) => {
                    // Silent upgrade: exclusive ownership needs no bus traffic.
                    self.sets[index].line_mut(way).state = MesiState::Modified;
                    self.sets[index].touch(way, cycle);
                    true
                }
                (Operation::Write, MesiState::Shared) => {
                    stats.record_miss(self.id);
                    self.stalled = true;
                    self.handle_miss(block, index, tag, op, cycle, bus, stats);
                    false
                }
                (Operation::Write, MesiState::Invalid) => unreachable!("found line is valid"),
            }
        } else {
            stats.record_miss(self.id);
            self.stalled = true;
            self.handle_miss(block, index, tag, op, cycle, bus, stats);
            false
        }
    }

    /// Begins bus interaction for a miss: the upgrade path for a write hit on
    /// Shared, the fill path otherwise.
    #[allow(clippy::too_many_arguments)]
    fn handle_miss(
        &mut self,
        block_addr: Addr,
        index: usize,
        tag: Addr,
        op: Operation,
        cycle: Cycle,
        bus: &mut Bus,
        stats: &mut SimStats,
    ) {
        // Single outstanding miss: never enqueue a second request.
        if self.pending.is_some() {
            return;
        }

        if op == Operation::Write {
            if let Some(way) = self.sets[index].find_line(tag) {
                if self.sets[index].line(way).state == MesiState::Shared {
                    // Upgrade in place: keep the tag, invalidate the other
                    // holders, no data transfer.
                    self.pending = Some(PendingMiss {
                        op,
                        block_addr,
                        target_way: way,
                        issued_at: cycle,
                    });
                    bus.add_request(BusRequest {
                        core: self.id,
                        kind: BusTransaction::BusUpgr,
                        addr: block_addr,
                        issued_at: cycle,
                    });
                    return;
                }
            }
        }

        let target_way = self.allocate_block(index, tag, cycle, bus, stats);
        self.pending = Some(PendingMiss {
            op,
            block_addr,
            target_way,
            issued_at: cycle,
        });

        let kind = match op {
            Operation::Read => BusTransaction::BusRd,
            Operation::Write => BusTransaction::BusRdX,
        };
        bus.add_request(BusRequest {
            core: self.id,
            kind,
            addr: block_addr,
            issued_at: cycle,
        });
    }

    /// Chooses and reserves a way for an incoming fill.
    ///
    /// Prefers an invalid way; otherwise evicts the LRU victim, writing it
    /// back first if it was Modified. The chosen way is left Invalid with the
    /// new tag so the fill can land when the bus completes.
    fn allocate_block(
        &mut self,
        index: usize,
        tag: Addr,
        cycle: Cycle,
        bus: &mut Bus,
        stats: &mut SimStats,
    ) -> usize {
        let way = match self.sets[index].find_invalid_line() {
            Some(way) => way,
            None => {
                let victim = self.sets[index].lru_victim();
                let victim_line = *self.sets[index].line(victim);
                if victim_line.is_valid() {
                    stats.record_eviction(self.id);
                    if victim_line.state == MesiState::Modified {
                        let victim_addr = self.map.reconstruct(victim_line.tag, index);
                        self.initiate_writeback(victim_addr, cycle, bus, stats);
                    }
                }
                victim
            }
        };

        let line = self.sets[index].line_mut(way);
        line.state = MesiState::Invalid;
        line.tag = tag;
        line.last_used = cycle;
        way
    }

    /// Enqueues a writeback of `victim_addr` and counts it.
    fn initiate_writeback(
        &mut self,
        victim_addr: Addr,
        cycle: Cycle,
        bus: &mut Bus,
        stats: &mut SimStats,
    ) {
        stats.record_writeback(self.id);
        bus.add_request(BusRequest {
            core: self.id,
            kind: BusTransaction::Writeback,
            addr: victim_addr,
            issued_at: cycle,
        });
    }

    /// Builds the writeback request a snoop-hit Modified copy must issue.
    fn snoop_writeback(&self, block_addr: Addr, cycle: Cycle) -> BusRequest {
        BusRequest {
            core: self.id,
            kind: BusTransaction::Writeback,
            addr: block_addr,
            issued_at: cycle,
        }
    }

    /// Drops the outstanding miss and releases the core.
    ///
    /// Shared by the normal completion path and the recovery paths (unknown
    /// block, invalid way): with a single outstanding miss, clearing it
    /// always un-stalls.
    fn retire_pending(&mut self) {
        self.pending = None;
        self.stalled = false;
    }
}

impl Snooper for Cache {
    fn core_id(&self) -> usize {
        self.id
    }

    /// Applies the MESI transition a foreign transaction implies.
    ///
    /// LRU is never touched here: observing traffic is not a use. The reply's
    /// `still_holds` reflects the line state after the transition, which the
    /// bus aggregates into the requester's Exclusive-vs-Shared decision.
    fn snoop(
        &mut self,
        kind: BusTransaction,
        addr: Addr,
        cycle: Cycle,
        stats: &mut SimStats,
    ) -> SnoopReply {
        let block = self.map.block_addr(addr);
        let index = self.map.index(block);
        let tag = self.map.tag(block);

        let mut reply = SnoopReply::default();
        let way = match self.sets[index].find_line(tag) {
            Some(way) => way,
            None => return reply,
        };

        let state = self.sets[index].line(way).state;
        match kind {
            BusTransaction::BusRd => match state {
                MesiState::Modified => {
                    // Supply the dirty copy and flush it to memory.
                    reply.supplied_data = true;
                    reply.was_dirty = true;
                    reply.writeback = Some(self.snoop_writeback(block, cycle));
                    stats.record_writeback(self.id);
                    self.sets[index].line_mut(way).state = MesiState::Shared;
                }
                MesiState::Exclusive => {
                    reply.supplied_data = true;
                    self.sets[index].line_mut(way).state = MesiState::Shared;
                }
                MesiState::Shared => {}
                MesiState::Invalid => unreachable!("found line is valid"),
            },
            BusTransaction::BusRdX => {
                match state {
                    MesiState::Modified => {
                        reply.supplied_data = true;
                        reply.was_dirty = true;
                        reply.writeback = Some(self.snoop_writeback(block, cycle));
                        stats.record_writeback(self.id);
                    }
                    MesiState::Exclusive => {
                        reply.supplied_data = true;
                    }
                    MesiState::Shared => {}
                    MesiState::Invalid => unreachable!("found line is valid"),
                }
                self.sets[index].line_mut(way).state = MesiState::Invalid;
                stats.record_invalidation(self.id);
            }
            BusTransaction::BusUpgr => {
                if state != MesiState::Shared {
                    // An upgrade implies every other holder is Shared.
                    warn!(
                        "core {} snooped BusUpgr for {:#010x} while holding {:?}",
                        self.id, block, state
                    );
                }
                self.sets[index].line_mut(way).state = MesiState::Invalid;
                stats.record_invalidation(self.id);
            }
            BusTransaction::Writeback => {}
        }

        reply.still_holds = self.sets[index].line(way).is_valid();
        reply
    }

    /// Lands the fill (or upgrade) for this cache's own completed transaction.
    fn complete(&mut self, request: &BusRequest, summary: &SnoopSummary, cycle: Cycle) {
        if request.kind == BusTransaction::Writeback {
            // Writebacks carry no fill; the cache was never stalled on them.
            return;
        }

        let pending = match self.pending {
            Some(p) if p.block_addr == request.addr => p,
            _ => {
                warn!(
                    "core {}: completion for unknown block {:#010x}, discarding",
                    self.id, request.addr
                );
                self.retire_pending();
                return;
            }
        };

        let index = self.map.index(request.addr);
        let tag = self.map.tag(request.addr);
        let way = pending.target_way;
        if way >= self.ways {
            warn!(
                "core {}: pending miss for {:#010x} has invalid way {}",
                self.id, request.addr, way
            );
            self.retire_pending();
            return;
        }

        match request.kind {
            BusTransaction::BusRd => {
                let line = self.sets[index].line_mut(way);
                line.state = if summary.is_shared_after {
                    MesiState::Shared
                } else {
                    MesiState::Exclusive
                };
            }
            BusTransaction::BusRdX => {
                self.sets[index].line_mut(way).state = MesiState::Modified;
            }
            BusTransaction::BusUpgr => {
                let line = self.sets[index].line(way);
                if !line.is_valid() || line.tag != tag {
                    // The Shared copy was invalidated while the upgrade sat in
                    // the queue; drop it and let the core's next access
                    // re-miss with a full read-for-ownership.
                    warn!(
                        "core {}: upgrade for {:#010x} lost its line, discarding",
                        self.id, request.addr
                    );
                    self.retire_pending();
                    return;
                }
                self.sets[index].line_mut(way).state = MesiState::Modified;
            }
            BusTransaction::Writeback => unreachable!("handled above"),
        }

        self.sets[index].touch(way, cycle);
        self.retire_pending();
    }
}
