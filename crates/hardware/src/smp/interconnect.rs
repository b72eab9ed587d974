//! The shared snooping bus.
//!
//! This module implements the serialization point of the whole machine:
//! 1. **Queueing:** One FIFO per core; requests wait in their core's queue.
//! 2. **Arbitration:** Strict round-robin over core ids with a rotating
//!    pointer; bounded starvation.
//! 3. **Snoop broadcast:** Every non-requesting cache observes a dispatched
//!    transaction; replies are aggregated into one [`SnoopSummary`].
//! 4. **Latency and traffic:** Memory vs cache-to-cache timing, byte
//!    accounting attributed to the requesting core.
//!
//! At most one transaction is in flight. A transaction that completes on
//! cycle `c` frees the bus for a new dispatch in the same `tick(c)`.

use std::collections::VecDeque;

use log::{trace, warn};

use crate::common::Cycle;
use crate::config::{CacheConfig, TimingConfig};
use crate::protocol::{BusRequest, BusTransaction, SnoopSummary, Snooper};
use crate::stats::SimStats;

/// The transaction currently occupying the bus.
#[derive(Debug, Clone, Copy)]
struct Inflight {
    request: BusRequest,
    end_cycle: Cycle,
    /// Snoop summary computed at dispatch, delivered to the requester when
    /// the latency timer expires. Carrying it here is what lets a read miss
    /// fill Exclusive instead of Shared when no one else held the block.
    summary: SnoopSummary,
}

/// The shared bus: per-core request queues, round-robin arbitration, and a
/// single in-flight transaction with a latency timer.
pub struct Bus {
    queues: Vec<VecDeque<BusRequest>>,
    rr_pointer: usize,
    inflight: Option<Inflight>,
    total_transactions: u64,
    block_size: u32,
    words_per_block: u64,
    timing: TimingConfig,
}

impl Bus {
    /// Creates an idle bus for `num_cores` cores and the given geometry.
    pub fn new(num_cores: usize, cache: &CacheConfig, timing: &TimingConfig) -> Self {
        let block_size = cache.block_size();
        Self {
            queues: (0..num_cores).map(|_| VecDeque::new()).collect(),
            rr_pointer: 0,
            inflight: None,
            total_transactions: 0,
            block_size,
            words_per_block: u64::from(block_size / timing.word_size),
            timing: timing.clone(),
        }
    }

    /// Queues a request on its core's FIFO.
    ///
    /// # Returns
    ///
    /// `false` (and logs) if the request names a core the bus does not know;
    /// such requests are dropped.
    pub fn add_request(&mut self, request: BusRequest) -> bool {
        if request.core >= self.queues.len() {
            warn!(
                "rejecting bus request with invalid core id {} (addr {:#010x})",
                request.core, request.addr
            );
            return false;
        }
        self.queues[request.core].push_back(request);
        true
    }

    /// Whether a transaction is in flight.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.inflight.is_some()
    }

    /// Total transactions dispatched so far.
    #[inline]
    pub fn total_transactions(&self) -> u64 {
        self.total_transactions
    }

    /// Number of requests currently waiting across all queues.
    pub fn queued_requests(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    /// The request currently occupying the bus, if any.
    pub fn current_transaction(&self) -> Option<&BusRequest> {
        self.inflight.as_ref().map(|i| &i.request)
    }

    /// A copy of one core's waiting requests, head first.
    pub fn queue_snapshot(&self, core: usize) -> Vec<BusRequest> {
        self.queues
            .get(core)
            .map(|q| q.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Advances the bus by one cycle.
    ///
    /// Completion first: if the in-flight transaction's timer has expired,
    /// its originator receives the completion (with the summary computed at
    /// dispatch) before anything else happens this cycle. Then, if idle, the
    /// bus arbitrates and starts the next transaction.
    pub fn tick<S: Snooper>(&mut self, cycle: Cycle, caches: &mut [S], stats: &mut SimStats) {
        if let Some(inflight) = self.inflight {
            if cycle >= inflight.end_cycle {
                self.inflight = None;
                trace!(
                    "bus: {:?} for {:#010x} (core {}) completes at cycle {}",
                    inflight.request.kind,
                    inflight.request.addr,
                    inflight.request.core,
                    cycle
                );
                match caches.iter_mut().find(|c| c.core_id() == inflight.request.core) {
                    Some(owner) => owner.complete(&inflight.request, &inflight.summary, cycle),
                    None => warn!(
                        "completion for unknown core {}, dropping",
                        inflight.request.core
                    ),
                }
            }
        }

        if self.inflight.is_none() {
            if let Some(request) = self.arbitrate() {
                let summary = self.broadcast_snoop(&request, caches, cycle, stats);
                self.start_transaction(request, summary, cycle, stats);
            }
        }
    }

    /// Round-robin winner selection.
    ///
    /// Scans core queues starting at the rotating pointer; the first
    /// non-empty queue wins, its head is dequeued, and the pointer advances
    /// past the winner.
    fn arbitrate(&mut self) -> Option<BusRequest> {
        let n = self.queues.len();
        for offset in 0..n {
            let core = (self.rr_pointer + offset) % n;
            if let Some(request) = self.queues[core].pop_front() {
                self.rr_pointer = (core + 1) % n;
                return Some(request);
            }
        }
        None
    }

    /// Broadcasts a snoop to every cache except the requester and aggregates
    /// the replies.
    ///
    /// Writebacks snoop nothing. A second supplier is a coherence-invariant
    /// violation: it is logged and the first supplier wins. Writebacks that
    /// snooped caches must issue (flushing a Modified copy) are enqueued on
    /// their own queues here.
    fn broadcast_snoop<S: Snooper>(
        &mut self,
        request: &BusRequest,
        caches: &mut [S],
        cycle: Cycle,
        stats: &mut SimStats,
    ) -> SnoopSummary {
        let mut summary = SnoopSummary::default();
        if request.kind == BusTransaction::Writeback {
            return summary;
        }

        for cache in caches.iter_mut() {
            if cache.core_id() == request.core {
                continue;
            }
            let reply = cache.snoop(request.kind, request.addr, cycle, stats);
            if reply.supplied_data {
                if summary.data_supplied {
                    warn!(
                        "two caches supplied {:#010x}; keeping the first",
                        request.addr
                    );
                } else {
                    summary.data_supplied = true;
                    summary.was_dirty = reply.was_dirty;
                }
            }
            if reply.still_holds {
                summary.is_shared_after = true;
            }
            if let Some(writeback) = reply.writeback {
                self.add_request(writeback);
            }
        }

        summary
    }

    /// Starts the transaction: computes latency and traffic, arms the timer.
    fn start_transaction(
        &mut self,
        request: BusRequest,
        summary: SnoopSummary,
        cycle: Cycle,
        stats: &mut SimStats,
    ) {
        let (latency, traffic) = self.cost_of(request.kind, summary.data_supplied);
        self.total_transactions += 1;
        if traffic > 0 {
            stats.add_traffic(request.core, traffic);
        }
        trace!(
            "bus: dispatch {:?} for {:#010x} (core {}) at cycle {}, latency {}, supplied={}",
            request.kind,
            request.addr,
            request.core,
            cycle,
            latency,
            summary.data_supplied
        );
        self.inflight = Some(Inflight {
            request,
            end_cycle: cycle + latency,
            summary,
        });
    }

    /// Latency in cycles and traffic in bytes for a transaction kind.
    ///
    /// A supplied read or read-exclusive is a cache-to-cache block transfer
    /// at `c2c_word_factor` cycles per word; unsupplied fills and writebacks
    /// pay the memory latency; an upgrade is a one-cycle address-only event.
    pub fn cost_of(&self, kind: BusTransaction, data_supplied: bool) -> (Cycle, u64) {
        match kind {
            BusTransaction::BusRd | BusTransaction::BusRdX => {
                let latency = if data_supplied {
                    self.timing.c2c_word_factor * self.words_per_block
                } else {
                    self.timing.mem_latency
                };
                (latency, u64::from(self.block_size))
            }
            BusTransaction::Writeback => (self.timing.mem_latency, u64::from(self.block_size)),
            BusTransaction::BusUpgr => (1, 0),
        }
    }
}
