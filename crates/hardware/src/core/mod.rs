//! Trace-driven core.
//!
//! A core owns a cursor into its memory-reference trace. Each cycle it either
//! issues one access to its cache or records a stall cycle; when an
//! outstanding miss completes, the access retires with the fill and the core
//! spends that cycle consuming the completion rather than issuing anything
//! new.

use crate::cache::Cache;
use crate::common::Cycle;
use crate::sim::loader::{TraceFile, TraceRecord};
use crate::smp::interconnect::Bus;
use crate::stats::SimStats;

/// One trace-driven core.
pub struct Core {
    id: usize,
    trace: TraceFile,
    /// The access currently being serviced; present from issue until it
    /// retires (immediately on a hit, with the fill on a miss).
    current: Option<TraceRecord>,
    /// Latched when the cache reports a miss; cleared in the cycle the
    /// completion is consumed.
    stalled: bool,
    trace_done: bool,
}

impl Core {
    /// Creates a core reading from the given trace.
    pub fn new(id: usize, trace: TraceFile) -> Self {
        Self {
            id,
            trace,
            current: None,
            stalled: false,
            trace_done: false,
        }
    }

    /// The core id.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Whether this core has retired its whole trace.
    ///
    /// True once the trace is exhausted, no stall is outstanding, and no
    /// access is still in flight.
    pub fn is_finished(&self) -> bool {
        self.trace_done && !self.stalled && self.current.is_none()
    }

    /// Executes one cycle of work for this core.
    ///
    /// In order: consume a finished stall (one cycle, nothing issued), or
    /// record a stall cycle, or fetch the next trace record and submit it to
    /// the cache. A hit retires the access this cycle; a miss latches the
    /// stall and counts the first stall cycle.
    pub fn tick(&mut self, cycle: Cycle, cache: &mut Cache, bus: &mut Bus, stats: &mut SimStats) {
        if self.stalled {
            if !cache.is_stalled() {
                // The fill landed at this cycle's bus tick; the access
                // retires with it.
                self.stalled = false;
                self.current = None;
                return;
            }
            stats.add_stall_cycle(self.id);
            return;
        }

        let record = match self.current {
            Some(record) => record,
            None => match self.trace.next_record() {
                Some(record) => {
                    self.current = Some(record);
                    record
                }
                None => {
                    self.trace_done = true;
                    return;
                }
            },
        };
        let hit = cache.access(record.addr, record.op, cycle, bus, stats);
        if hit {
            self.current = None;
        } else {
            self.stalled = true;
            stats.add_stall_cycle(self.id);
        }
    }
}
