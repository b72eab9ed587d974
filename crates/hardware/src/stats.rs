//! Simulation statistics collection and reporting.
//!
//! This module tracks the counters reported at the end of a run. It provides:
//! 1. **Per-core counters:** Reads, writes, misses, evictions, writebacks,
//!    stall cycles, invalidations received, and bus traffic caused.
//! 2. **Global counters:** Total bus traffic and total bus transactions.
//! 3. **Reporting:** A rendered human-readable report, printable or writable
//!    to a file.
//!
//! Stats are a pure sink: nothing in the simulation reads them back, so they
//! can never influence the timeline.

use std::fmt::Write as _;

use crate::protocol::Operation;

/// Per-core and system-wide counters for one simulation run.
///
/// All vectors are indexed by core id and sized at construction; recording
/// methods are append-only.
#[derive(Debug, Clone)]
pub struct SimStats {
    /// Read accesses issued per core.
    pub reads: Vec<u64>,
    /// Write accesses issued per core.
    pub writes: Vec<u64>,
    /// Total cache accesses per core (reads + writes).
    pub accesses: Vec<u64>,
    /// Cache misses per core (including write-hit-on-Shared upgrades).
    pub misses: Vec<u64>,
    /// Valid lines evicted per core.
    pub evictions: Vec<u64>,
    /// Writebacks initiated per core (evictions of dirty lines plus
    /// snoop-induced flushes of Modified copies).
    pub writebacks: Vec<u64>,
    /// Cycles each core spent unable to retire an access.
    pub stall_cycles: Vec<u64>,
    /// Invalidations each core's cache received from bus transactions.
    pub invalidations: Vec<u64>,
    /// Bus traffic in bytes attributed to each core's transactions.
    pub traffic_bytes: Vec<u64>,
    /// Global cycle at which each core's work was complete.
    pub total_cycles: Vec<u64>,

    /// Total bytes moved over the bus.
    pub total_traffic_bytes: u64,
    /// Total transactions dispatched on the bus.
    pub total_transactions: u64,
}

impl SimStats {
    /// Creates a zeroed counter set for `num_cores` cores.
    pub fn new(num_cores: usize) -> Self {
        Self {
            reads: vec![0; num_cores],
            writes: vec![0; num_cores],
            accesses: vec![0; num_cores],
            misses: vec![0; num_cores],
            evictions: vec![0; num_cores],
            writebacks: vec![0; num_cores],
            stall_cycles: vec![0; num_cores],
            invalidations: vec![0; num_cores],
            traffic_bytes: vec![0; num_cores],
            total_cycles: vec![0; num_cores],
            total_traffic_bytes: 0,
            total_transactions: 0,
        }
    }

    /// Number of cores these stats cover.
    pub fn num_cores(&self) -> usize {
        self.reads.len()
    }

    /// Records one cache access and its operation kind.
    pub fn record_access(&mut self, core: usize, op: Operation) {
        self.accesses[core] += 1;
        match op {
            Operation::Read => self.reads[core] += 1,
            Operation::Write => self.writes[core] += 1,
        }
    }

    /// Records a cache miss.
    pub fn record_miss(&mut self, core: usize) {
        self.misses[core] += 1;
    }

    /// Records the eviction of a valid line.
    pub fn record_eviction(&mut self, core: usize) {
        self.evictions[core] += 1;
    }

    /// Records a writeback initiated by `core`'s cache.
    pub fn record_writeback(&mut self, core: usize) {
        self.writebacks[core] += 1;
    }

    /// Records one stall cycle for `core`.
    pub fn add_stall_cycle(&mut self, core: usize) {
        self.stall_cycles[core] += 1;
    }

    /// Records an invalidation received by `core`'s cache.
    pub fn record_invalidation(&mut self, core: usize) {
        self.invalidations[core] += 1;
    }

    /// Attributes `bytes` of bus traffic to the core whose transaction moved
    /// them, and to the global total.
    pub fn add_traffic(&mut self, core: usize, bytes: u64) {
        self.total_traffic_bytes += bytes;
        self.traffic_bytes[core] += bytes;
    }

    /// Stamps the final cycle count for `core`.
    pub fn set_core_cycles(&mut self, core: usize, cycles: u64) {
        self.total_cycles[core] = cycles;
    }

    /// Records the bus's final transaction count.
    pub fn set_total_transactions(&mut self, transactions: u64) {
        self.total_transactions = transactions;
    }

    /// Miss rate for `core` as a percentage of its accesses.
    pub fn miss_rate_percent(&self, core: usize) -> f64 {
        if self.accesses[core] == 0 {
            return 0.0;
        }
        (self.misses[core] as f64 / self.accesses[core] as f64) * 100.0
    }

    /// Renders the final report.
    ///
    /// # Arguments
    ///
    /// * `params` - The run parameters echoed at the top of the report.
    ///
    /// # Returns
    ///
    /// The complete report as a string; the caller decides whether it goes to
    /// stdout, a file, or both.
    pub fn render(&self, params: &ReportParams) -> String {
        let block_size = 1u64 << params.block_bits;
        let num_sets = 1u64 << params.set_bits;

        let mut out = String::new();
        let _ = writeln!(out, "Simulation Parameters:");
        let _ = writeln!(out, "  Trace Prefix: {}", params.trace_prefix);
        let _ = writeln!(out, "  Set Index Bits: {}", params.set_bits);
        let _ = writeln!(out, "  Associativity: {}", params.ways);
        let _ = writeln!(out, "  Block Bits: {}", params.block_bits);
        let _ = writeln!(out, "  Block Size (Bytes): {}", block_size);
        let _ = writeln!(out, "  Number of Sets: {}", num_sets);
        let _ = writeln!(out, "  MESI Protocol: Enabled");
        let _ = writeln!(out, "  Write Policy: Write-back, Write-allocate");
        let _ = writeln!(out, "  Replacement Policy: LRU");
        let _ = writeln!(out, "  Bus: Central snooping bus");
        let _ = writeln!(out);

        for core in 0..self.num_cores() {
            let total = self.reads[core] + self.writes[core];
            let _ = writeln!(out, "Core {} Statistics:", core);
            let _ = writeln!(out, "  Total Instructions: {}", total);
            let _ = writeln!(out, "  Total Reads: {}", self.reads[core]);
            let _ = writeln!(out, "  Total Writes: {}", self.writes[core]);
            let _ = writeln!(out, "  Total Execution Cycles: {}", self.total_cycles[core]);
            let _ = writeln!(out, "  Idle Cycles: {}", self.stall_cycles[core]);
            let _ = writeln!(out, "  Cache Misses: {}", self.misses[core]);
            let _ = writeln!(
                out,
                "  Cache Miss Rate: {:.4}%",
                self.miss_rate_percent(core)
            );
            let _ = writeln!(out, "  Cache Evictions: {}", self.evictions[core]);
            let _ = writeln!(out, "  Writebacks: {}", self.writebacks[core]);
            let _ = writeln!(
                out,
                "  Bus Invalidations Received: {}",
                self.invalidations[core]
            );
            let _ = writeln!(
                out,
                "  Data Traffic Caused (Bytes): {}",
                self.traffic_bytes[core]
            );
            let _ = writeln!(out);
        }

        let _ = writeln!(out, "Overall Bus Summary:");
        let _ = writeln!(out, "  Total Bus Transactions: {}", self.total_transactions);
        let _ = writeln!(
            out,
            "  Total Bus Traffic (Bytes): {}",
            self.total_traffic_bytes
        );

        out
    }

    /// Prints the rendered report to stdout.
    pub fn print(&self, params: &ReportParams) {
        print!("{}", self.render(params));
    }
}

/// Run parameters echoed into the report header.
#[derive(Debug, Clone)]
pub struct ReportParams {
    /// The `-t` trace prefix the run was started with.
    pub trace_prefix: String,
    /// Set index bits (`s`).
    pub set_bits: u32,
    /// Associativity (`E`).
    pub ways: usize,
    /// Block offset bits (`b`).
    pub block_bits: u32,
}
