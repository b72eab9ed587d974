//! Latency and traffic accounting tests.
//!
//! Geometry: 32-byte blocks, 4-byte words, memory latency 100, c2c factor 2
//! (the fixed machine constants).

use mesi_core::config::{CacheConfig, TimingConfig};
use mesi_core::protocol::{BusRequest, BusTransaction};
use mesi_core::smp::interconnect::Bus;
use mesi_core::stats::SimStats;

use crate::common::mocks::snooper::{passive_agent, MockSnoopAgent};

fn default_bus() -> Bus {
    Bus::new(4, &CacheConfig::default(), &TimingConfig::default())
}

// ──────────────────────────────────────────────────────────
// Cost table
// ──────────────────────────────────────────────────────────

#[test]
fn memory_fill_costs_memory_latency_and_a_block() {
    let bus = default_bus();
    assert_eq!(bus.cost_of(BusTransaction::BusRd, false), (100, 32));
    assert_eq!(bus.cost_of(BusTransaction::BusRdX, false), (100, 32));
}

/// A supplied fill is a cache-to-cache transfer: 2 cycles per word, 8 words.
#[test]
fn supplied_fill_costs_c2c_transfer() {
    let bus = default_bus();
    assert_eq!(bus.cost_of(BusTransaction::BusRd, true), (16, 32));
    assert_eq!(bus.cost_of(BusTransaction::BusRdX, true), (16, 32));
}

#[test]
fn writeback_costs_memory_latency() {
    let bus = default_bus();
    // Supply makes no difference to a writeback.
    assert_eq!(bus.cost_of(BusTransaction::Writeback, false), (100, 32));
    assert_eq!(bus.cost_of(BusTransaction::Writeback, true), (100, 32));
}

/// An upgrade is address-only: one cycle, no bytes.
#[test]
fn upgrade_costs_one_cycle_and_no_traffic() {
    let bus = default_bus();
    assert_eq!(bus.cost_of(BusTransaction::BusUpgr, false), (1, 0));
}

/// Block size scales both the c2c latency and the per-transaction bytes.
#[test]
fn costs_scale_with_block_size() {
    let cache_cfg = CacheConfig {
        set_bits: 1,
        ways: 2,
        block_bits: 6, // 64-byte blocks, 16 words
    };
    let bus = Bus::new(4, &cache_cfg, &TimingConfig::default());
    assert_eq!(bus.cost_of(BusTransaction::BusRd, true), (32, 64));
    assert_eq!(bus.cost_of(BusTransaction::BusRd, false), (100, 64));
}

// ──────────────────────────────────────────────────────────
// Traffic attribution
// ──────────────────────────────────────────────────────────

/// Transaction bytes are charged to the requesting core and the global total.
#[test]
fn traffic_is_attributed_to_the_requester() {
    let mut bus = default_bus();
    let mut stats = SimStats::new(4);
    let mut caches: Vec<MockSnoopAgent> = (0..4).map(passive_agent).collect();

    bus.add_request(BusRequest {
        core: 2,
        kind: BusTransaction::BusRd,
        addr: 0x100,
        issued_at: 0,
    });
    bus.tick(1, &mut caches, &mut stats);

    assert_eq!(stats.traffic_bytes[2], 32);
    assert_eq!(stats.traffic_bytes[0], 0);
    assert_eq!(stats.total_traffic_bytes, 32);
    assert_eq!(bus.total_transactions(), 1);
}

/// Upgrades count as transactions but move no bytes.
#[test]
fn upgrade_adds_a_transaction_but_no_bytes() {
    let mut bus = default_bus();
    let mut stats = SimStats::new(4);
    let mut caches: Vec<MockSnoopAgent> = (0..4).map(passive_agent).collect();

    bus.add_request(BusRequest {
        core: 1,
        kind: BusTransaction::BusUpgr,
        addr: 0x100,
        issued_at: 0,
    });
    bus.tick(1, &mut caches, &mut stats);

    assert_eq!(bus.total_transactions(), 1);
    assert_eq!(stats.total_traffic_bytes, 0);
    assert_eq!(stats.traffic_bytes[1], 0);
}

/// A transaction that completes on cycle c frees the bus for a dispatch in
/// the same tick.
#[test]
fn completion_and_dispatch_share_a_cycle() {
    let mut bus = default_bus();
    let mut stats = SimStats::new(4);
    let mut caches: Vec<MockSnoopAgent> = (0..4).map(passive_agent).collect();

    bus.add_request(BusRequest {
        core: 0,
        kind: BusTransaction::BusUpgr,
        addr: 0x100,
        issued_at: 0,
    });
    bus.add_request(BusRequest {
        core: 1,
        kind: BusTransaction::BusUpgr,
        addr: 0x200,
        issued_at: 0,
    });

    bus.tick(1, &mut caches, &mut stats);
    assert_eq!(bus.current_transaction().unwrap().core, 0);

    // The upgrade ends at cycle 2; the second one starts in the same tick.
    bus.tick(2, &mut caches, &mut stats);
    assert_eq!(bus.current_transaction().unwrap().core, 1);
    assert_eq!(bus.total_transactions(), 2);
}
