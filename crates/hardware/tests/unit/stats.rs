//! Statistics counter and report tests.

use mesi_core::protocol::Operation;
use mesi_core::stats::{ReportParams, SimStats};

fn params() -> ReportParams {
    ReportParams {
        trace_prefix: "app1".to_string(),
        set_bits: 1,
        ways: 2,
        block_bits: 5,
    }
}

#[test]
fn access_recording_splits_reads_and_writes() {
    let mut stats = SimStats::new(4);

    stats.record_access(0, Operation::Read);
    stats.record_access(0, Operation::Read);
    stats.record_access(0, Operation::Write);
    stats.record_access(3, Operation::Write);

    assert_eq!(stats.reads[0], 2);
    assert_eq!(stats.writes[0], 1);
    assert_eq!(stats.accesses[0], 3);
    assert_eq!(stats.writes[3], 1);
    assert_eq!(stats.accesses[1], 0);
}

#[test]
fn traffic_updates_both_core_and_global_totals() {
    let mut stats = SimStats::new(4);

    stats.add_traffic(1, 32);
    stats.add_traffic(1, 32);
    stats.add_traffic(2, 32);

    assert_eq!(stats.traffic_bytes[1], 64);
    assert_eq!(stats.traffic_bytes[2], 32);
    assert_eq!(stats.total_traffic_bytes, 96);
}

#[test]
fn miss_rate_handles_zero_accesses() {
    let stats = SimStats::new(4);
    assert_eq!(stats.miss_rate_percent(0), 0.0);
}

#[test]
fn miss_rate_is_a_percentage() {
    let mut stats = SimStats::new(4);
    for _ in 0..8 {
        stats.record_access(0, Operation::Read);
    }
    stats.record_miss(0);
    stats.record_miss(0);

    assert!((stats.miss_rate_percent(0) - 25.0).abs() < f64::EPSILON);
}

// ──────────────────────────────────────────────────────────
// Report rendering
// ──────────────────────────────────────────────────────────

#[test]
fn report_echoes_the_run_parameters() {
    let stats = SimStats::new(4);
    let report = stats.render(&params());

    assert!(report.contains("Trace Prefix: app1"));
    assert!(report.contains("Set Index Bits: 1"));
    assert!(report.contains("Associativity: 2"));
    assert!(report.contains("Block Size (Bytes): 32"));
    assert!(report.contains("Number of Sets: 2"));
}

#[test]
fn report_lists_every_core_and_the_bus_summary() {
    let mut stats = SimStats::new(4);
    stats.record_access(2, Operation::Read);
    stats.record_miss(2);
    stats.set_core_cycles(2, 104);
    stats.add_traffic(2, 32);
    stats.set_total_transactions(1);

    let report = stats.render(&params());

    for core in 0..4 {
        assert!(report.contains(&format!("Core {} Statistics:", core)));
    }
    assert!(report.contains("Total Execution Cycles: 104"));
    assert!(report.contains("Total Bus Transactions: 1"));
    assert!(report.contains("Total Bus Traffic (Bytes): 32"));
}

/// Miss rate prints as a percentage with four decimal places.
#[test]
fn report_formats_miss_rate_to_four_decimals() {
    let mut stats = SimStats::new(4);
    for _ in 0..3 {
        stats.record_access(0, Operation::Read);
    }
    stats.record_miss(0);

    let report = stats.render(&params());
    assert!(
        report.contains("Cache Miss Rate: 33.3333%"),
        "got:\n{}",
        report
    );
}
