//! MESI multiprocessor cache simulator CLI.
//!
//! Runs four trace-driven cores against private L1 caches kept coherent over
//! a shared snooping bus, then prints per-core and bus-wide statistics.
//!
//! Exit codes: 0 on success (and for `-h`), 1 on argument errors and runtime
//! failures.

use clap::error::ErrorKind;
use clap::Parser;
use std::io::Write;
use std::{fs, process};

use mesi_core::config::Config;
use mesi_core::stats::ReportParams;
use mesi_core::Simulator;

#[derive(Parser, Debug)]
#[command(
    name = "l1sim",
    about = "Cycle-accurate MESI snooping-bus cache simulator",
    long_about = "Simulates four cores with private L1 caches over a shared snooping bus.\n\
                  Each core replays the trace file <base>_proc<i>.trace.\n\n\
                  Example:\n  l1sim -t traces/app1 -s 5 -E 2 -b 5"
)]
struct Cli {
    /// Base name of the four trace files (e.g. app1 for app1_proc0.trace ...).
    #[arg(short = 't')]
    trace_base: String,

    /// Number of set index bits (number of sets = 2^s).
    #[arg(short = 's')]
    set_bits: u32,

    /// Associativity (lines per set, E > 0).
    #[arg(short = 'E')]
    associativity: usize,

    /// Number of block offset bits (block size = 2^b bytes, b >= 2).
    #[arg(short = 'b')]
    block_bits: u32,

    /// Optional file to receive a copy of the statistics report.
    #[arg(short = 'o')]
    output: Option<String>,
}

fn main() {
    env_logger::init();

    // Help is success; any argument problem exits 1.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayHelp || e.kind() == ErrorKind::DisplayVersion => {
            print!("{}", e);
            process::exit(0);
        }
        Err(e) => {
            eprint!("{}", e);
            process::exit(1);
        }
    };

    let mut config = Config::default();
    config.cache.set_bits = cli.set_bits;
    config.cache.ways = cli.associativity;
    config.cache.block_bits = cli.block_bits;

    let mut sim = match Simulator::from_traces(&config, &cli.trace_base) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = sim.run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let params = ReportParams {
        trace_prefix: cli.trace_base.clone(),
        set_bits: cli.set_bits,
        ways: cli.associativity,
        block_bits: cli.block_bits,
    };
    let report = sim.stats.render(&params);
    print!("{}", report);
    let _ = std::io::stdout().flush();

    if let Some(path) = cli.output {
        if let Err(e) = fs::write(&path, &report) {
            eprintln!("Error: could not write report to {}: {}", path, e);
            process::exit(1);
        }
    }
}
