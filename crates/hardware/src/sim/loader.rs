//! Trace file loading and parsing.
//!
//! Traces are plain text, one memory reference per line: a single `R` or `W`
//! (case-insensitive), whitespace, and a hexadecimal address with or without
//! a `0x` prefix. Malformed lines are skipped silently; end of file marks
//! trace exhaustion.
//!
//! The four per-core files of a run share a base name and are templated as
//! `<base>_proc<i>.trace`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;

use crate::common::error::ConfigError;
use crate::common::Addr;
use crate::protocol::Operation;

/// One parsed trace line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    /// Read or write.
    pub op: Operation,
    /// The referenced address.
    pub addr: Addr,
}

/// A buffered cursor over one core's trace file.
#[derive(Debug)]
pub struct TraceFile {
    reader: BufReader<File>,
    line: String,
    exhausted: bool,
}

impl TraceFile {
    /// Opens a trace file for reading.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        Ok(Self {
            reader: BufReader::new(File::open(path)?),
            line: String::new(),
            exhausted: false,
        })
    }

    /// Returns the next well-formed record, skipping malformed lines.
    ///
    /// `None` means the trace is exhausted; every subsequent call keeps
    /// returning `None`.
    pub fn next_record(&mut self) -> Option<TraceRecord> {
        while !self.exhausted {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) | Err(_) => {
                    self.exhausted = true;
                    return None;
                }
                Ok(_) => {}
            }
            match parse_record(&self.line) {
                Some(record) => return Some(record),
                None => {
                    if !self.line.trim().is_empty() {
                        debug!("skipping malformed trace line: {:?}", self.line.trim_end());
                    }
                }
            }
        }
        None
    }
}

/// Parses a single trace line.
///
/// # Returns
///
/// The record, or `None` for blank or malformed lines.
pub fn parse_record(line: &str) -> Option<TraceRecord> {
    let mut parts = line.split_whitespace();
    let op = match parts.next()? {
        "R" | "r" => Operation::Read,
        "W" | "w" => Operation::Write,
        _ => return None,
    };
    let raw = parts.next()?;
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    let addr = Addr::from_str_radix(digits, 16).ok()?;
    Some(TraceRecord { op, addr })
}

/// The trace path for one core under a run's base name.
pub fn trace_path(base: &str, core: usize) -> String {
    format!("{}_proc{}.trace", base, core)
}

/// Opens all per-core trace files for a run.
///
/// # Errors
///
/// Any file that cannot be opened is a fatal configuration error carrying
/// the core id and path.
pub fn open_traces(base: &str, num_cores: usize) -> Result<Vec<TraceFile>, ConfigError> {
    let mut traces = Vec::with_capacity(num_cores);
    for core in 0..num_cores {
        let path = trace_path(base, core);
        let trace = TraceFile::open(Path::new(&path)).map_err(|source| ConfigError::TraceOpen {
            core,
            path: path.clone(),
            source,
        })?;
        traces.push(trace);
    }
    Ok(traces)
}
