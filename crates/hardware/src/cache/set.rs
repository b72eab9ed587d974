//! A fixed E-way cache set with timestamp-based LRU.

use super::line::CacheLine;
use crate::common::{Addr, Cycle};

/// An ordered sequence of E lines. Two valid lines in a set never share a
/// tag; lookup is a linear scan over the ways.
#[derive(Debug, Clone)]
pub struct CacheSet {
    lines: Vec<CacheLine>,
}

impl CacheSet {
    /// Creates a set of `ways` invalid lines.
    pub fn new(ways: usize) -> Self {
        Self {
            lines: vec![CacheLine::default(); ways],
        }
    }

    /// Finds the way holding a valid line with the given tag.
    pub fn find_line(&self, tag: Addr) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.is_valid() && line.tag == tag)
    }

    /// Finds an invalid way, preferring the lowest index.
    pub fn find_invalid_line(&self) -> Option<usize> {
        self.lines.iter().position(|line| !line.is_valid())
    }

    /// Selects the LRU victim: the valid line with the smallest `last_used`,
    /// ties broken by the lowest way index. Falls back to way 0 if no line is
    /// valid (callers check for invalid ways first).
    pub fn lru_victim(&self) -> usize {
        let mut victim = 0;
        let mut min_cycle = Cycle::MAX;
        let mut found_valid = false;
        for (way, line) in self.lines.iter().enumerate() {
            if line.is_valid() && line.last_used < min_cycle {
                min_cycle = line.last_used;
                victim = way;
                found_valid = true;
            }
        }
        if !found_valid {
            return 0;
        }
        victim
    }

    /// Stamps a hit or fill on `way` for LRU ordering.
    pub fn touch(&mut self, way: usize, cycle: Cycle) {
        if way < self.lines.len() {
            self.lines[way].last_used = cycle;
        }
    }

    /// Borrow a line by way index.
    #[inline]
    pub fn line(&self, way: usize) -> &CacheLine {
        &self.lines[way]
    }

    /// Mutably borrow a line by way index.
    #[inline]
    pub fn line_mut(&mut self, way: usize) -> &mut CacheLine {
        &mut self.lines[way]
    }

    /// Number of ways in the set.
    #[inline]
    pub fn ways(&self) -> usize {
        self.lines.len()
    }

    /// Iterates over the lines in way order.
    pub fn iter(&self) -> impl Iterator<Item = &CacheLine> {
        self.lines.iter()
    }
}
