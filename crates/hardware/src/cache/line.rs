//! A single cache line: MESI state, tag, and LRU timestamp.

use crate::common::{Addr, Cycle};
use crate::protocol::MesiState;

/// One way of a cache set. No data is modeled, only the tag and state; the
/// timestamp orders lines for LRU victim selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheLine {
    /// MESI state; `Invalid` means the line holds no valid copy.
    pub state: MesiState,
    /// Upper address bits identifying the cached block within its set.
    pub tag: Addr,
    /// Cycle of the last hit or fill; never advanced by snoops.
    pub last_used: Cycle,
}

impl CacheLine {
    /// Whether the line holds a valid copy.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.state.is_valid()
    }
}
