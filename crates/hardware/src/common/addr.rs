//! Address decomposition for set-associative caches.
//!
//! Splits a physical address into block offset, set index, and tag for a
//! geometry of `2^s` sets and `2^b`-byte blocks, and reconstructs a block
//! address from a stored tag. All shifts are guarded so that degenerate
//! geometries (`s = 0`, or `s + b` at the address width) stay well defined.

use super::constants::ADDR_BITS;
use super::Addr;

/// Maps addresses onto a fixed `(s, b)` cache geometry.
///
/// One instance is shared by a cache and its tests; it holds no per-access
/// state, only the two bit widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressMap {
    set_bits: u32,
    block_bits: u32,
}

impl AddressMap {
    /// Creates an address map for `2^set_bits` sets of `2^block_bits`-byte blocks.
    pub fn new(set_bits: u32, block_bits: u32) -> Self {
        Self {
            set_bits,
            block_bits,
        }
    }

    /// Number of sets in this geometry. `set_bits = 0` means one set
    /// (fully associative).
    #[inline]
    pub fn num_sets(&self) -> usize {
        1usize << self.set_bits
    }

    /// Block size in bytes.
    #[inline]
    pub fn block_size(&self) -> u32 {
        1u32 << self.block_bits
    }

    /// Extracts the tag (the address bits above index and offset).
    ///
    /// When `set_bits + block_bits` reaches the address width there are no
    /// tag bits left and the tag is zero.
    #[inline]
    pub fn tag(&self, addr: Addr) -> Addr {
        let shift = self.set_bits + self.block_bits;
        if shift >= ADDR_BITS {
            return 0;
        }
        addr >> shift
    }

    /// Extracts the set index.
    #[inline]
    pub fn index(&self, addr: Addr) -> usize {
        if self.set_bits == 0 {
            return 0;
        }
        let mask = (1u32 << self.set_bits) - 1;
        ((addr >> self.block_bits) & mask) as usize
    }

    /// Masks off the block offset, yielding the block's base address.
    #[inline]
    pub fn block_addr(&self, addr: Addr) -> Addr {
        if self.block_bits >= ADDR_BITS {
            return 0;
        }
        addr & !((1u32 << self.block_bits) - 1)
    }

    /// Rebuilds a block address from a stored tag and set index.
    ///
    /// Used when a victim line must be written back: the line only stores its
    /// tag, and the full block address is `tag | index | 0-offset`.
    pub fn reconstruct(&self, tag: Addr, index: usize) -> Addr {
        let tag_part = tag.checked_shl(self.set_bits + self.block_bits).unwrap_or(0);
        tag_part | ((index as u32) << self.block_bits)
    }
}
