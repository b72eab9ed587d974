//! Address decomposition tests.
//!
//! Verifies tag/index/block-address extraction and block-address
//! reconstruction across normal and degenerate geometries.

use mesi_core::common::addr::AddressMap;

// ──────────────────────────────────────────────────────────
// Standard geometry: s=1, b=5 (2 sets, 32-byte blocks)
// ──────────────────────────────────────────────────────────

#[test]
fn decomposes_standard_geometry() {
    let map = AddressMap::new(1, 5);

    // 0x100 = 0b1_0000_0000: offset 0, index bit = (0x100 >> 5) & 1 = 0,
    // tag = 0x100 >> 6 = 4.
    assert_eq!(map.block_addr(0x100), 0x100);
    assert_eq!(map.index(0x100), 0);
    assert_eq!(map.tag(0x100), 4);

    // Mid-block address maps to the same block.
    assert_eq!(map.block_addr(0x11f), 0x100);
    assert_eq!(map.index(0x11f), 0);
    assert_eq!(map.tag(0x11f), 4);

    // 0x20 lands in set 1.
    assert_eq!(map.index(0x20), 1);
}

#[test]
fn reconstruct_inverts_decomposition() {
    let map = AddressMap::new(3, 5);
    for addr in [0x0u32, 0x40, 0x3c0, 0x1234_5670 & !0x1f, 0xffff_ffe0] {
        let block = map.block_addr(addr);
        let rebuilt = map.reconstruct(map.tag(block), map.index(block));
        assert_eq!(rebuilt, block, "reconstruction should invert {:#x}", addr);
    }
}

// ──────────────────────────────────────────────────────────
// Degenerate geometries
// ──────────────────────────────────────────────────────────

/// s = 0 is a single fully associative set: every address indexes set 0.
#[test]
fn zero_set_bits_is_fully_associative() {
    let map = AddressMap::new(0, 5);
    assert_eq!(map.num_sets(), 1);
    assert_eq!(map.index(0x0), 0);
    assert_eq!(map.index(0xdead_beef), 0);
    // With no index bits the tag is the whole block number.
    assert_eq!(map.tag(0x100), 0x100 >> 5);
}

/// When s + b reaches the address width there are no tag bits left.
#[test]
fn tag_collapses_at_address_width() {
    let map = AddressMap::new(27, 5);
    assert_eq!(map.tag(0xffff_ffff), 0);
    // Reconstruction of a zero tag keeps the index bits.
    assert_eq!(map.reconstruct(0, 3), 3 << 5);
}

#[test]
fn block_size_and_set_count_follow_bits() {
    let map = AddressMap::new(4, 6);
    assert_eq!(map.num_sets(), 16);
    assert_eq!(map.block_size(), 64);
}
