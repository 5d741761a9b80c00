//! Bit-slicing arithmetic tests.
//!
//! Verifies the per-level shift/mask computations against hand-computed
//! values for two distinct page geometries, and the round-trip property
//! that the index fields plus the page offset reconstruct the address.

use proptest::prelude::*;
use rstest::rstest;

use vmwalk_core::common::addr::{PhysAddr, VirtAddr, level_index, shift_amount, upper_slice};

const VADDR: u64 = 0xDEAD_BEEF_1234;

// ══════════════════════════════════════════════════════════
// 1. Shift amounts
// ══════════════════════════════════════════════════════════

#[rstest]
// 4 KiB pages, 4 KiB PTE pages: 12-bit fields starting at 12.
#[case(12, 12, 1, 12)]
#[case(12, 12, 2, 24)]
#[case(12, 12, 3, 36)]
#[case(12, 12, 4, 48)]
#[case(12, 12, 5, 60)]
// 8 KiB pages, 2 KiB PTE pages: 11-bit fields starting at 13.
#[case(13, 11, 1, 13)]
#[case(13, 11, 2, 24)]
#[case(13, 11, 3, 35)]
#[case(13, 11, 4, 46)]
fn shift_amount_matches_hand_computed(
    #[case] page_shift: u32,
    #[case] log2_pte: u32,
    #[case] level: usize,
    #[case] expected: u32,
) {
    assert_eq!(shift_amount(page_shift, log2_pte, level), expected);
}

// ══════════════════════════════════════════════════════════
// 2. Index fields
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(12, 12, 1, 0xEF1)]
#[case(12, 12, 2, 0xDBE)]
#[case(12, 12, 3, 0xDEA)]
#[case(12, 12, 4, 0x0)]
#[case(13, 11, 1, 0x778)]
#[case(13, 11, 2, 0x5BE)]
#[case(13, 11, 3, 0x3D5)]
#[case(13, 11, 4, 0x3)]
fn level_index_matches_hand_computed(
    #[case] page_shift: u32,
    #[case] log2_pte: u32,
    #[case] level: usize,
    #[case] expected: u64,
) {
    assert_eq!(
        level_index(VirtAddr::new(VADDR), page_shift, log2_pte, level),
        expected
    );
}

#[test]
fn level_index_beyond_address_width_is_empty() {
    // shift_amount(12, 12, 6) = 72 >= 64: the field is past the address.
    assert_eq!(level_index(VirtAddr::new(u64::MAX), 12, 12, 6), 0);
    assert_eq!(upper_slice(VirtAddr::new(u64::MAX), 12, 12, 6), 0);
}

// ══════════════════════════════════════════════════════════
// 3. Page arithmetic
// ══════════════════════════════════════════════════════════

#[test]
fn page_offset_and_number_partition_the_address() {
    let vaddr = VirtAddr::new(VADDR);
    assert_eq!(vaddr.page_offset(12), 0x234);
    assert_eq!(vaddr.page_number(12), 0xDEAD_BEEF_1);
    assert_eq!(
        (vaddr.page_number(12) << 12) | vaddr.page_offset(12),
        VADDR
    );
}

#[test]
fn splice_preserves_offset_bits() {
    let paddr = PhysAddr::splice(0x1234, 0xABC, 12);
    assert_eq!(paddr.val(), 0x1234_ABC);
    // Offset bits above the page boundary are discarded, not spliced.
    assert_eq!(PhysAddr::splice(0x1, 0xF_FFF, 12).val(), 0x1FFF);
}

// ══════════════════════════════════════════════════════════
// 4. Round-trip reconstruction
// ══════════════════════════════════════════════════════════

proptest! {
    /// Reassembling every level's index field plus the page offset must
    /// reproduce the original address path.
    #[test]
    fn index_fields_reconstruct_the_address(vaddr in any::<u64>()) {
        let (page_shift, log2_pte, levels) = (12u32, 12u32, 4usize);
        let addr = VirtAddr::new(vaddr);

        let mut rebuilt = addr.page_offset(page_shift);
        for level in 1..=levels {
            rebuilt |= level_index(addr, page_shift, log2_pte, level)
                << shift_amount(page_shift, log2_pte, level);
        }

        let covered_bits = shift_amount(page_shift, log2_pte, levels + 1);
        prop_assert_eq!(rebuilt, vaddr & ((1u64 << covered_bits) - 1));
    }
}
