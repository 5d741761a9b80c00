//! Page-structure-cache tests.

use vmwalk_core::common::{PhysAddr, VirtAddr};
use vmwalk_core::mmu::Pscl;

#[test]
fn probe_misses_until_filled() {
    let mut pscl = Pscl::new(1, 2, 21);
    let vaddr = VirtAddr::new(0xABCD_E012_3456);

    assert_eq!(pscl.probe(vaddr), None);
    pscl.fill(vaddr, PhysAddr::new(0x1000));
    assert_eq!(pscl.probe(vaddr), Some(PhysAddr::new(0x1000)));
}

#[test]
fn bits_below_the_partition_shift_are_ignored() {
    let mut pscl = Pscl::new(1, 2, 21);
    pscl.fill(VirtAddr::new(0xABCD_E000_0000), PhysAddr::new(0x1000));

    // Any address sharing the bits at or above 21 hits the same entry.
    assert_eq!(
        pscl.probe(VirtAddr::new(0xABCD_E01F_FFFF)),
        Some(PhysAddr::new(0x1000))
    );
    // Flipping bit 21 changes the tag.
    assert_eq!(pscl.probe(VirtAddr::new(0xABCD_E020_0000)), None);
}

#[test]
fn refill_updates_the_cached_address() {
    let mut pscl = Pscl::new(1, 4, 12);
    let vaddr = VirtAddr::new(0x5000);

    pscl.fill(vaddr, PhysAddr::new(0x1000));
    pscl.fill(vaddr, PhysAddr::new(0x2000));
    assert_eq!(pscl.probe(vaddr), Some(PhysAddr::new(0x2000)));
}

#[test]
fn full_set_evicts_the_least_recently_filled_entry() {
    let mut pscl = Pscl::new(1, 2, 12);
    let (a, b, c) = (
        VirtAddr::new(0xA000),
        VirtAddr::new(0xB000),
        VirtAddr::new(0xC000),
    );

    pscl.fill(a, PhysAddr::new(0xA));
    pscl.fill(b, PhysAddr::new(0xB));
    pscl.fill(c, PhysAddr::new(0xC));

    assert_eq!(pscl.probe(a), None);
    assert_eq!(pscl.probe(b), Some(PhysAddr::new(0xB)));
    assert_eq!(pscl.probe(c), Some(PhysAddr::new(0xC)));
}

#[test]
fn refilling_an_entry_refreshes_its_recency() {
    let mut pscl = Pscl::new(1, 2, 12);
    let (a, b, c) = (
        VirtAddr::new(0xA000),
        VirtAddr::new(0xB000),
        VirtAddr::new(0xC000),
    );

    pscl.fill(a, PhysAddr::new(0xA));
    pscl.fill(b, PhysAddr::new(0xB));
    // Refill `a`: `b` becomes the eviction victim.
    pscl.fill(a, PhysAddr::new(0xA));
    pscl.fill(c, PhysAddr::new(0xC));

    assert_eq!(pscl.probe(a), Some(PhysAddr::new(0xA)));
    assert_eq!(pscl.probe(b), None);
    assert_eq!(pscl.probe(c), Some(PhysAddr::new(0xC)));
}

#[test]
fn tags_spread_across_sets() {
    let mut pscl = Pscl::new(2, 1, 12);

    // Tags 0x10 and 0x11 land in different sets, so a one-way cache can
    // hold both.
    pscl.fill(VirtAddr::new(0x10_000), PhysAddr::new(0x1));
    pscl.fill(VirtAddr::new(0x11_000), PhysAddr::new(0x2));

    assert_eq!(pscl.probe(VirtAddr::new(0x10_000)), Some(PhysAddr::new(0x1)));
    assert_eq!(pscl.probe(VirtAddr::new(0x11_000)), Some(PhysAddr::new(0x2)));

    // A tag conflicting in set parity evicts the resident entry.
    pscl.fill(VirtAddr::new(0x12_000), PhysAddr::new(0x3));
    assert_eq!(pscl.probe(VirtAddr::new(0x10_000)), None);
    assert_eq!(pscl.probe(VirtAddr::new(0x12_000)), Some(PhysAddr::new(0x3)));
}
