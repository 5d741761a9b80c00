//! Physical and Virtual Address types and bit-slicing arithmetic.
//!
//! This module defines strong types for physical and virtual addresses to
//! prevent accidental mixing of address spaces, together with the pure
//! functions that slice an address into its per-level page-table index
//! fields. It provides the following:
//! 1. **Type Safety:** Distinguishes between virtual and physical address spaces at compile time.
//! 2. **Page Arithmetic:** Page-number and page-offset extraction for a configurable page shift.
//! 3. **Level Slicing:** Shift/mask computation for multi-level page-table index fields.
//!
//! All slicing boundaries are derived from configuration (page size and
//! PTE-page size), never hard-coded.

/// A virtual address in the simulated address space.
///
/// Virtual addresses are produced by the simulated cores and must be
/// translated to physical addresses before memory timing can be modeled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtAddr(pub u64);

/// A physical address in the simulated address space.
///
/// Physical addresses identify locations in the modeled physical memory;
/// they are produced by the translation engine and consumed by the
/// downstream memory port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysAddr(pub u64);

impl VirtAddr {
    /// Creates a new virtual address from a raw 64-bit value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(&self) -> u64 {
        self.0
    }

    /// Extracts the page offset (the low `page_shift` bits).
    #[inline]
    pub const fn page_offset(&self, page_shift: u32) -> u64 {
        self.0 & ((1 << page_shift) - 1)
    }

    /// Extracts the virtual page number (the address with the page-offset
    /// bits removed).
    #[inline]
    pub const fn page_number(&self, page_shift: u32) -> u64 {
        self.0 >> page_shift
    }
}

impl PhysAddr {
    /// Creates a new physical address from a raw 64-bit value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw 64-bit address value.
    #[inline(always)]
    pub const fn val(&self) -> u64 {
        self.0
    }

    /// Builds a physical address from a page number and a page offset.
    ///
    /// The offset bits are reproduced unchanged below the page boundary.
    #[inline]
    pub const fn splice(ppage: u64, offset: u64, page_shift: u32) -> Self {
        Self((ppage << page_shift) | (offset & ((1 << page_shift) - 1)))
    }
}

/// Returns the bit position where `level`'s index field begins.
///
/// Level 1 indexes directly above the page offset; each higher level is a
/// further `log2_pte_page_size` bits up:
/// `page_shift + log2_pte_page_size * (level - 1)`.
#[inline]
pub const fn shift_amount(page_shift: u32, log2_pte_page_size: u32, level: usize) -> u32 {
    page_shift + log2_pte_page_size * (level as u32 - 1)
}

/// Extracts the `log2_pte_page_size`-bit index field for `level` from `vaddr`.
///
/// A shift at or beyond the address width yields an empty field (zero);
/// this keeps deep-level configurations well defined without widening the
/// address type.
#[inline]
pub const fn level_index(
    vaddr: VirtAddr,
    page_shift: u32,
    log2_pte_page_size: u32,
    level: usize,
) -> u64 {
    let shift = shift_amount(page_shift, log2_pte_page_size, level);
    let shifted = match vaddr.val().checked_shr(shift) {
        Some(v) => v,
        None => 0,
    };
    shifted & ((1 << log2_pte_page_size) - 1)
}

/// Returns the virtual-address bits at or above `level`'s index field.
///
/// Every address sharing this prefix walks through the same page-table
/// entry at `level`; the prefix is the lookup key for both the PTE map and
/// the page-structure caches.
#[inline]
pub const fn upper_slice(
    vaddr: VirtAddr,
    page_shift: u32,
    log2_pte_page_size: u32,
    level: usize,
) -> u64 {
    let shift = shift_amount(page_shift, log2_pte_page_size, level);
    match vaddr.val().checked_shr(shift) {
        Some(v) => v,
        None => 0,
    }
}
