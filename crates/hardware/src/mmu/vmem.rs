//! Demand-paged virtual-memory model.
//!
//! This module owns the physical-page allocator and the two lazily
//! populated translation maps: virtual page to physical page, and
//! page-table-entry location to physical address. Pages are allocated on
//! first touch, charged with a minor-fault penalty, and never evicted or
//! reused; the pool is a bounded, monotonically consumed range of page
//! numbers adequate for one simulation run.

use std::collections::HashMap;

use tracing::{trace, warn};

use crate::common::constants::{ADDRESS_BITS, KIB, MIB, PTE_BYTES};
use crate::common::{PhysAddr, VirtAddr, VmemError, level_index, shift_amount, upper_slice};
use crate::config::VmemConfig;

/// Composite key for the data-page map: one mapping per requester and
/// virtual page number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct VpageKey {
    cpu: u32,
    vpn: u64,
}

/// Composite key for the PTE-location map: one entry per requester,
/// page-table level, and virtual-address prefix above that level's index
/// bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct PteKey {
    cpu: u32,
    level: usize,
    prefix: u64,
}

/// Demand-paged virtual-memory state for one simulation instance.
///
/// The allocator and maps are explicitly owned by this object; construct
/// one per simulation so independent instances cannot interfere. Multiple
/// walkers (one per simulated core) may share a single instance under the
/// single-threaded discrete-time model.
#[derive(Debug)]
pub struct VirtualMemory {
    vpage_to_ppage: HashMap<VpageKey, u64>,
    page_table: HashMap<PteKey, PhysAddr>,

    /// Page currently receiving new PTE slots, if one is open.
    active_pte_page: Option<u64>,
    /// Slot cursor within the active PTE page; wraps at `slots_per_pte_page`.
    next_pte_offset: u64,

    /// Next allocatable physical page number.
    next_ppage: u64,
    /// One past the last allocatable physical page number.
    last_ppage: u64,

    /// Cycles charged on a first-touch allocation.
    pub minor_fault_penalty: u64,
    /// Number of page-table levels (root = `pt_levels`, leaf = 1).
    pub pt_levels: usize,
    /// Size of a page-table page in bytes.
    pub pte_page_size: u64,

    page_shift: u32,
    log2_pte_page_size: u32,
}

impl VirtualMemory {
    /// Builds the virtual-memory model from its configuration.
    ///
    /// The pool upper bound is the page count implied by raising the
    /// PTE-page size to the number of levels; the lower bound reserves at
    /// least one page or one mebibyte (whichever is larger) so that page
    /// number zero is never handed out.
    ///
    /// Non-fatal configuration risks are reported with `tracing::warn!`:
    /// an address space wider than the configured physical address bits
    /// (or wider than `u64` can carry), and a virtual space larger than
    /// the installed physical memory.
    ///
    /// # Errors
    ///
    /// Returns an error when a page size is not a power of two, the
    /// PTE-page size is 1 KiB or smaller, or the computed pool is empty.
    pub fn new(config: &VmemConfig) -> Result<Self, VmemError> {
        if !config.page_size.is_power_of_two() {
            return Err(VmemError::PageSizeNotPowerOfTwo(config.page_size));
        }
        if !config.pte_page_size.is_power_of_two() {
            return Err(VmemError::PageSizeNotPowerOfTwo(config.pte_page_size));
        }
        if config.pte_page_size <= KIB {
            return Err(VmemError::PtePageTooSmall(config.pte_page_size));
        }

        let page_shift = config.page_size.ilog2();
        let log2_pte_page_size = config.pte_page_size.ilog2();

        // Maximum addressable physical space under this configuration,
        // as a page count. Saturates rather than wraps for extreme
        // level/page-size products; the width warning below fires first.
        let last_ppage = config
            .pte_page_size
            .checked_pow(config.pt_levels as u32)
            .unwrap_or(u64::MAX >> page_shift);

        // Reserve at least one page or one mebibyte of low physical
        // space so a zero page number never appears in a translation.
        let reserve_bytes = config.page_size.max(MIB);
        let next_ppage = reserve_bytes >> page_shift;

        if last_ppage <= next_ppage {
            return Err(VmemError::EmptyPool {
                next: next_ppage,
                last: last_ppage,
            });
        }

        let required_bits = page_shift + last_ppage.ilog2();
        if required_bits > config.paddr_bits.min(ADDRESS_BITS) {
            warn!(
                required_bits,
                paddr_bits = config.paddr_bits,
                "virtual memory configuration exceeds the addressable physical bits"
            );
        }
        if config.physical_memory > 0 && required_bits > config.physical_memory.ilog2() {
            warn!(
                required_bits,
                physical_memory = config.physical_memory,
                "physical memory size is smaller than the virtual memory size"
            );
        }

        Ok(Self {
            vpage_to_ppage: HashMap::new(),
            page_table: HashMap::new(),
            active_pte_page: None,
            next_pte_offset: 0,
            next_ppage,
            last_ppage,
            minor_fault_penalty: config.minor_fault_penalty,
            pt_levels: config.pt_levels,
            pte_page_size: config.pte_page_size,
            page_shift,
            log2_pte_page_size,
        })
    }

    /// Returns the bit position where `level`'s index field begins.
    #[inline]
    pub const fn shift_amount(&self, level: usize) -> u32 {
        shift_amount(self.page_shift, self.log2_pte_page_size, level)
    }

    /// Extracts the page-table index field for `level` from `vaddr`.
    #[inline]
    pub const fn offset(&self, vaddr: VirtAddr, level: usize) -> u64 {
        level_index(vaddr, self.page_shift, self.log2_pte_page_size, level)
    }

    /// Returns the configured data-page shift (log2 of the page size).
    #[inline]
    pub const fn page_shift(&self) -> u32 {
        self.page_shift
    }

    /// Remaining allocatable physical pages.
    #[inline]
    pub const fn available_ppages(&self) -> u64 {
        // next_ppage <= last_ppage is a construction invariant and
        // allocation never advances past the bound.
        self.last_ppage - self.next_ppage
    }

    /// Pops the next page from the pool.
    fn ppage_pop(&mut self, vaddr: VirtAddr) -> Result<u64, VmemError> {
        if self.available_ppages() == 0 {
            return Err(VmemError::OutOfPhysicalPages { vaddr: vaddr.val() });
        }
        let ppage = self.next_ppage;
        self.next_ppage += 1;
        Ok(ppage)
    }

    /// Translates a virtual address to its data physical address.
    ///
    /// The first access to a `(cpu, page)` pair allocates the next pool
    /// page and charges the minor-fault penalty; every later access
    /// returns the identical physical address with zero penalty. The
    /// page-offset bits of `vaddr` pass through unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`VmemError::OutOfPhysicalPages`] when a first touch finds
    /// the pool exhausted.
    pub fn translate(
        &mut self,
        cpu: u32,
        vaddr: VirtAddr,
    ) -> Result<(PhysAddr, u64), VmemError> {
        let key = VpageKey {
            cpu,
            vpn: vaddr.page_number(self.page_shift),
        };

        let (ppage, fault) = match self.vpage_to_ppage.get(&key) {
            Some(&ppage) => (ppage, false),
            None => {
                // This vpage doesn't yet have a ppage mapping.
                let ppage = self.ppage_pop(vaddr)?;
                let _ = self.vpage_to_ppage.insert(key, ppage);
                (ppage, true)
            }
        };

        let paddr = PhysAddr::splice(ppage, vaddr.page_offset(self.page_shift), self.page_shift);
        trace!(
            cpu,
            vaddr = vaddr.val(),
            paddr = paddr.val(),
            fault,
            "va_to_pa"
        );

        Ok((paddr, if fault { self.minor_fault_penalty } else { 0 }))
    }

    /// Returns the physical address holding the page-table entry for
    /// `vaddr`'s index path at `level`.
    ///
    /// Entry slots are created lazily, filling the active PTE page in
    /// strictly increasing offset order; when the intra-page cursor
    /// wraps, a fresh pool page becomes the active PTE page. The penalty
    /// is the minor-fault penalty exactly when a new slot was created.
    ///
    /// # Errors
    ///
    /// Returns [`VmemError::OutOfPhysicalPages`] when opening a fresh PTE
    /// page finds the pool exhausted.
    pub fn pte_address(
        &mut self,
        cpu: u32,
        vaddr: VirtAddr,
        level: usize,
    ) -> Result<(PhysAddr, u64), VmemError> {
        debug_assert!((1..=self.pt_levels).contains(&level));

        let key = PteKey {
            cpu,
            level,
            prefix: upper_slice(vaddr, self.page_shift, self.log2_pte_page_size, level),
        };

        if let Some(&paddr) = self.page_table.get(&key) {
            trace!(
                cpu,
                vaddr = vaddr.val(),
                paddr = paddr.val(),
                level,
                fault = false,
                "get_pte_pa"
            );
            return Ok((paddr, 0));
        }

        // This PTE doesn't yet have a slot: open a page if none is
        // active, then consume the next slot in order.
        let page = match self.active_pte_page {
            Some(page) => page,
            None => {
                let page = self.ppage_pop(vaddr)?;
                self.active_pte_page = Some(page);
                page
            }
        };

        let slot = self.next_pte_offset;
        self.next_pte_offset += 1;
        if self.next_pte_offset == self.slots_per_pte_page() {
            self.next_pte_offset = 0;
            self.active_pte_page = None;
        }

        let paddr = PhysAddr::new((page << self.page_shift) + slot * PTE_BYTES);
        let _ = self.page_table.insert(key, paddr);

        trace!(
            cpu,
            vaddr = vaddr.val(),
            paddr = paddr.val(),
            pt_page_offset = slot,
            translation_level = level,
            fault = true,
            "get_pte_pa"
        );

        Ok((paddr, self.minor_fault_penalty))
    }

    /// Number of entry slots in one PTE page.
    #[inline]
    const fn slots_per_pte_page(&self) -> u64 {
        self.pte_page_size / PTE_BYTES
    }
}
