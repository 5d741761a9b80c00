//! Page-structure cache (PSCL).
//!
//! A small set-associative cache, one per intermediate page-table level,
//! mapping a virtual-address prefix to the cached physical address of a
//! page-table entry. A hit lets the walker skip re-fetching every level at
//! or above the cached one — the dominant locality pattern for sequential
//! and strided access, where addresses differ only in low-order bits.

use crate::common::{PhysAddr, VirtAddr};

/// One cached prefix-to-PTE-address mapping.
#[derive(Clone, Copy, Debug)]
struct PsclEntry {
    tag: u64,
    data: PhysAddr,
}

/// Set-associative cache of page-table-entry locations for one level.
///
/// Keyed by the virtual-address bits at or above the level's partition
/// shift, i.e. the bits common to every address that shares this level's
/// page-table path. Replacement is least-recently-used within a set,
/// where recency is fill order: probes are read-only.
#[derive(Debug)]
pub struct Pscl {
    /// Per-set entry stacks; front is most recently filled.
    sets: Vec<Vec<PsclEntry>>,
    ways: usize,
    partition_shift: u32,
}

impl Pscl {
    /// Creates a cache with the given geometry.
    ///
    /// `partition_shift` is the lowest virtual-address bit that
    /// participates in the tag; everything below it is ignored.
    pub fn new(sets: usize, ways: usize, partition_shift: u32) -> Self {
        let safe_sets = sets.max(1);
        let safe_ways = ways.max(1);
        Self {
            sets: vec![Vec::with_capacity(safe_ways); safe_sets],
            ways: safe_ways,
            partition_shift,
        }
    }

    /// Tag for an address: all bits at or above the partition shift.
    #[inline]
    fn tag(&self, vaddr: VirtAddr) -> u64 {
        vaddr.val().checked_shr(self.partition_shift).unwrap_or(0)
    }

    #[inline]
    fn set_index(&self, tag: u64) -> usize {
        (tag as usize) % self.sets.len()
    }

    /// Read-only lookup.
    ///
    /// Does not alter replacement ordering, so production hit checks and
    /// external inspection observe identical state.
    pub fn probe(&self, vaddr: VirtAddr) -> Option<PhysAddr> {
        let tag = self.tag(vaddr);
        self.sets[self.set_index(tag)]
            .iter()
            .find(|entry| entry.tag == tag)
            .map(|entry| entry.data)
    }

    /// Inserts or updates the entry for `vaddr`'s prefix.
    ///
    /// A full set evicts its least-recently-filled entry.
    pub fn fill(&mut self, vaddr: VirtAddr, paddr: PhysAddr) {
        let tag = self.tag(vaddr);
        let index = self.set_index(tag);
        let ways = self.ways;
        let set = &mut self.sets[index];

        if let Some(pos) = set.iter().position(|entry| entry.tag == tag) {
            let _ = set.remove(pos);
        } else if set.len() == ways {
            let _ = set.pop();
        }
        set.insert(0, PsclEntry { tag, data: paddr });
    }
}
