//! Error types for the translation engine.
//!
//! Configuration mistakes are surfaced at construction time and are not
//! recoverable; physical-page pool exhaustion is surfaced at runtime
//! through the walker's `operate` result rather than a panic, so a
//! driving simulator can terminate the run cleanly.

use thiserror::Error;

/// Errors raised by the virtual-memory model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmemError {
    /// A configured page size is not a power of two.
    #[error("page size {0:#x} is not a power of two")]
    PageSizeNotPowerOfTwo(u64),

    /// The PTE-page size is too small to index a meaningful table.
    #[error("PTE page size {0:#x} must be larger than 1 KiB")]
    PtePageTooSmall(u64),

    /// The computed physical-page pool is empty or inverted.
    ///
    /// The reserved low region already covers the whole addressable
    /// physical space implied by the levels/page-size product.
    #[error("physical page pool is empty (next {next:#x}, last {last:#x})")]
    EmptyPool {
        /// First allocatable page number.
        next: u64,
        /// One past the last allocatable page number.
        last: u64,
    },

    /// The physical-page pool was exhausted during a walk.
    ///
    /// The model never evicts or reuses pages, so this ends the run.
    #[error("out of physical pages while walking {vaddr:#x}")]
    OutOfPhysicalPages {
        /// Virtual address whose walk triggered the allocation.
        vaddr: u64,
    },
}
