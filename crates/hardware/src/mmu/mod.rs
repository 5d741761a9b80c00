//! Virtual-memory translation engine.
//!
//! Components, leaves first:
//! 1. **VirtualMemory:** Physical-page allocator and the lazily populated data-page and PTE-location maps.
//! 2. **Pscl:** Per-level page-structure caches of intermediate PTE locations.
//! 3. **PageTableWalker:** The per-request walk state machine tying the two together.

/// Page-structure cache (per-level PTE-location cache).
pub mod pscl;

/// Demand-paged virtual-memory model.
pub mod vmem;

/// Page-table walker state machine.
pub mod walker;

pub use pscl::Pscl;
pub use vmem::VirtualMemory;
pub use walker::{FinishedTranslation, PageTableWalker, TranslationRequest};
