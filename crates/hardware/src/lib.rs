//! Cycle-level virtual-memory address-translation engine.
//!
//! This crate models multi-level page-table walks with realistic
//! first-touch latency penalties. It provides the following:
//! 1. **Common:** Strong address types and configurable per-level bit-slicing arithmetic.
//! 2. **MMU:** Demand-paged virtual memory, page-structure caches, and the page-table walker.
//! 3. **Memory:** The downstream memory-port contract and a fixed-latency memory model.
//! 4. **Simulation:** The discrete-time `Operable` protocol and a deterministic cycle driver.
//! 5. **Statistics:** Walk, cache, and fault counters with derived metrics.
//!
//! The CPU pipeline, cache hierarchy, DRAM timing, and configuration
//! front-ends are external collaborators: they drive the walker once per
//! simulated cycle and service the memory reads it issues.

/// Common types and constants (addresses, bit slicing, errors).
pub mod common;
/// Engine configuration (defaults and hierarchical config structures).
pub mod config;
/// Downstream memory port and fixed-latency memory model.
pub mod mem;
/// Translation engine (virtual memory, page-structure caches, walker).
pub mod mmu;
/// Discrete-time scheduling primitives.
pub mod sim;
/// Walker statistics collection.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Demand-paged virtual-memory state; one per simulation instance.
pub use crate::mmu::VirtualMemory;
/// Per-core page-table walker; construct with a shared `VirtualMemory`.
pub use crate::mmu::PageTableWalker;
