//! Common utilities and types used throughout the translation engine.
//!
//! This module provides fundamental building blocks shared across all
//! components of the simulator. It includes:
//! 1. **Address Types:** Strong types for virtual and physical addresses.
//! 2. **Bit Slicing:** Pure per-level shift/mask arithmetic over configurable page sizes.
//! 3. **Constants:** System-wide constants for pages, entries, and address widths.
//! 4. **Error Handling:** Configuration and resource-exhaustion error types.

/// Address type definitions and bit-slicing arithmetic.
pub mod addr;

/// Common constants used throughout the engine.
pub mod constants;

/// Error type definitions.
pub mod error;

pub use addr::{PhysAddr, VirtAddr, level_index, shift_amount, upper_slice};
pub use constants::{ADDRESS_BITS, KIB, MIB, PTE_BYTES};
pub use error::VmemError;
