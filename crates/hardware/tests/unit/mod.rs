//! Unit tests for the translation-engine components.

/// Address-type and bit-slicing tests.
pub mod addr;
/// Page-structure-cache tests.
pub mod pscl;
