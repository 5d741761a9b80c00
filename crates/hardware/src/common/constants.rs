//! Common constants used throughout the translation engine.

/// Size of one page-table entry in bytes.
///
/// Each entry in a page-table page occupies this many bytes, so a PTE
/// page of `S` bytes holds `S / PTE_BYTES` entries.
pub const PTE_BYTES: u64 = 8;

/// One kibibyte in bytes.
pub const KIB: u64 = 1 << 10;

/// One mebibyte in bytes.
pub const MIB: u64 = 1 << 20;

/// Number of addressable bits in a simulated address.
///
/// Addresses are carried as `u64`, so a configuration that requires more
/// than this many bits of physical addressing cannot be represented
/// faithfully and is reported at construction time.
pub const ADDRESS_BITS: u32 = 64;
