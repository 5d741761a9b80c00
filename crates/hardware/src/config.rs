//! Configuration system for the translation engine.
//!
//! This module defines all configuration structures used to parameterize
//! the simulator. It provides:
//! 1. **Defaults:** Baseline hardware constants (page geometry, walker queues, memory latency).
//! 2. **Structures:** Hierarchical config for the virtual-memory model, the walker, and the downstream memory.
//!
//! Configuration is supplied as JSON (see [`Config::from_json`]) or use
//! `Config::default()` for a conventional x86-64-like five-level setup.

use serde::Deserialize;

/// Default configuration constants for the translation engine.
///
/// These values define the baseline configuration when not explicitly
/// overridden in a JSON configuration document.
mod defaults {
    /// Data-page size in bytes (4 KiB).
    pub const PAGE_SIZE: u64 = 4096;

    /// Page-table-page size in bytes (4 KiB; 512 eight-byte entries).
    pub const PTE_PAGE_SIZE: u64 = 4096;

    /// Number of page-table levels (five-level radix walk).
    pub const PT_LEVELS: usize = 5;

    /// Latency charged for a first-touch (minor fault) allocation, in cycles.
    pub const MINOR_FAULT_PENALTY: u64 = 200;

    /// Physical address width of the modeled machine, in bits.
    pub const PADDR_BITS: u32 = 48;

    /// Installed physical memory size in bytes (8 GiB).
    ///
    /// Used only for a construction-time sanity warning; the pool itself
    /// is sized from the levels/page-size product.
    pub const PHYSICAL_MEMORY: u64 = 8 << 30;

    /// Page-structure-cache sets per intermediate level (root first).
    pub const PSCL_SETS: [usize; 4] = [1, 1, 2, 4];

    /// Page-structure-cache ways per intermediate level (root first).
    pub const PSCL_WAYS: [usize; 4] = [2, 4, 4, 8];

    /// Concurrent in-flight walk capacity (MSHR entries).
    pub const MSHR_SIZE: usize = 5;

    /// Incoming translation read-queue capacity.
    pub const RQ_SIZE: usize = 16;

    /// Base latency added to every completed walk, in cycles.
    pub const WALKER_LATENCY: u64 = 1;

    /// Downstream memory access latency, in cycles.
    pub const MEMORY_LATENCY: u64 = 100;

    /// Downstream memory in-flight request capacity.
    pub const MEMORY_QUEUE_SIZE: usize = 32;
}

/// Geometry of one page-structure cache: fixed sets and ways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PsclGeometry {
    /// Number of sets.
    pub sets: usize,
    /// Associativity (ways per set).
    pub ways: usize,
}

/// Virtual-memory model configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VmemConfig {
    /// Physical address width of the modeled machine, in bits.
    #[serde(default = "VmemConfig::default_paddr_bits")]
    pub paddr_bits: u32,

    /// Data-page size in bytes; must be a power of two.
    #[serde(default = "VmemConfig::default_page_size")]
    pub page_size: u64,

    /// Page-table-page size in bytes; must be a power of two larger than 1 KiB.
    #[serde(default = "VmemConfig::default_pte_page_size")]
    pub pte_page_size: u64,

    /// Number of page-table levels (root level = `pt_levels`, leaf = 1).
    #[serde(default = "VmemConfig::default_pt_levels")]
    pub pt_levels: usize,

    /// Cycles charged when a data page or PTE slot is touched for the first time.
    #[serde(default = "VmemConfig::default_minor_fault_penalty")]
    pub minor_fault_penalty: u64,

    /// Installed physical memory in bytes, read only for a sanity warning.
    #[serde(default = "VmemConfig::default_physical_memory")]
    pub physical_memory: u64,
}

impl VmemConfig {
    fn default_paddr_bits() -> u32 {
        defaults::PADDR_BITS
    }
    fn default_page_size() -> u64 {
        defaults::PAGE_SIZE
    }
    fn default_pte_page_size() -> u64 {
        defaults::PTE_PAGE_SIZE
    }
    fn default_pt_levels() -> usize {
        defaults::PT_LEVELS
    }
    fn default_minor_fault_penalty() -> u64 {
        defaults::MINOR_FAULT_PENALTY
    }
    fn default_physical_memory() -> u64 {
        defaults::PHYSICAL_MEMORY
    }
}

impl Default for VmemConfig {
    fn default() -> Self {
        Self {
            paddr_bits: defaults::PADDR_BITS,
            page_size: defaults::PAGE_SIZE,
            pte_page_size: defaults::PTE_PAGE_SIZE,
            pt_levels: defaults::PT_LEVELS,
            minor_fault_penalty: defaults::MINOR_FAULT_PENALTY,
            physical_memory: defaults::PHYSICAL_MEMORY,
        }
    }
}

/// Page-table-walker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WalkerConfig {
    /// Per-level cache geometry for the intermediate levels, root level
    /// first. Levels without an entry fall back to a one-entry cache.
    #[serde(default = "WalkerConfig::default_pscl")]
    pub pscl: Vec<PsclGeometry>,

    /// Concurrent in-flight walk capacity (MSHR entries).
    #[serde(default = "WalkerConfig::default_mshr_size")]
    pub mshr_size: usize,

    /// Incoming translation read-queue capacity.
    #[serde(default = "WalkerConfig::default_rq_size")]
    pub rq_size: usize,

    /// Base latency added to every completed walk, in cycles.
    #[serde(default = "WalkerConfig::default_latency")]
    pub latency: u64,
}

impl WalkerConfig {
    fn default_pscl() -> Vec<PsclGeometry> {
        defaults::PSCL_SETS
            .iter()
            .zip(defaults::PSCL_WAYS.iter())
            .map(|(&sets, &ways)| PsclGeometry { sets, ways })
            .collect()
    }
    fn default_mshr_size() -> usize {
        defaults::MSHR_SIZE
    }
    fn default_rq_size() -> usize {
        defaults::RQ_SIZE
    }
    fn default_latency() -> u64 {
        defaults::WALKER_LATENCY
    }
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            pscl: Self::default_pscl(),
            mshr_size: defaults::MSHR_SIZE,
            rq_size: defaults::RQ_SIZE,
            latency: defaults::WALKER_LATENCY,
        }
    }
}

/// Downstream memory model configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MemoryConfig {
    /// Fixed access latency in cycles.
    #[serde(default = "MemoryConfig::default_latency")]
    pub latency: u64,

    /// In-flight request capacity; `issue` rejects when full.
    #[serde(default = "MemoryConfig::default_queue_size")]
    pub queue_size: usize,
}

impl MemoryConfig {
    fn default_latency() -> u64 {
        defaults::MEMORY_LATENCY
    }
    fn default_queue_size() -> usize {
        defaults::MEMORY_QUEUE_SIZE
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            latency: defaults::MEMORY_LATENCY,
            queue_size: defaults::MEMORY_QUEUE_SIZE,
        }
    }
}

/// Root configuration for one simulated translation engine.
///
/// # Example
///
/// ```
/// use vmwalk_core::config::Config;
///
/// let json = r#"{
///     "vmem": { "pt_levels": 4, "minor_fault_penalty": 150 },
///     "walker": { "mshr_size": 8 },
///     "memory": { "latency": 80 }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.vmem.pt_levels, 4);
/// assert_eq!(config.walker.mshr_size, 8);
/// assert_eq!(config.memory.latency, 80);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Virtual-memory model parameters.
    #[serde(default)]
    pub vmem: VmemConfig,
    /// Page-table-walker parameters.
    #[serde(default)]
    pub walker: WalkerConfig,
    /// Downstream memory parameters.
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Config {
    /// Deserializes a configuration from a JSON document.
    ///
    /// Missing fields take the documented defaults.
    ///
    /// # Errors
    ///
    /// Returns the underlying deserialization error for malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
