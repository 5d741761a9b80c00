//! Walker statistics collection and reporting.
//!
//! Tracks the observable behavior of one page-table walker. It provides:
//! 1. **Walk counts:** Started, completed, and merged translation requests.
//! 2. **Cache behavior:** Page-structure-cache probes, hits, and misses.
//! 3. **Traffic:** Downstream issues and first-touch (minor fault) allocations.
//! 4. **Latency:** Cumulative walk latency and the derived average.

/// Statistics for one page-table walker instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WalkerStats {
    /// Walks admitted from the read queue.
    pub walks_started: u64,
    /// Walks whose result has been delivered.
    pub walks_completed: u64,
    /// Requests coalesced onto an already in-flight walk.
    pub requests_merged: u64,
    /// Page-structure-cache probes that hit.
    pub pscl_hits: u64,
    /// Page-structure-cache probes that missed.
    pub pscl_misses: u64,
    /// Memory-read requests accepted by the downstream port.
    pub downstream_issues: u64,
    /// First-touch allocations charged during walks (data pages and PTE slots).
    pub minor_faults: u64,
    /// Sum of per-walk latencies, admission to delivery, in cycles.
    pub total_walk_latency: u64,
}

impl WalkerStats {
    /// Average walk latency in cycles, or zero before any walk completes.
    pub fn average_walk_latency(&self) -> f64 {
        if self.walks_completed == 0 {
            0.0
        } else {
            self.total_walk_latency as f64 / self.walks_completed as f64
        }
    }

    /// Fraction of page-structure-cache probes that hit.
    pub fn pscl_hit_rate(&self) -> f64 {
        let probes = self.pscl_hits + self.pscl_misses;
        if probes == 0 {
            0.0
        } else {
            self.pscl_hits as f64 / probes as f64
        }
    }
}
