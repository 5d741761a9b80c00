//! Page-table walker.
//!
//! Orchestrates one state machine per in-flight translation: probes the
//! page-structure caches leaf-first to find the deepest level already
//! resolved, issues page-table-entry fetches to the downstream memory
//! port for the remaining levels, fills each level's cache on completion,
//! and finally invokes the leaf translation to produce the data physical
//! address and the accumulated latency.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::trace;

use crate::common::{PhysAddr, VirtAddr, VmemError};
use crate::config::{PsclGeometry, WalkerConfig};
use crate::mem::{MemoryPort, MemoryRequest};
use crate::mmu::pscl::Pscl;
use crate::mmu::vmem::VirtualMemory;
use crate::sim::Operable;
use crate::stats::WalkerStats;

/// A translation request entering the walker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TranslationRequest {
    /// Virtual address to translate.
    pub vaddr: VirtAddr,
    /// Requester id (simulated core number).
    pub cpu: u32,
    /// Caller-chosen id echoed back on completion.
    pub id: u64,
}

/// A completed translation, delivered to every requester merged onto the
/// walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinishedTranslation {
    /// Virtual address that was translated.
    pub vaddr: VirtAddr,
    /// Resulting data physical address.
    pub paddr: PhysAddr,
    /// Requester id the walk belonged to.
    pub cpu: u32,
    /// Cycles from admission to delivery, including fault penalties.
    pub latency: u64,
    /// Ids of all requests coalesced onto this walk, in submission order.
    pub requesters: Vec<u64>,
}

/// One in-flight walk (MSHR entry).
#[derive(Clone, Debug)]
struct WalkEntry {
    vaddr: VirtAddr,
    cpu: u32,
    /// Level whose PTE fetch is pending or in flight; root = `pt_levels`.
    level: usize,
    /// Address of the pending fetch; `None` only after the leaf resolves.
    pending: Option<PhysAddr>,
    /// Whether the pending fetch was accepted downstream.
    issued: bool,
    /// Minor-fault penalty accumulated so far.
    penalty: u64,
    begin_cycle: u64,
    /// Delivery cycle, set once the leaf translation resolves.
    ready_at: Option<u64>,
    result: Option<PhysAddr>,
    requesters: Vec<u64>,
}

/// Page-table walker for one simulated core.
///
/// Holds a bounded read queue and a bounded set of concurrent in-flight
/// walks; both reject rather than grow when full, and the caller retries
/// on a later cycle. Generic over the downstream memory port so tests can
/// substitute a recording mock.
#[derive(Debug)]
pub struct PageTableWalker<P: MemoryPort> {
    name: String,
    pt_levels: usize,
    page_shift: u32,

    /// One cache per intermediate level; index 0 serves the root-most
    /// level (`pt_levels - 1`), the last index serves level 1.
    pscl: Vec<Pscl>,

    rq: VecDeque<TranslationRequest>,
    rq_capacity: usize,
    mshr: Vec<WalkEntry>,
    mshr_capacity: usize,
    base_latency: u64,

    vmem: Rc<RefCell<VirtualMemory>>,
    /// Downstream memory port; owned and ticked by this walker.
    pub downstream: P,

    finished: VecDeque<FinishedTranslation>,
    cycle: u64,
    /// Observable walk statistics.
    pub stats: WalkerStats,
}

impl<P: MemoryPort> PageTableWalker<P> {
    /// Creates a walker bound to a virtual-memory instance and a
    /// downstream port.
    ///
    /// Cache geometries in `config.pscl` apply root-first; intermediate
    /// levels beyond the configured list fall back to a one-entry cache.
    pub fn new(
        name: impl Into<String>,
        config: &WalkerConfig,
        vmem: Rc<RefCell<VirtualMemory>>,
        downstream: P,
    ) -> Self {
        let (pt_levels, page_shift, shifts) = {
            let vmem = vmem.borrow();
            let shifts: Vec<u32> = (1..vmem.pt_levels)
                .rev()
                .map(|level| vmem.shift_amount(level))
                .collect();
            (vmem.pt_levels, vmem.page_shift(), shifts)
        };

        let pscl = shifts
            .iter()
            .enumerate()
            .map(|(i, &shift)| {
                let geometry = config
                    .pscl
                    .get(i)
                    .copied()
                    .unwrap_or(PsclGeometry { sets: 1, ways: 1 });
                Pscl::new(geometry.sets, geometry.ways, shift)
            })
            .collect();

        Self {
            name: name.into(),
            pt_levels,
            page_shift,
            pscl,
            rq: VecDeque::new(),
            rq_capacity: config.rq_size.max(1),
            mshr: Vec::new(),
            mshr_capacity: config.mshr_size.max(1),
            base_latency: config.latency,
            vmem,
            downstream,
            finished: VecDeque::new(),
            cycle: 0,
            stats: WalkerStats::default(),
        }
    }

    /// Returns the walker's name (used in trace output).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read-only probe of the intermediate-level cache serving `level`.
    ///
    /// Exposed for inspection; does not alter replacement state.
    pub fn pscl_probe(&self, level: usize, vaddr: VirtAddr) -> Option<PhysAddr> {
        self.pscl_index(level)
            .and_then(|i| self.pscl[i].probe(vaddr))
    }

    /// Offers a translation request to the read queue.
    ///
    /// Returns `false` when the queue is full; the caller retries on a
    /// later cycle. Acceptance order is delivery-merge order.
    pub fn add_rq(&mut self, request: TranslationRequest) -> bool {
        if self.rq.len() == self.rq_capacity {
            return false;
        }
        self.rq.push_back(request);
        true
    }

    /// Drains the next completed translation, if any.
    pub fn pop_finished(&mut self) -> Option<FinishedTranslation> {
        self.finished.pop_front()
    }

    /// Index of the cache whose entries resolve `level`'s PTE address.
    fn pscl_index(&self, level: usize) -> Option<usize> {
        (1..self.pt_levels)
            .contains(&level)
            .then(|| self.pt_levels - 1 - level)
    }

    /// Consumes downstream completions, each advancing its walk one level.
    fn handle_fills(&mut self) -> Result<(), VmemError> {
        while let Some(completion) = self.downstream.pop_completed() {
            let Some(pos) = self.mshr.iter().position(|entry| {
                entry.issued && entry.ready_at.is_none() && entry.pending == Some(completion.addr)
            }) else {
                // Not ours (e.g. a fetch for an already-delivered walk on
                // a shared port); drop it.
                continue;
            };

            let (vaddr, cpu, level, penalty) = {
                let entry = &self.mshr[pos];
                (entry.vaddr, entry.cpu, entry.level, entry.penalty)
            };

            if level == 1 {
                // Leaf resolved: translate the data page and schedule
                // delivery once all penalties have elapsed.
                let (paddr, fault_penalty) = self.vmem.borrow_mut().translate(cpu, vaddr)?;
                if fault_penalty > 0 {
                    self.stats.minor_faults += 1;
                }
                let total = penalty + fault_penalty + self.base_latency;
                let entry = &mut self.mshr[pos];
                entry.penalty += fault_penalty;
                entry.result = Some(paddr);
                entry.pending = None;
                entry.ready_at = Some(self.cycle + total);
            } else {
                let (next, fault_penalty) =
                    self.vmem.borrow_mut().pte_address(cpu, vaddr, level - 1)?;
                if fault_penalty > 0 {
                    self.stats.minor_faults += 1;
                }
                if let Some(i) = self.pscl_index(level - 1) {
                    self.pscl[i].fill(vaddr, next);
                }
                let entry = &mut self.mshr[pos];
                entry.penalty += fault_penalty;
                entry.level = level - 1;
                entry.pending = Some(next);
                entry.issued = false;
            }
        }
        Ok(())
    }

    /// Issues pending fetches, including retries after downstream
    /// backpressure.
    fn issue_pending(&mut self) {
        for entry in &mut self.mshr {
            if entry.issued || entry.ready_at.is_some() {
                continue;
            }
            let Some(addr) = entry.pending else { continue };
            let accepted = self.downstream.issue(MemoryRequest {
                addr,
                v_address: entry.vaddr,
                cpu: entry.cpu,
            });
            if accepted {
                entry.issued = true;
                self.stats.downstream_issues += 1;
            }
            // A rejected issue stays pending and retries next cycle.
        }
    }

    /// Admits queued requests: merges duplicates onto in-flight walks,
    /// then starts new walks while MSHR capacity remains.
    fn admit(&mut self) -> Result<(), VmemError> {
        while let Some(request) = self.rq.pop_front() {
            let vpn = request.vaddr.page_number(self.page_shift);
            if let Some(entry) = self.mshr.iter_mut().find(|entry| {
                entry.ready_at.is_none()
                    && entry.cpu == request.cpu
                    && entry.vaddr.page_number(self.page_shift) == vpn
            }) {
                entry.requesters.push(request.id);
                self.stats.requests_merged += 1;
                continue;
            }

            if self.mshr.len() == self.mshr_capacity {
                self.rq.push_front(request);
                break;
            }
            self.start_walk(request)?;
        }
        Ok(())
    }

    /// Starts a new walk: the deepest cache hit fixes the starting level,
    /// skipping every level above it.
    fn start_walk(&mut self, request: TranslationRequest) -> Result<(), VmemError> {
        self.stats.walks_started += 1;
        let vaddr = request.vaddr;

        // Probe from the leaf-most intermediate level upward, so the
        // first hit is the one that skips the most fetches.
        let mut start = None;
        for level in 1..self.pt_levels {
            let index = self.pt_levels - 1 - level;
            if let Some(addr) = self.pscl[index].probe(vaddr) {
                self.stats.pscl_hits += 1;
                start = Some((level, addr));
                break;
            }
            self.stats.pscl_misses += 1;
        }

        let (level, addr, penalty) = match start {
            Some((level, addr)) => (level, addr, 0),
            None => {
                let (addr, penalty) =
                    self.vmem
                        .borrow_mut()
                        .pte_address(request.cpu, vaddr, self.pt_levels)?;
                if penalty > 0 {
                    self.stats.minor_faults += 1;
                }
                (self.pt_levels, addr, penalty)
            }
        };

        trace!(
            walker = %self.name,
            cpu = request.cpu,
            vaddr = vaddr.val(),
            start_level = level,
            "walk admitted"
        );

        self.mshr.push(WalkEntry {
            vaddr,
            cpu: request.cpu,
            level,
            pending: Some(addr),
            issued: false,
            penalty,
            begin_cycle: self.cycle,
            ready_at: None,
            result: None,
            requesters: vec![request.id],
        });
        Ok(())
    }

    /// Moves due walks to the finished queue, preserving admission order.
    fn deliver(&mut self) {
        let mut i = 0;
        while i < self.mshr.len() {
            let due = matches!(
                (self.mshr[i].ready_at, self.mshr[i].result),
                (Some(ready_at), Some(_)) if ready_at <= self.cycle
            );
            if !due {
                i += 1;
                continue;
            }
            let entry = self.mshr.remove(i);
            if let (Some(ready_at), Some(paddr)) = (entry.ready_at, entry.result) {
                let latency = ready_at - entry.begin_cycle;
                self.stats.walks_completed += 1;
                self.stats.total_walk_latency += latency;
                trace!(
                    walker = %self.name,
                    cpu = entry.cpu,
                    vaddr = entry.vaddr.val(),
                    paddr = paddr.val(),
                    latency,
                    "walk complete"
                );
                self.finished.push_back(FinishedTranslation {
                    vaddr: entry.vaddr,
                    paddr,
                    cpu: entry.cpu,
                    latency,
                    requesters: entry.requesters,
                });
            }
        }
    }
}

impl<P: MemoryPort> Operable for PageTableWalker<P> {
    /// Advances the walker (and its downstream port) by one cycle.
    ///
    /// Each in-flight walk advances at most one hop per invocation: one
    /// page-table level, or one cycle of downstream latency.
    fn operate(&mut self) -> Result<(), VmemError> {
        self.cycle += 1;
        self.downstream.operate()?;
        self.handle_fills()?;
        self.issue_pending();
        self.admit()?;
        self.deliver();
        Ok(())
    }
}
