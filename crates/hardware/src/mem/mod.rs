//! Downstream memory port and a fixed-latency memory model.
//!
//! The walker issues page-table-entry reads to a [`MemoryPort`] and later
//! observes their completions; the port carries no payload semantics
//! beyond "this address is now resident". This module provides:
//! 1. **Port Contract:** `issue` with backpressure, cycle advance, and completion draining.
//! 2. **Fixed-Latency Model:** A bounded in-flight queue that completes requests in order
//!    once a fixed latency has elapsed.

use std::collections::VecDeque;

use crate::common::{PhysAddr, VirtAddr, VmemError};
use crate::config::MemoryConfig;
use crate::sim::Operable;

/// One memory-read request issued by the walker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryRequest {
    /// Physical address of the page-table entry being fetched.
    pub addr: PhysAddr,
    /// Virtual address whose walk issued this fetch.
    pub v_address: VirtAddr,
    /// Requester id the walk belongs to.
    pub cpu: u32,
}

/// Contract between the walker and the downstream memory hierarchy.
///
/// Implementors advance one cycle per [`Operable::operate`] call and
/// deliver completions no earlier than the cycle at which their modeled
/// latency has elapsed, in deterministic (issue) order.
pub trait MemoryPort: Operable {
    /// Offers a request to the port.
    ///
    /// Returns `false` when the port is full; the caller retries on a
    /// later cycle. A rejected request leaves the port unchanged.
    fn issue(&mut self, request: MemoryRequest) -> bool;

    /// Drains the next completed request, if any.
    fn pop_completed(&mut self) -> Option<MemoryRequest>;
}

/// Fixed-latency memory: every accepted request completes after the same
/// number of cycles.
#[derive(Debug)]
pub struct FixedLatencyMemory {
    latency: u64,
    capacity: usize,
    cycle: u64,
    /// In-flight requests with their completion cycles, in issue order.
    in_flight: VecDeque<(u64, MemoryRequest)>,
    completed: VecDeque<MemoryRequest>,
    /// Total requests accepted over the run.
    pub accesses: u64,
}

impl FixedLatencyMemory {
    /// Creates a memory model from its configuration.
    pub fn new(config: &MemoryConfig) -> Self {
        Self {
            latency: config.latency,
            capacity: config.queue_size.max(1),
            cycle: 0,
            in_flight: VecDeque::new(),
            completed: VecDeque::new(),
            accesses: 0,
        }
    }
}

impl Operable for FixedLatencyMemory {
    fn operate(&mut self) -> Result<(), VmemError> {
        self.cycle += 1;
        while let Some(&(ready_at, request)) = self.in_flight.front() {
            if ready_at > self.cycle {
                break;
            }
            let _ = self.in_flight.pop_front();
            self.completed.push_back(request);
        }
        Ok(())
    }
}

impl MemoryPort for FixedLatencyMemory {
    fn issue(&mut self, request: MemoryRequest) -> bool {
        if self.in_flight.len() == self.capacity {
            return false;
        }
        self.in_flight.push_back((self.cycle + self.latency, request));
        self.accesses += 1;
        true
    }

    fn pop_completed(&mut self) -> Option<MemoryRequest> {
        self.completed.pop_front()
    }
}
