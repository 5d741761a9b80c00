//! Mock downstream memory ports.

use std::collections::VecDeque;

use vmwalk_core::common::{PhysAddr, VmemError};
use vmwalk_core::mem::{MemoryPort, MemoryRequest};
use vmwalk_core::sim::Operable;

/// Port that accepts every request, records each issued address, and
/// completes requests in order after a fixed latency.
#[derive(Debug)]
pub struct RecordingPort {
    latency: u64,
    cycle: u64,
    in_flight: VecDeque<(u64, MemoryRequest)>,
    completed: VecDeque<MemoryRequest>,
    /// Every address accepted by `issue`, in issue order.
    pub addresses: Vec<PhysAddr>,
}

impl RecordingPort {
    /// Creates a port with the given completion latency in cycles.
    pub fn new(latency: u64) -> Self {
        Self {
            latency,
            cycle: 0,
            in_flight: VecDeque::new(),
            completed: VecDeque::new(),
            addresses: Vec::new(),
        }
    }

    /// Forgets previously recorded addresses.
    pub fn clear_addresses(&mut self) {
        self.addresses.clear();
    }
}

impl Operable for RecordingPort {
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

impl MemoryPort for RecordingPort {
    fn issue(&mut self, request: MemoryRequest) -> bool {
        self.addresses.push(request.addr);
        self.in_flight.push_back((self.cycle + self.latency, request));
        true
    }

    fn pop_completed(&mut self) -> Option<MemoryRequest> {
        self.completed.pop_front()
    }
}

/// Port that rejects a configured number of issue attempts before
/// behaving like a [`RecordingPort`].
#[derive(Debug)]
pub struct FlakyPort {
    rejections_remaining: u64,
    /// Total rejected issue attempts.
    pub rejections: u64,
    /// Inner recording port handling accepted requests.
    pub inner: RecordingPort,
}

impl FlakyPort {
    /// Creates a port that rejects the first `rejections` issue attempts.
    pub fn new(latency: u64, rejections: u64) -> Self {
        Self {
            rejections_remaining: rejections,
            rejections: 0,
            inner: RecordingPort::new(latency),
        }
    }
}

impl Operable for FlakyPort {
    fn operate(&mut self) -> Result<(), VmemError> {
        self.inner.operate()
    }
}

impl MemoryPort for FlakyPort {
    fn issue(&mut self, request: MemoryRequest) -> bool {
        if self.rejections_remaining > 0 {
            self.rejections_remaining -= 1;
            self.rejections += 1;
            return false;
        }
        self.inner.issue(request)
    }

    fn pop_completed(&mut self) -> Option<MemoryRequest> {
        self.inner.pop_completed()
    }
}
