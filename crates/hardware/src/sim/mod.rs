//! Discrete-time scheduling primitives.
//!
//! The simulation is single-threaded and cooperative: an external
//! per-cycle driver invokes each structure once per simulated cycle, in a
//! fixed dependency order, so a request advances at most one hop (one
//! page-table level, or one cycle of downstream latency) per invocation.
//! "Suspension" is a request remaining queued until its dependency
//! becomes available on a later cycle; once issued, a request always
//! completes — cancellation is not modeled.

use crate::common::VmemError;

/// A structure driven once per simulated cycle.
///
/// Within a cycle, each operable processes its queues in submission
/// order, keeping simulation results reproducible.
pub trait Operable {
    /// Advances this structure by one cycle.
    ///
    /// # Errors
    ///
    /// Propagates unrecoverable model errors, e.g. physical-page pool
    /// exhaustion during a walk.
    fn operate(&mut self) -> Result<(), VmemError>;
}

/// Ticks every element once per cycle, in slice order, for `cycles`
/// cycles.
///
/// The caller fixes the dependency order by the order of the slice.
///
/// # Errors
///
/// Stops at the first cycle in which any element reports an error.
pub fn run(elements: &mut [&mut dyn Operable], cycles: u64) -> Result<(), VmemError> {
    for _ in 0..cycles {
        for element in elements.iter_mut() {
            element.operate()?;
        }
    }
    Ok(())
}
