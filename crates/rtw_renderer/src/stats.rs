//! Ray query instrumentation.
//!
//! Counters live in a thread-local, so intersection code can bump them
//! without synchronization. Parallel render tasks drain their thread's
//! counters with [`take_local`] when they finish and the caller sums the
//! per-task totals.

use std::cell::Cell;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Counts of the work done while answering ray queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RayStats {
    /// Ray/box slab tests (BVH root and children)
    pub box_tests: u64,
    /// Slab tests that reported an entry distance
    pub box_hits: u64,
    /// BVH leaves whose primitive was tested
    pub leaf_visits: u64,
    /// Ray/primitive intersection tests (spheres and triangles)
    pub primitive_tests: u64,
    /// Primitive tests that produced a hit
    pub primitive_hits: u64,
}

impl Add for RayStats {
    type Output = RayStats;

    fn add(self, rhs: RayStats) -> RayStats {
        RayStats {
            box_tests: self.box_tests + rhs.box_tests,
            box_hits: self.box_hits + rhs.box_hits,
            leaf_visits: self.leaf_visits + rhs.leaf_visits,
            primitive_tests: self.primitive_tests + rhs.primitive_tests,
            primitive_hits: self.primitive_hits + rhs.primitive_hits,
        }
    }
}

impl AddAssign for RayStats {
    fn add_assign(&mut self, rhs: RayStats) {
        *self = *self + rhs;
    }
}

impl Sum for RayStats {
    fn sum<I: Iterator<Item = RayStats>>(iter: I) -> RayStats {
        iter.fold(RayStats::default(), |acc, s| acc + s)
    }
}

thread_local! {
    static LOCAL: Cell<RayStats> = Cell::new(RayStats::default());
}

#[inline]
fn record(f: impl FnOnce(&mut RayStats)) {
    LOCAL.with(|cell| {
        let mut stats = cell.get();
        f(&mut stats);
        cell.set(stats);
    });
}

#[inline]
pub(crate) fn box_test(hit: bool) {
    record(|s| {
        s.box_tests += 1;
        s.box_hits += hit as u64;
    });
}

#[inline]
pub(crate) fn leaf_visit() {
    record(|s| s.leaf_visits += 1);
}

#[inline]
pub(crate) fn primitive_test(hit: bool) {
    record(|s| {
        s.primitive_tests += 1;
        s.primitive_hits += hit as u64;
    });
}

/// Return this thread's counters and reset them to zero.
pub fn take_local() -> RayStats {
    LOCAL.with(|cell| cell.replace(RayStats::default()))
}

/// Run `f` and return the counters it produced on this thread.
///
/// Counters accumulated before the call are preserved.
pub fn measure<R>(f: impl FnOnce() -> R) -> (R, RayStats) {
    let before = take_local();
    let result = f();
    let delta = take_local();
    LOCAL.with(|cell| cell.set(before + delta));
    (result, delta)
}
