//! LoadBarrier: count-down latch for a fixed set of independent loads.
//!
//! Each load calls `arrive()` once when it settles, success or failure.
//! The completion callback runs exactly once, on the N-th arrival,
//! regardless of completion order. Arrivals past N are ignored.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

type OnComplete = Box<dyn FnOnce() + Send>;

pub struct LoadBarrier {
    total: usize,
    arrived: AtomicUsize,
    on_complete: Mutex<Option<OnComplete>>,
}

impl LoadBarrier {
    pub fn new<F>(total: usize, on_complete: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let barrier = Self {
            total,
            arrived: AtomicUsize::new(0),
            on_complete: Mutex::new(Some(Box::new(on_complete))),
        };
        if total == 0 {
            barrier.fire();
        }
        barrier
    }

    /// Record one settled load. Returns true for the arrival that completed
    /// the barrier.
    pub fn arrive(&self) -> bool {
        let prev = self
            .arrived
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.total).then_some(n + 1)
            });
        match prev {
            Ok(n) if n + 1 == self.total => {
                self.fire();
                true
            }
            _ => false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.total - self.arrived.load(Ordering::SeqCst)
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    fn fire(&self) {
        let f = self
            .on_complete
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(f) = f {
            f();
        }
    }
}

impl std::fmt::Debug for LoadBarrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadBarrier")
            .field("total", &self.total)
            .field("remaining", &self.remaining())
            .finish()
    }
}
