//! Index-only access to a pool's banks from worker threads.

use std::sync::{Arc, Weak};

use crate::error::{PoolError, Result};
use crate::sync::Banks;

/// A cloneable handle onto the banks of a [`PreThreads`](super::PreThreads) pool.
///
/// Every pooled thread receives one. The handle does not keep the pool
/// alive: once the pool is destroyed, indexed operations fail with
/// [`PoolError::Absent`] and the size accessors return 0.
#[derive(Debug, Clone)]
pub struct PoolHandle {
    banks: Weak<Banks>,
    threads: usize,
}

impl PoolHandle {
    pub(crate) fn new(banks: &Arc<Banks>, threads: usize) -> Self {
        Self {
            banks: Arc::downgrade(banks),
            threads,
        }
    }

    fn banks(&self) -> Result<Arc<Banks>> {
        self.banks.upgrade().ok_or(PoolError::Absent)
    }

    /// Check whether the pool behind this handle still exists
    pub fn is_absent(&self) -> bool {
        self.banks.strong_count() == 0
    }

    /// Number of threads in the pool, or 0 once it is destroyed
    pub fn size(&self) -> usize {
        if self.is_absent() {
            0
        } else {
            self.threads
        }
    }

    /// Number of mutexes in the pool, or 0 once it is destroyed
    pub fn mutex_count(&self) -> usize {
        self.banks.upgrade().map_or(0, |banks| banks.mutex_count())
    }

    /// Number of condition variables in the pool, or 0 once it is destroyed
    pub fn cond_count(&self) -> usize {
        self.banks.upgrade().map_or(0, |banks| banks.cond_count())
    }

    /// Lock mutex `index`, blocking until it is free
    pub fn lock(&self, index: usize) -> Result<()> {
        self.banks()?.lock(index)
    }

    /// Unlock mutex `index`, which the calling thread must hold
    pub fn unlock(&self, index: usize) -> Result<()> {
        self.banks()?.unlock(index)
    }

    /// Wait on condition variable `cond` using mutex `mutex`.
    ///
    /// The calling thread must hold `mutex`; it is released while blocked and
    /// held again when this returns. Wakeups may be spurious, so re-check the
    /// awaited condition in a loop.
    pub fn wait(&self, cond: usize, mutex: usize) -> Result<()> {
        self.banks()?.wait(cond, mutex)
    }

    /// Wake one waiter on condition variable `index`
    pub fn signal(&self, index: usize) -> Result<()> {
        self.banks()?.signal(index)
    }

    /// Wake all waiters on condition variable `index`
    pub fn broadcast(&self, index: usize) -> Result<()> {
        self.banks()?.broadcast(index)
    }

    /// Number of threads currently waiting on condition variable `index`
    pub fn waiter_count(&self, index: usize) -> Result<usize> {
        self.banks()?.waiter_count(index)
    }
}
