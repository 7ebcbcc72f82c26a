//! The mutex and condition variable banks of a pool.

use log::debug;

use super::condvar::CondSlot;
use super::mutex::MutexSlot;
use crate::error::{PoolError, Resource, Result};

/// Reserve exactly `len` slots and initialize each one.
///
/// Fails without aborting when the reservation cannot be satisfied; whatever
/// was built before the failure is dropped on return.
pub(crate) fn allocate_slots<T>(
    len: usize,
    resource: Resource,
    mut init: impl FnMut() -> T,
) -> Result<Vec<T>> {
    let mut slots = Vec::new();
    slots.try_reserve_exact(len).map_err(|e| PoolError::AllocationFailure {
        resource,
        reason: e.to_string(),
    })?;
    slots.extend((0..len).map(|_| init()));
    Ok(slots)
}

/// Fixed-length banks of mutexes and condition variables
#[derive(Debug)]
pub(crate) struct Banks {
    mutexes: Box<[MutexSlot]>,
    conds: Box<[CondSlot]>,
}

impl Banks {
    /// Allocate and initialize both banks, or neither
    pub(crate) fn allocate(mutex_count: usize, cond_count: usize) -> Result<Self> {
        let mutexes = allocate_slots(mutex_count, Resource::Mutex, MutexSlot::new)?;
        let conds = allocate_slots(cond_count, Resource::Condvar, CondSlot::new)?;

        debug!(
            "Allocated banks of {} mutexes and {} condition variables",
            mutex_count, cond_count
        );

        Ok(Self {
            mutexes: mutexes.into_boxed_slice(),
            conds: conds.into_boxed_slice(),
        })
    }

    pub(crate) fn mutex_count(&self) -> usize {
        self.mutexes.len()
    }

    pub(crate) fn cond_count(&self) -> usize {
        self.conds.len()
    }

    pub(crate) fn lock(&self, index: usize) -> Result<()> {
        Ok(self.mutex(index)?.lock(index)?)
    }

    pub(crate) fn unlock(&self, index: usize) -> Result<()> {
        Ok(self.mutex(index)?.unlock(index)?)
    }

    pub(crate) fn wait(&self, cond_index: usize, mutex_index: usize) -> Result<()> {
        let cond = self.cond(cond_index)?;
        let mutex = self.mutex(mutex_index)?;
        Ok(cond.wait(cond_index, mutex, mutex_index)?)
    }

    pub(crate) fn signal(&self, index: usize) -> Result<()> {
        self.cond(index)?.signal(index);
        Ok(())
    }

    pub(crate) fn broadcast(&self, index: usize) -> Result<()> {
        self.cond(index)?.broadcast(index);
        Ok(())
    }

    pub(crate) fn waiter_count(&self, index: usize) -> Result<usize> {
        Ok(self.cond(index)?.waiter_count())
    }

    fn mutex(&self, index: usize) -> Result<&MutexSlot> {
        self.mutexes.get(index).ok_or(PoolError::IndexOutOfRange {
            resource: Resource::Mutex,
            index,
            len: self.mutexes.len(),
        })
    }

    fn cond(&self, index: usize) -> Result<&CondSlot> {
        self.conds.get(index).ok_or(PoolError::IndexOutOfRange {
            resource: Resource::Condvar,
            index,
            len: self.conds.len(),
        })
    }
}
