//! Index-addressed mutex slots.
//!
//! A slot is a logical lock with an owning thread. Locking and unlocking are
//! separate calls rather than a scoped guard, so a slot can be acquired in one
//! pool call and released in another. The owner is tracked so that misuse
//! (relocking, unlocking from another thread) is rejected instead of
//! deadlocking or corrupting the lock.

use log::trace;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::thread::{self, ThreadId};

use crate::error::PrimitiveError;

/// Ownership state of a mutex slot
#[derive(Debug, Default)]
pub(crate) struct SlotState {
    /// Thread currently holding the slot
    owner: Option<ThreadId>,
}

impl SlotState {
    pub(crate) fn is_held_by(&self, thread: ThreadId) -> bool {
        self.owner == Some(thread)
    }

    pub(crate) fn is_held(&self) -> bool {
        self.owner.is_some()
    }

    pub(crate) fn acquire(&mut self, thread: ThreadId) {
        debug_assert!(self.owner.is_none());
        self.owner = Some(thread);
    }

    pub(crate) fn release(&mut self) {
        self.owner = None;
    }
}

/// A single slot in the mutex bank
#[derive(Debug, Default)]
pub(crate) struct MutexSlot {
    /// Guards the ownership state; condition variable waits park on it
    state: Mutex<SlotState>,

    /// Notified whenever the slot is released
    released: Condvar,
}

impl MutexSlot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Block until the slot is free, then take it for the calling thread
    pub(crate) fn lock(&self, index: usize) -> Result<(), PrimitiveError> {
        let me = thread::current().id();
        let mut state = self.state.lock();

        if state.is_held_by(me) {
            return Err(PrimitiveError::WouldDeadlock { index });
        }

        self.reacquire(&mut state, me);
        trace!("Mutex {} locked by {:?}", index, me);
        Ok(())
    }

    /// Release the slot; only the owning thread may do so
    pub(crate) fn unlock(&self, index: usize) -> Result<(), PrimitiveError> {
        let me = thread::current().id();
        let mut state = self.state.lock();

        if !state.is_held_by(me) {
            return Err(PrimitiveError::NotOwner { index });
        }

        state.release();
        drop(state);
        self.released.notify_one();

        trace!("Mutex {} unlocked by {:?}", index, me);
        Ok(())
    }

    /// Lock the raw state without touching ownership
    pub(crate) fn state(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock()
    }

    /// Release ownership while the raw state is held, waking one locker
    pub(crate) fn release_locked(&self, state: &mut MutexGuard<'_, SlotState>) {
        state.release();
        self.released.notify_one();
    }

    /// Wait until nobody owns the slot, then take it. The raw state must be held.
    pub(crate) fn reacquire(&self, state: &mut MutexGuard<'_, SlotState>, thread: ThreadId) {
        while state.is_held() {
            self.released.wait(state);
        }
        state.acquire(thread);
    }
}
