//! Index-addressed condition variable slots.
//!
//! A wait parks on the raw state lock of the mutex slot it names, so
//! releasing the logical mutex and blocking happen atomically with respect to
//! anyone who locks that slot next. A slot tracks its waiters and the mutex
//! they use: a wait naming a different mutex while waiters are present is
//! rejected.

use log::trace;
use parking_lot::{Condvar, Mutex};
use std::thread;

use super::mutex::MutexSlot;
use crate::error::PrimitiveError;

/// Waiters currently registered on a condition variable slot
#[derive(Debug, Default)]
struct Waiters {
    /// Number of threads inside `wait`
    count: usize,

    /// Mutex slot those threads use
    mutex: Option<usize>,
}

/// A single slot in the condition variable bank
#[derive(Debug, Default)]
pub(crate) struct CondSlot {
    cvar: Condvar,
    waiters: Mutex<Waiters>,
}

impl CondSlot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Release `mutex`, block until woken, and take `mutex` back.
    ///
    /// The calling thread must hold `mutex`. On error the mutex is untouched.
    pub(crate) fn wait(
        &self,
        index: usize,
        mutex: &MutexSlot,
        mutex_index: usize,
    ) -> Result<(), PrimitiveError> {
        let me = thread::current().id();
        let mut state = mutex.state();

        if !state.is_held_by(me) {
            return Err(PrimitiveError::NotOwner { index: mutex_index });
        }

        self.register(index, mutex_index)?;

        mutex.release_locked(&mut state);
        trace!("Condvar {} waiting with mutex {}", index, mutex_index);

        self.cvar.wait(&mut state);
        mutex.reacquire(&mut state, me);

        self.deregister();
        trace!("Condvar {} woke, mutex {} reacquired", index, mutex_index);
        Ok(())
    }

    /// Wake at most one waiter
    pub(crate) fn signal(&self, index: usize) {
        let woke = self.cvar.notify_one();
        trace!("Condvar {} signaled (woke waiter: {})", index, woke);
    }

    /// Wake every current waiter
    pub(crate) fn broadcast(&self, index: usize) {
        let woke = self.cvar.notify_all();
        trace!("Condvar {} broadcast (woke {} waiters)", index, woke);
    }

    /// Number of threads currently inside `wait` on this slot
    pub(crate) fn waiter_count(&self) -> usize {
        self.waiters.lock().count
    }

    fn register(&self, index: usize, mutex_index: usize) -> Result<(), PrimitiveError> {
        let mut waiters = self.waiters.lock();

        match waiters.mutex {
            Some(bound) if waiters.count > 0 && bound != mutex_index => {
                Err(PrimitiveError::MismatchedMutex {
                    cond: index,
                    bound,
                    requested: mutex_index,
                })
            }
            _ => {
                waiters.count += 1;
                waiters.mutex = Some(mutex_index);
                Ok(())
            }
        }
    }

    fn deregister(&self) {
        let mut waiters = self.waiters.lock();
        waiters.count -= 1;
        if waiters.count == 0 {
            waiters.mutex = None;
        }
    }
}
