//! The pre-threaded pool.
//!
//! Allocates a fixed set of thread slots together with the mutex and
//! condition variable banks, starts every thread on one entry routine, and
//! tears everything down through one of two terminal operations.

use log::{debug, info, trace, warn};
use std::any::Any;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;

use super::handle::PoolHandle;
use crate::config::PoolConfig;
use crate::error::{PoolError, PrimitiveError, Resource, Result};
use crate::sync::{allocate_slots, Banks};

/// Lifecycle state of a thread slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    /// Not launched yet
    Unstarted,

    /// Launched and not yet joined; the entry routine may have returned
    Running,

    /// Joined
    Joined,
}

#[derive(Debug)]
enum ThreadSlot {
    Unstarted,
    Running(JoinHandle<()>),
    Joined,
}

impl ThreadSlot {
    fn state(&self) -> ThreadState {
        match self {
            Self::Unstarted => ThreadState::Unstarted,
            Self::Running(_) => ThreadState::Running,
            Self::Joined => ThreadState::Joined,
        }
    }
}

/// Body handed to a launcher for one thread slot
type ThreadBody = Box<dyn FnOnce() + Send + 'static>;

/// A pool that [`PreThreads::join_then_destroy`] refused to release.
///
/// Holds the pool so the caller decides what happens to it next.
#[derive(Error, Debug)]
#[error("pool left unreleased: {error}")]
pub struct Unreleased {
    /// The pool, with every thread slot already visited by the failed join
    pub pool: Box<PreThreads>,

    /// Why the join failed
    #[source]
    pub error: PoolError,
}

/// A fixed set of OS threads with indexed mutex and condition variable banks
#[derive(Debug)]
pub struct PreThreads {
    /// Thread slots, fixed at construction
    threads: Vec<ThreadSlot>,

    /// Mutex and condition variable banks shared with every handle
    banks: Arc<Banks>,

    /// Configuration
    config: PoolConfig,
}

impl PreThreads {
    /// Create a pool of `threads` threads, `mutexes` mutexes and `conds`
    /// condition variables with the default thread settings
    pub fn new(threads: usize, mutexes: usize, conds: usize) -> Result<Self> {
        Self::with_config(PoolConfig::new(threads, mutexes, conds))
    }

    /// Create a pool from a configuration.
    ///
    /// Either every slot is allocated and initialized or nothing is.
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        if config.threads == 0 {
            return Err(PoolError::InvalidArgument);
        }

        let threads = allocate_slots(config.threads, Resource::Thread, || ThreadSlot::Unstarted)?;
        let banks = Arc::new(Banks::allocate(config.mutexes, config.conds)?);

        info!(
            "Creating pool with {} threads, {} mutexes and {} condition variables",
            config.threads, config.mutexes, config.conds
        );

        Ok(Self {
            threads,
            banks,
            config,
        })
    }

    /// Start every thread on `entry`, sharing `arg` between them.
    ///
    /// Threads are launched in index order. Launching stops at the first
    /// failure; the return value is the number of threads started, so slots
    /// `0..n` are running and the rest stay unstarted. Starting is one-shot:
    /// once any slot has been launched this returns 0 and launches nothing.
    pub fn start_all<A, F>(&mut self, entry: F, arg: Arc<A>) -> usize
    where
        A: Send + Sync + 'static,
        F: Fn(&PoolHandle, &A) + Send + Sync + 'static,
    {
        self.start_all_with(entry, arg, |_, builder, body| builder.spawn(body))
    }

    fn start_all_with<A, F, L>(&mut self, entry: F, arg: Arc<A>, mut launch: L) -> usize
    where
        A: Send + Sync + 'static,
        F: Fn(&PoolHandle, &A) + Send + Sync + 'static,
        L: FnMut(usize, thread::Builder, ThreadBody) -> io::Result<JoinHandle<()>>,
    {
        if self
            .threads
            .iter()
            .any(|slot| !matches!(slot, ThreadSlot::Unstarted))
        {
            warn!("Pool threads have already been started");
            return 0;
        }

        let entry = Arc::new(entry);
        let mut started = 0;

        for index in 0..self.threads.len() {
            let entry = Arc::clone(&entry);
            let arg = Arc::clone(&arg);
            let handle = self.handle();

            let body: ThreadBody = Box::new(move || {
                trace!("Thread {}: Entering", index);
                (*entry)(&handle, &*arg);
                trace!("Thread {}: Returned", index);
            });

            match launch(index, self.builder(index), body) {
                Ok(join_handle) => {
                    self.threads[index] = ThreadSlot::Running(join_handle);
                    started += 1;
                }
                Err(e) => {
                    warn!("Failed to start thread {}: {}", index, e);
                    break;
                }
            }
        }

        debug!("Started {} of {} threads", started, self.threads.len());
        started
    }

    fn builder(&self, index: usize) -> thread::Builder {
        let builder =
            thread::Builder::new().name(format!("{}-{}", self.config.thread_name_prefix, index));

        match self.config.stack_size {
            Some(bytes) => builder.stack_size(bytes),
            None => builder,
        }
    }

    /// Get a handle for indexed access to this pool's banks
    pub fn handle(&self) -> PoolHandle {
        PoolHandle::new(&self.banks, self.threads.len())
    }

    /// Get the number of threads
    pub fn size(&self) -> usize {
        self.threads.len()
    }

    /// Get the number of mutexes
    pub fn mutex_count(&self) -> usize {
        self.banks.mutex_count()
    }

    /// Get the number of condition variables
    pub fn cond_count(&self) -> usize {
        self.banks.cond_count()
    }

    /// Get the lifecycle state of thread slot `index`
    pub fn thread_state(&self, index: usize) -> Option<ThreadState> {
        self.threads.get(index).map(ThreadSlot::state)
    }

    /// Get the configuration the pool was built from
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Lock mutex `index`, blocking until it is free
    pub fn lock(&self, index: usize) -> Result<()> {
        self.banks.lock(index)
    }

    /// Unlock mutex `index`, which the calling thread must hold
    pub fn unlock(&self, index: usize) -> Result<()> {
        self.banks.unlock(index)
    }

    /// Wait on condition variable `cond` using mutex `mutex`, which the
    /// calling thread must hold
    pub fn wait(&self, cond: usize, mutex: usize) -> Result<()> {
        self.banks.wait(cond, mutex)
    }

    /// Wake one waiter on condition variable `index`
    pub fn signal(&self, index: usize) -> Result<()> {
        self.banks.signal(index)
    }

    /// Wake all waiters on condition variable `index`
    pub fn broadcast(&self, index: usize) -> Result<()> {
        self.banks.broadcast(index)
    }

    /// Number of threads currently waiting on condition variable `index`
    pub fn waiter_count(&self, index: usize) -> Result<usize> {
        self.banks.waiter_count(index)
    }

    /// Join every thread in index order.
    ///
    /// A failed join does not stop the others from being joined. Succeeds
    /// only if every slot joined cleanly; otherwise the error lists each
    /// failing slot.
    pub fn join(&mut self) -> Result<()> {
        let mut failures = Vec::new();

        for (index, slot) in self.threads.iter_mut().enumerate() {
            if let Err(e) = Self::join_slot(index, slot) {
                warn!("Failed to join thread {}: {}", index, e);
                failures.push(e);
            }
        }

        if failures.is_empty() {
            debug!("Joined all {} threads", self.threads.len());
            Ok(())
        } else {
            Err(PoolError::Join(failures))
        }
    }

    fn join_slot(index: usize, slot: &mut ThreadSlot) -> std::result::Result<(), PrimitiveError> {
        match std::mem::replace(slot, ThreadSlot::Joined) {
            ThreadSlot::Running(handle) => handle.join().map_err(|payload| {
                PrimitiveError::Panicked {
                    index,
                    message: panic_message(payload.as_ref()),
                }
            }),
            ThreadSlot::Unstarted => {
                *slot = ThreadSlot::Unstarted;
                Err(PrimitiveError::NotStarted { index })
            }
            ThreadSlot::Joined => Err(PrimitiveError::AlreadyJoined { index }),
        }
    }

    /// Release the pool without joining its threads.
    ///
    /// Threads still running are detached. Their handles report
    /// [`PoolError::Absent`] from then on, so the caller should make sure no
    /// thread still depends on the pool.
    pub fn destroy(self) {
        info!("Destroying pool of {} threads", self.threads.len());
        drop(self);
    }

    /// Join every thread, then release the pool.
    ///
    /// If any join fails nothing is released: the pool comes back inside the
    /// error together with the reason.
    pub fn join_then_destroy(mut self) -> std::result::Result<(), Unreleased> {
        match self.join() {
            Ok(()) => {
                self.destroy();
                Ok(())
            }
            Err(error) => {
                warn!("Join failed, leaving pool unreleased: {}", error);
                Err(Unreleased {
                    pool: Box::new(self),
                    error,
                })
            }
        }
    }
}

impl Drop for PreThreads {
    fn drop(&mut self) {
        let running = self
            .threads
            .iter()
            .filter(|slot| matches!(slot, ThreadSlot::Running(_)))
            .count();

        if running > 0 {
            debug!(
                "Pool dropped with {} unjoined threads - detaching them",
                running
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "<unknown panic>".to_string()
    }
}
