//! Error types for the pre-threaded pool.
//!
//! Every fallible pool operation reports one of these errors instead of
//! panicking or terminating the process. Callers decide what a failure means.

use std::fmt;
use thiserror::Error;

/// The kind of resource an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// The thread slot array
    Thread,

    /// The mutex bank
    Mutex,

    /// The condition variable bank
    Condvar,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Thread => "thread",
            Self::Mutex => "mutex",
            Self::Condvar => "condition variable",
        };
        f.write_str(name)
    }
}

/// Error returned by pool construction and indexed operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// A pool was requested with zero threads
    #[error("a pool needs at least one thread")]
    InvalidArgument,

    /// Reserving storage for a bank or the thread array failed
    #[error("failed to allocate {resource} slots: {reason}")]
    AllocationFailure {
        /// Which allocation failed
        resource: Resource,
        /// Allocator diagnostic
        reason: String,
    },

    /// The pool behind a handle has already been destroyed
    #[error("pool has been destroyed")]
    Absent,

    /// An index outside the bank it addresses
    #[error("{resource} index {index} out of range for a bank of {len}")]
    IndexOutOfRange {
        /// Which bank was addressed
        resource: Resource,
        /// The rejected index
        index: usize,
        /// Length of the bank
        len: usize,
    },

    /// The underlying primitive refused the operation
    #[error(transparent)]
    Primitive(#[from] PrimitiveError),

    /// One or more threads failed to join; every slot was still visited
    #[error("{} of the pool's threads failed to join", .0.len())]
    Join(Vec<PrimitiveError>),
}

/// Failure reported by a single mutex, condition variable, or thread slot
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// The calling thread already holds the mutex
    #[error("mutex {index} is already held by the calling thread")]
    WouldDeadlock {
        /// Mutex slot
        index: usize,
    },

    /// The calling thread does not hold the mutex
    #[error("mutex {index} is not held by the calling thread")]
    NotOwner {
        /// Mutex slot
        index: usize,
    },

    /// Waiters on a condition variable are already using another mutex
    #[error("condition variable {cond} is in use with mutex {bound}, not mutex {requested}")]
    MismatchedMutex {
        /// Condition variable slot
        cond: usize,
        /// Mutex the current waiters use
        bound: usize,
        /// Mutex passed by the rejected wait
        requested: usize,
    },

    /// The thread slot was never launched
    #[error("thread {index} was never started")]
    NotStarted {
        /// Thread slot
        index: usize,
    },

    /// The thread slot has already been joined
    #[error("thread {index} has already been joined")]
    AlreadyJoined {
        /// Thread slot
        index: usize,
    },

    /// The entry routine panicked
    #[error("thread {index} panicked: {message}")]
    Panicked {
        /// Thread slot
        index: usize,
        /// Panic payload, when it was a string
        message: String,
    },
}

/// Result alias for pool operations
pub type Result<T> = std::result::Result<T, PoolError>;
