#![deny(warnings)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

//! # Prethread Pool
//!
//! Pre-allocated OS threads bundled with index-addressed synchronization
//! banks.
//!
//! A pool is created once with a fixed number of threads, mutexes and
//! condition variables. All threads are then started on the same entry
//! routine with a shared argument, and coordinate through the banks by
//! integer index:
//!
//! - `lock` / `unlock` on mutex slots
//! - `wait` / `signal` / `broadcast` on condition variable slots
//!
//! The pool is torn down either immediately with `destroy`, or with
//! `join_then_destroy`, which only releases resources after every thread
//! joined cleanly.
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use prethread_pool::PreThreads;
//!
//! let mut pool = PreThreads::new(4, 1, 0).unwrap();
//! let counter = Arc::new(AtomicUsize::new(0));
//!
//! let started = pool.start_all(
//!     |pool, counter: &AtomicUsize| {
//!         pool.lock(0).unwrap();
//!         counter.fetch_add(1, Ordering::Relaxed);
//!         pool.unlock(0).unwrap();
//!     },
//!     Arc::clone(&counter),
//! );
//!
//! assert_eq!(started, 4);
//! pool.join_then_destroy().unwrap();
//! assert_eq!(counter.load(Ordering::Relaxed), 4);
//! ```

/// Construction parameters
pub mod config;

/// Error taxonomy for pool operations
pub mod error;

/// The pool itself and the handles its threads use
pub mod pool;

mod sync;

// Re-export key types for easier access
pub use config::PoolConfig;
pub use error::{PoolError, PrimitiveError, Resource, Result};
pub use pool::{PoolHandle, PreThreads, ThreadState, Unreleased};
