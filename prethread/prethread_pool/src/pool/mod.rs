//! The pre-threaded pool and the handles its threads use.
//!
//! This module provides:
//!
//! - `PreThreads`, the owner of the thread slots and both banks
//! - `PoolHandle`, the cloneable index-only view handed to every thread

pub mod handle;
pub mod thread;

// Re-export key types from handle
pub use handle::PoolHandle;

// Re-export key types from thread
pub use thread::{PreThreads, ThreadState, Unreleased};
