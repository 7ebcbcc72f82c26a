//! Synchronization banks shared by the threads of a pool.
//!
//! This module provides the index-addressed primitives behind a pool:
//!
//! - A mutex bank of logical locks with owner tracking
//! - A condition variable bank whose waits park on a chosen mutex slot

pub(crate) mod bank;
pub(crate) mod condvar;
pub(crate) mod mutex;

pub(crate) use bank::{allocate_slots, Banks};
