//! Integration tests for the pre-threaded pool.
//!
//! These tests drive whole pools through the scenarios callers rely on:
//! shared counters under a pooled mutex, wait/signal handoffs, broadcasts,
//! misuse rejection and the two teardown paths.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use prethread_pool::{PoolError, PoolHandle, PreThreads, PrimitiveError, Resource};

/// Spin until `cond` has `count` waiters
fn await_waiters(handle: &PoolHandle, cond: usize, count: usize) {
    while handle.waiter_count(cond).unwrap() < count {
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn test_counter_under_pooled_mutex() {
    let mut pool = PreThreads::new(4, 1, 1).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));

    let started = pool.start_all(
        |pool, counter: &AtomicUsize| {
            pool.lock(0).unwrap();
            let seen = counter.load(Ordering::Relaxed);
            thread::yield_now();
            counter.store(seen + 1, Ordering::Relaxed);
            pool.unlock(0).unwrap();
        },
        Arc::clone(&counter),
    );

    assert_eq!(started, 4);
    pool.join_then_destroy().unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 4);
}

#[test]
fn test_no_mutex_bank() {
    let pool = PreThreads::new(2, 0, 0).unwrap();

    assert_eq!(
        pool.lock(0),
        Err(PoolError::IndexOutOfRange {
            resource: Resource::Mutex,
            index: 0,
            len: 0,
        })
    );
    assert!(pool.unlock(0).is_err());
    assert!(pool.wait(0, 0).is_err());
    assert!(pool.signal(0).is_err());
    assert!(pool.broadcast(0).is_err());
}

#[test]
fn test_out_of_range_indexes_have_no_side_effects() {
    let pool = PreThreads::new(1, 2, 3).unwrap();

    for index in [2, 3, 100, usize::MAX] {
        assert!(matches!(
            pool.lock(index),
            Err(PoolError::IndexOutOfRange {
                resource: Resource::Mutex,
                ..
            })
        ));
        assert!(matches!(
            pool.unlock(index),
            Err(PoolError::IndexOutOfRange {
                resource: Resource::Mutex,
                ..
            })
        ));
        assert!(matches!(
            pool.wait(0, index),
            Err(PoolError::IndexOutOfRange {
                resource: Resource::Mutex,
                ..
            })
        ));
    }

    for index in [3, 4, usize::MAX] {
        assert!(matches!(
            pool.wait(index, 0),
            Err(PoolError::IndexOutOfRange {
                resource: Resource::Condvar,
                ..
            })
        ));
        assert!(matches!(
            pool.signal(index),
            Err(PoolError::IndexOutOfRange {
                resource: Resource::Condvar,
                ..
            })
        ));
        assert!(matches!(
            pool.broadcast(index),
            Err(PoolError::IndexOutOfRange {
                resource: Resource::Condvar,
                ..
            })
        ));
    }

    // Every valid slot is still free
    for index in 0..2 {
        pool.lock(index).unwrap();
        pool.unlock(index).unwrap();
    }
    for index in 0..3 {
        assert_eq!(pool.waiter_count(index), Ok(0));
    }
}

#[test]
fn test_lock_unlock_round_trip() {
    let pool = PreThreads::new(1, 3, 0).unwrap();

    for index in 0..3 {
        pool.lock(index).unwrap();
        pool.unlock(index).unwrap();
    }
}

#[test]
fn test_relock_and_foreign_unlock_are_rejected() {
    let pool = PreThreads::new(1, 1, 0).unwrap();
    let handle = pool.handle();

    pool.lock(0).unwrap();
    assert_eq!(
        pool.lock(0),
        Err(PoolError::Primitive(PrimitiveError::WouldDeadlock { index: 0 }))
    );

    let foreign = thread::spawn(move || handle.unlock(0)).join().unwrap();
    assert_eq!(
        foreign,
        Err(PoolError::Primitive(PrimitiveError::NotOwner { index: 0 }))
    );

    pool.unlock(0).unwrap();
    assert_eq!(
        pool.unlock(0),
        Err(PoolError::Primitive(PrimitiveError::NotOwner { index: 0 }))
    );
}

struct Handoff {
    tickets: AtomicUsize,
    value: AtomicUsize,
    observed: AtomicUsize,
    waits: AtomicUsize,
}

#[test]
fn test_wait_signal_handoff() {
    let mut pool = PreThreads::new(2, 1, 1).unwrap();
    let shared = Arc::new(Handoff {
        tickets: AtomicUsize::new(0),
        value: AtomicUsize::new(0),
        observed: AtomicUsize::new(0),
        waits: AtomicUsize::new(0),
    });

    let started = pool.start_all(
        |pool, shared: &Handoff| {
            if shared.tickets.fetch_add(1, Ordering::SeqCst) == 0 {
                pool.lock(0).unwrap();
                while shared.value.load(Ordering::SeqCst) == 0 {
                    pool.wait(0, 0).unwrap();
                    shared.waits.fetch_add(1, Ordering::SeqCst);
                }
                shared
                    .observed
                    .store(shared.value.load(Ordering::SeqCst), Ordering::SeqCst);
                pool.unlock(0).unwrap();
            } else {
                // Publish only once the first thread is parked in wait
                await_waiters(pool, 0, 1);
                pool.lock(0).unwrap();
                assert_eq!(shared.value.load(Ordering::SeqCst), 0);
                shared.value.store(42, Ordering::SeqCst);
                pool.signal(0).unwrap();
                pool.unlock(0).unwrap();
            }
        },
        Arc::clone(&shared),
    );

    assert_eq!(started, 2);
    pool.join_then_destroy().unwrap();
    assert_eq!(shared.observed.load(Ordering::SeqCst), 42);
    assert!(shared.waits.load(Ordering::SeqCst) >= 1);
}

struct Gate {
    open: AtomicBool,
    passed: AtomicUsize,
}

#[test]
fn test_broadcast_wakes_all_waiters() {
    let mut pool = PreThreads::new(3, 1, 1).unwrap();
    let gate = Arc::new(Gate {
        open: AtomicBool::new(false),
        passed: AtomicUsize::new(0),
    });

    pool.start_all(
        |pool, gate: &Gate| {
            pool.lock(0).unwrap();
            while !gate.open.load(Ordering::SeqCst) {
                pool.wait(0, 0).unwrap();
            }
            gate.passed.fetch_add(1, Ordering::SeqCst);
            pool.unlock(0).unwrap();
        },
        Arc::clone(&gate),
    );

    await_waiters(&pool.handle(), 0, 3);

    pool.lock(0).unwrap();
    gate.open.store(true, Ordering::SeqCst);
    pool.broadcast(0).unwrap();
    pool.unlock(0).unwrap();

    pool.join().unwrap();
    assert_eq!(gate.passed.load(Ordering::SeqCst), 3);
    pool.destroy();
}

#[test]
fn test_signal_wakes_one_waiter_at_a_time() {
    let mut pool = PreThreads::new(2, 1, 1).unwrap();
    let gate = Arc::new(Gate {
        open: AtomicBool::new(false),
        passed: AtomicUsize::new(0),
    });

    pool.start_all(
        |pool, gate: &Gate| {
            pool.lock(0).unwrap();
            while !gate.open.load(Ordering::SeqCst) {
                pool.wait(0, 0).unwrap();
            }
            gate.passed.fetch_add(1, Ordering::SeqCst);
            pool.unlock(0).unwrap();
        },
        Arc::clone(&gate),
    );

    let handle = pool.handle();
    await_waiters(&handle, 0, 2);

    pool.lock(0).unwrap();
    gate.open.store(true, Ordering::SeqCst);
    pool.signal(0).unwrap();
    pool.unlock(0).unwrap();

    // Exactly one waiter got through; the other is still parked
    while gate.passed.load(Ordering::SeqCst) < 1 {
        thread::sleep(Duration::from_millis(1));
    }
    await_waiters(&handle, 0, 1);
    assert_eq!(handle.waiter_count(0), Ok(1));

    pool.lock(0).unwrap();
    pool.signal(0).unwrap();
    pool.unlock(0).unwrap();

    pool.join_then_destroy().unwrap();
    assert_eq!(gate.passed.load(Ordering::SeqCst), 2);
}

#[test]
fn test_wait_with_mismatched_mutex_is_rejected() {
    let mut pool = PreThreads::new(1, 2, 1).unwrap();
    let gate = Arc::new(Gate {
        open: AtomicBool::new(false),
        passed: AtomicUsize::new(0),
    });

    pool.start_all(
        |pool, gate: &Gate| {
            pool.lock(0).unwrap();
            while !gate.open.load(Ordering::SeqCst) {
                pool.wait(0, 0).unwrap();
            }
            gate.passed.fetch_add(1, Ordering::SeqCst);
            pool.unlock(0).unwrap();
        },
        Arc::clone(&gate),
    );

    await_waiters(&pool.handle(), 0, 1);

    pool.lock(1).unwrap();
    assert_eq!(
        pool.wait(0, 1),
        Err(PoolError::Primitive(PrimitiveError::MismatchedMutex {
            cond: 0,
            bound: 0,
            requested: 1,
        }))
    );
    // The rejected wait kept mutex 1 held
    pool.unlock(1).unwrap();

    pool.lock(0).unwrap();
    gate.open.store(true, Ordering::SeqCst);
    pool.signal(0).unwrap();
    pool.unlock(0).unwrap();

    pool.join_then_destroy().unwrap();
    assert_eq!(gate.passed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_join_then_destroy_blocks_on_a_running_thread() {
    let mut pool = PreThreads::new(2, 0, 0).unwrap();
    let release = Arc::new(AtomicBool::new(false));

    pool.start_all(
        |_, release: &AtomicBool| {
            while !release.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(1));
            }
        },
        Arc::clone(&release),
    );

    let returned = Arc::new(AtomicBool::new(false));
    let teardown = {
        let returned = Arc::clone(&returned);
        thread::spawn(move || {
            let result = pool.join_then_destroy();
            returned.store(true, Ordering::SeqCst);
            result.is_ok()
        })
    };

    // No timeout exists: the teardown stays blocked while the threads run
    thread::sleep(Duration::from_millis(100));
    assert!(!returned.load(Ordering::SeqCst));

    release.store(true, Ordering::SeqCst);
    assert!(teardown.join().unwrap());
    assert!(returned.load(Ordering::SeqCst));
}

#[test]
fn test_destroy_without_join() {
    let mut pool = PreThreads::new(2, 1, 0).unwrap();
    let release = Arc::new(AtomicBool::new(false));
    let outcomes = Arc::new(AtomicUsize::new(0));

    struct Worker {
        release: Arc<AtomicBool>,
        outcomes: Arc<AtomicUsize>,
    }

    pool.start_all(
        |pool, worker: &Worker| {
            while !worker.release.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(1));
            }
            if pool.lock(0) == Err(PoolError::Absent) {
                worker.outcomes.fetch_add(1, Ordering::SeqCst);
            }
        },
        Arc::new(Worker {
            release: Arc::clone(&release),
            outcomes: Arc::clone(&outcomes),
        }),
    );

    pool.destroy();
    release.store(true, Ordering::SeqCst);

    while outcomes.load(Ordering::SeqCst) < 2 {
        thread::sleep(Duration::from_millis(1));
    }
}
