//! The counter workload
//!
//! Every pooled thread increments one shared counter a fixed number of
//! times, holding mutex 0 around each increment.

use anyhow::Result;
use clap::Args;
use log::{error, info, warn};
use prethread_pool::{PoolConfig, PoolError, PoolHandle, PreThreads, PrimitiveError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::WorkloadError;

/// Arguments for the counter command
#[derive(Args)]
pub struct CounterArgs {
    /// Number of threads (overrides the configuration)
    #[clap(long)]
    pub threads: Option<usize>,

    /// Increments performed by each thread
    #[clap(long, default_value_t = 1000)]
    pub increments: usize,
}

struct Counter {
    value: AtomicUsize,
    increments: usize,
}

fn increment(pool: &PoolHandle, counter: &Counter) -> prethread_pool::Result<()> {
    for _ in 0..counter.increments {
        pool.lock(0)?;
        // Load and store separately so only the pooled mutex keeps this correct
        let seen = counter.value.load(Ordering::Relaxed);
        counter.value.store(seen + 1, Ordering::Relaxed);
        pool.unlock(0)?;
    }
    Ok(())
}

/// Join whatever was launched and report the threads that failed.
///
/// Slots that never started are expected to fail and are not counted.
fn join_started(pool: &mut PreThreads) -> usize {
    let Err(PoolError::Join(failures)) = pool.join() else {
        return 0;
    };

    let mut failed = 0;
    for failure in &failures {
        if !matches!(failure, PrimitiveError::NotStarted { .. }) {
            warn!("Counter worker did not join cleanly: {}", failure);
            failed += 1;
        }
    }
    failed
}

/// Implementation of the counter command
pub fn execute(mut config: PoolConfig, args: &CounterArgs) -> Result<()> {
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    config.mutexes = config.mutexes.max(1);

    let mut pool = PreThreads::with_config(config)?;
    let counter = Arc::new(Counter {
        value: AtomicUsize::new(0),
        increments: args.increments,
    });

    let started = pool.start_all(
        |pool, counter: &Counter| {
            if let Err(e) = increment(pool, counter) {
                error!("Counter worker failed: {}", e);
            }
        },
        Arc::clone(&counter),
    );

    let expected_threads = pool.size();
    if started < expected_threads {
        join_started(&mut pool);
        pool.destroy();
        return Err(WorkloadError::PartialStart {
            started,
            expected: expected_threads,
        }
        .into());
    }

    pool.join_then_destroy()?;

    let actual = counter.value.load(Ordering::SeqCst);
    let expected = expected_threads * args.increments;
    info!("Counter workload finished on {} threads", expected_threads);

    if actual != expected {
        return Err(WorkloadError::Mismatch {
            what: "counter",
            actual,
            expected,
        }
        .into());
    }

    println!(
        "counter = {} ({} threads x {} increments)",
        actual, expected_threads, args.increments
    );
    Ok(())
}
