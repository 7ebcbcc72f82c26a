//! The handoff workload
//!
//! Two pooled threads pass a sequence of values through a single slot.
//! Mutex 0 guards the slot; condition variable 0 announces a full slot and
//! condition variable 1 an empty one.

use anyhow::Result;
use clap::Args;
use log::{error, info};
use prethread_pool::{PoolConfig, PoolHandle, PreThreads};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::WorkloadError;

const SLOT_MUTEX: usize = 0;
const FILLED: usize = 0;
const EMPTIED: usize = 1;

/// Arguments for the handoff command
#[derive(Args)]
pub struct HandoffArgs {
    /// Number of values to pass
    #[clap(long, default_value_t = 10)]
    pub rounds: usize,
}

struct Exchange {
    tickets: AtomicUsize,
    /// 0 means empty
    slot: AtomicUsize,
    received: AtomicUsize,
    sum: AtomicUsize,
    rounds: usize,
}

fn produce(pool: &PoolHandle, exchange: &Exchange) -> prethread_pool::Result<()> {
    for value in 1..=exchange.rounds {
        pool.lock(SLOT_MUTEX)?;
        while exchange.slot.load(Ordering::SeqCst) != 0 {
            pool.wait(EMPTIED, SLOT_MUTEX)?;
        }
        exchange.slot.store(value, Ordering::SeqCst);
        pool.signal(FILLED)?;
        pool.unlock(SLOT_MUTEX)?;
    }
    Ok(())
}

fn consume(pool: &PoolHandle, exchange: &Exchange) -> prethread_pool::Result<()> {
    for _ in 0..exchange.rounds {
        pool.lock(SLOT_MUTEX)?;
        let value = loop {
            let value = exchange.slot.load(Ordering::SeqCst);
            if value != 0 {
                break value;
            }
            pool.wait(FILLED, SLOT_MUTEX)?;
        };
        exchange.slot.store(0, Ordering::SeqCst);
        exchange.sum.fetch_add(value, Ordering::SeqCst);
        exchange.received.fetch_add(1, Ordering::SeqCst);
        pool.signal(EMPTIED)?;
        pool.unlock(SLOT_MUTEX)?;
    }
    Ok(())
}

/// Implementation of the handoff command
pub fn execute(config: PoolConfig, args: &HandoffArgs) -> Result<()> {
    let config = PoolConfig {
        threads: 2,
        mutexes: config.mutexes.max(1),
        conds: config.conds.max(2),
        ..config
    };

    let mut pool = PreThreads::with_config(config)?;
    let exchange = Arc::new(Exchange {
        tickets: AtomicUsize::new(0),
        slot: AtomicUsize::new(0),
        received: AtomicUsize::new(0),
        sum: AtomicUsize::new(0),
        rounds: args.rounds,
    });

    let started = pool.start_all(
        |pool, exchange: &Exchange| {
            let result = if exchange.tickets.fetch_add(1, Ordering::SeqCst) == 0 {
                produce(pool, exchange)
            } else {
                consume(pool, exchange)
            };
            if let Err(e) = result {
                error!("Handoff worker failed: {}", e);
            }
        },
        Arc::clone(&exchange),
    );

    if started < 2 {
        // A lone worker would wait forever for its partner
        pool.destroy();
        return Err(WorkloadError::PartialStart {
            started,
            expected: 2,
        }
        .into());
    }

    pool.join_then_destroy()?;
    info!("Handoff workload finished");

    let received = exchange.received.load(Ordering::SeqCst);
    if received != args.rounds {
        return Err(WorkloadError::Mismatch {
            what: "received count",
            actual: received,
            expected: args.rounds,
        }
        .into());
    }

    let sum = exchange.sum.load(Ordering::SeqCst);
    let expected = args.rounds * (args.rounds + 1) / 2;
    if sum != expected {
        return Err(WorkloadError::Mismatch {
            what: "sum",
            actual: sum,
            expected,
        }
        .into());
    }

    println!("handed off {} values, sum = {}", received, sum);
    Ok(())
}
