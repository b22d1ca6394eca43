//! The eight benchmark workloads.
//!
//! | Operation     | Measured body                                           |
//! |---------------|---------------------------------------------------------|
//! | Create        | `link_count` × `create_point()`                         |
//! | Update        | last `link_count` background ids: `(id, 0, 0)` then `(id, id, id)` |
//! | Delete        | `link_count` extra links deleted highest id first       |
//! | Each All      | one `[*, *, *]` scan                                    |
//! | Each Identity | `[id, *, *]` for every background id                    |
//! | Each Concrete | `[*, id, id]` for every background id                   |
//! | Each Outgoing | `[*, id, *]` for every background id                    |
//! | Each Incoming | `[*, *, id]` for every background id                    |

use std::{
    hint::black_box,
    time::{Duration, Instant},
};

use super::{BenchConfig, Benched, Operation};
use crate::links::{Doublets, Flow, Link, LinkId, Result};

/// Accumulates the time spent in explicitly timed sections only.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stopwatch {
    elapsed: Duration,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f`, adding its wall time to the total.
    pub fn time<T>(&mut self, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        self.elapsed += start.elapsed();
        result
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Runs `iters` iterations of `operation` on `benched` and returns the time
/// spent in the measured parts.
///
/// Every iteration forks the backend, creates the background point links
/// untimed, runs the workload and unforks. A failed unfork fails the
/// measurement, since for transactions it is the commit.
pub fn measure<B>(benched: &mut B, iters: u64, config: &BenchConfig, operation: Operation) -> Result<Duration>
where
    B: Benched + Doublets,
{
    let mut watch = Stopwatch::new();
    for _ in 0..iters {
        let mut fork = benched.fork()?;
        for _ in 0..config.background_links {
            fork.create_point()?;
        }
        run_operation(&mut *fork, config, operation, &mut watch)?;
        fork.finish()?;
    }
    Ok(watch.elapsed())
}

/// Runs one workload against a store already holding the background links
/// `1..=background_links`.
pub fn run_operation<D: Doublets>(
    store: &mut D,
    config: &BenchConfig,
    operation: Operation,
    watch: &mut Stopwatch,
) -> Result<()> {
    let background = config.background_links as LinkId;
    let count = config.link_count as LinkId;
    let constants = store.constants().clone();
    let (any, null) = (constants.any, constants.null);

    match operation {
        Operation::Create => {
            for _ in 0..count {
                watch.time(|| store.create_point())?;
            }
        }
        Operation::Update => {
            let first = (background + 1).saturating_sub(count).max(1);
            for id in first..=background {
                watch.time(|| store.update(id, null, null))?;
                watch.time(|| store.update(id, id, id))?;
            }
        }
        Operation::Delete => {
            for _ in 0..count {
                store.create_point()?;
            }
            for id in (background + 1..=background + count).rev() {
                watch.time(|| store.delete(id))?;
            }
        }
        Operation::EachAll => {
            watch.time(|| store.each_by([any, any, any], consume))?;
        }
        Operation::EachIdentity => {
            for id in 1..=background {
                watch.time(|| store.each_by([id, any, any], consume))?;
            }
        }
        Operation::EachConcrete => {
            for id in 1..=background {
                watch.time(|| store.each_by([any, id, id], consume))?;
            }
        }
        Operation::EachOutgoing => {
            for id in 1..=background {
                watch.time(|| store.each_by([any, id, any], consume))?;
            }
        }
        Operation::EachIncoming => {
            for id in 1..=background {
                watch.time(|| store.each_by([any, any, id], consume))?;
            }
        }
    }
    Ok(())
}

fn consume(link: Link) -> Flow {
    black_box(link);
    Flow::Continue
}
