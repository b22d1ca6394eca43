//! Benchmark lifecycle and workloads.
//!
//! Every backend implements [`Benched`]. A benchmark iteration forks the
//! backend, which resets it to an empty store whose next id is 1, fills it
//! with the background links, runs the measured workload and unforks through
//! [`Fork::finish`].

pub mod backend;
pub mod benched;
pub mod config;
pub mod workload;


use std::ops::{Deref, DerefMut};

pub use self::{
    backend::{Backend, Operation},
    config::{BenchConfig, BenchConfigBuilder, ConfigError},
    workload::{measure, run_operation, Stopwatch},
};
use crate::links::Result;

/// A backend that can be benchmarked.
pub trait Benched: Sized {
    /// What [`setup`](Benched::setup) needs to build the backend.
    type Builder<'p>;

    fn setup(builder: Self::Builder<'_>) -> Result<Self>;

    /// Resets the backend to an empty store and hands it out for one iteration.
    fn fork(&mut self) -> Result<Fork<'_, Self>>;

    /// Cleans up after an iteration. Called by [`Fork::finish`], or when an
    /// unfinished [`Fork`] is dropped.
    fn unfork(&mut self) -> Result<()>;
}

/// Exclusive access to a backend for the length of one iteration.
///
/// [`finish`](Fork::finish) unforks and reports the outcome. A fork dropped
/// without finishing, e.g. while an error propagates, still unforks but can
/// only log a failure.
pub struct Fork<'a, B: Benched> {
    benched: &'a mut B,
    armed: bool,
}

impl<'a, B: Benched> Fork<'a, B> {
    pub fn new(benched: &'a mut B) -> Self {
        Fork {
            benched,
            armed: true,
        }
    }

    /// Ends the iteration, returning the result of [`Benched::unfork`].
    pub fn finish(mut self) -> Result<()> {
        self.armed = false;
        self.benched.unfork()
    }
}

impl<B: Benched> Deref for Fork<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.benched
    }
}

impl<B: Benched> DerefMut for Fork<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.benched
    }
}

impl<B: Benched> Drop for Fork<'_, B> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = self.benched.unfork() {
            tracing::warn!(error = %e, "failed to unfork benched backend");
        }
    }
}
