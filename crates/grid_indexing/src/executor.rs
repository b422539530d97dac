//! Task execution for per-chunk and per-pair work.
//!
//! Every task is a pure function of its input, so the executor only has to fan tasks out and
//! collect their results in input order. The first failure aborts the collection; tasks
//! already running on other workers finish and their results are dropped.
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{Error, Result};

/// Where tasks run.
#[derive(Debug)]
pub enum Executor {
    /// All tasks run on the calling thread.
    SingleThread,
    /// Tasks run on rayon's global pool.
    Global,
    /// Tasks run on a dedicated pool.
    ThreadPool(ThreadPool),
}

impl Executor {
    /// Executor that performs all tasks in the caller thread.
    pub fn single_thread() -> Executor {
        Executor::SingleThread
    }

    /// Executor backed by a dedicated pool of `num_threads` workers.
    pub fn multi_thread(num_threads: usize) -> Result<Executor> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("grid-indexing-{i}"))
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;
        Ok(Executor::ThreadPool(pool))
    }

    /// Maps a thread count setting to an executor.
    pub fn from_threads(threads: Option<usize>) -> Result<Executor> {
        match threads {
            None => Ok(Executor::Global),
            Some(0) => Err(Error::InvalidConfig("threads must be > 0".into())),
            Some(1) => Ok(Executor::single_thread()),
            Some(n) => Executor::multi_thread(n),
        }
    }

    /// Applies `f` to every argument and returns the results in argument order.
    pub fn map<A, R, F>(&self, f: F, args: &[A]) -> Result<Vec<R>>
    where
        A: Sync,
        R: Send,
        F: Fn(&A) -> Result<R> + Sync + Send,
    {
        match self {
            Executor::SingleThread => args.iter().map(f).collect(),
            Executor::Global => args.par_iter().map(f).collect(),
            Executor::ThreadPool(pool) => pool.install(|| args.par_iter().map(&f).collect()),
        }
    }
}
