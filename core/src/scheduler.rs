// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::channel_binding::ChannelBinding;
use crate::error::{Error, Result};
use crate::job::{Job, WorkerId};
use tracing::{debug, info};

/// Scheduler-side view of a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Busy,
}

/// Outcome of one pass over a job source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub dispatched: usize,
    pub jobs_per_worker: Vec<usize>,
}

impl PassReport {
    /// Number of workers that received at least one job
    pub fn workers_used(&self) -> usize {
        self.jobs_per_worker.iter().filter(|count| **count > 0).count()
    }
}

/// Distributes jobs over a pool while keeping at most one job per worker.
///
/// The only suspension point is `await_completion`: the scheduler never polls.
pub struct Scheduler<'a, B>
where
    B: ChannelBinding + ?Sized,
{
    binding: &'a mut B,
    states: Vec<WorkerState>,
    jobs_per_worker: Vec<usize>,
    busy: usize,
}

impl<'a, B> Scheduler<'a, B>
where
    B: ChannelBinding + ?Sized,
{
    pub fn new(binding: &'a mut B) -> Self {
        let pool_size = binding.pool_size();
        Self {
            binding,
            states: vec![WorkerState::Idle; pool_size],
            jobs_per_worker: vec![0; pool_size],
            busy: 0,
        }
    }

    /// Run one pass: saturate the pool, then feed workers as they free up.
    /// Returns once every dispatched job has signalled completion.
    pub async fn run_pass<I>(mut self, jobs: I) -> Result<PassReport>
    where
        I: IntoIterator<Item = Job>,
    {
        let mut jobs = jobs.into_iter();
        let mut dispatched = 0;

        if self.states.is_empty() {
            return Err(Error::Setup("worker pool is empty".into()));
        }

        // Distribute initial jobs
        for worker in 0..self.states.len() {
            let Some(job) = jobs.next() else { break };
            self.dispatch(worker, job).await?;
            dispatched += 1;
        }
        debug!(dispatched, pool_size = self.states.len(), "pool saturated");

        // Drain: every completion either frees a worker or gets it a new job
        while self.busy > 0 {
            let worker = self.binding.await_completion().await?;
            match self.states.get(worker) {
                Some(WorkerState::Busy) => {}
                _ => return Err(Error::UnexpectedCompletion(worker)),
            }

            self.busy -= 1;
            self.states[worker] = WorkerState::Idle;

            if let Some(job) = jobs.next() {
                self.dispatch(worker, job).await?;
                dispatched += 1;
            }
        }

        info!(dispatched, "pass complete");
        Ok(PassReport {
            dispatched,
            jobs_per_worker: self.jobs_per_worker,
        })
    }

    async fn dispatch(&mut self, worker: WorkerId, job: Job) -> Result<()> {
        debug_assert_eq!(self.states[worker], WorkerState::Idle);
        self.binding.dispatch(worker, job).await?;
        self.states[worker] = WorkerState::Busy;
        self.jobs_per_worker[worker] += 1;
        self.busy += 1;
        debug_assert!(self.busy <= self.states.len());
        Ok(())
    }
}

/// Convenience wrapper: one pass of `jobs` over `binding`.
pub async fn run_pass<B, I>(binding: &mut B, jobs: I) -> Result<PassReport>
where
    B: ChannelBinding + ?Sized,
    I: IntoIterator<Item = Job>,
{
    Scheduler::new(binding).run_pass(jobs).await
}
