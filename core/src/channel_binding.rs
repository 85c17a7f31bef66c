// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::Result;
use crate::job::{Job, WorkerId};
use async_trait::async_trait;

/// Trait for abstracting the transport between the scheduler and its workers.
/// Different implementations for in-process tasks, per-job processes,
/// named pipes and message queues.
///
/// Pool creation is each implementation's constructor: a constructor either
/// returns a pool with every worker ready, or fails without leaving any
/// worker behind.
#[async_trait]
pub trait ChannelBinding: Send {
    /// Number of worker identities, `0..pool_size()`.
    fn pool_size(&self) -> usize;

    /// Hand `job` to the idle worker `worker`.
    /// Returns once the job is handed over, not when it is done.
    async fn dispatch(&mut self, worker: WorkerId, job: Job) -> Result<()>;

    /// Wait for the next worker to finish its job.
    /// Completions that arrive together are queued and returned one per call.
    async fn await_completion(&mut self) -> Result<WorkerId>;

    /// Terminate every worker and reap it.
    /// Returns only when no worker process of this pool is alive.
    async fn shutdown(&mut self) -> Result<()>;
}
