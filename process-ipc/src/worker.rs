// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Entry points of the three worker process kinds.

use crate::fifo_channel::{FifoCompletionSender, FifoJobReceiver};
use crate::message_queue::MessageQueue;
use crate::mq_channel::{MqCompletionSender, MqJobReceiver};
use crate::record::decode;
use mail_scan_core::job_handlers::JobHandlers;
use mail_scan_core::worker_loop::{execute_job, run_worker};
use mail_scan_core::{Job, Result, WorkerId};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Execute the single job given on the command line, then return.
/// The process exit status is the completion signal.
pub async fn run_job_process<H>(id: WorkerId, job: &str, handlers: Arc<H>) -> Result<()>
where
    H: JobHandlers,
{
    let job: Job = decode(id, job.as_bytes())?;
    if job.is_shutdown() {
        return Ok(());
    }
    debug!(worker = id, ?job, "executing job");
    execute_job(&handlers, job).await
}

pub async fn run_fifo_worker<H>(
    id: WorkerId,
    commands: &Path,
    notify: &Path,
    handlers: Arc<H>,
) -> Result<usize>
where
    H: JobHandlers,
{
    let jobs = FifoJobReceiver::open(id, commands)?;
    let completions = FifoCompletionSender::open(id, notify)?;
    run_worker(id, jobs, completions, handlers).await
}

pub async fn run_mq_worker<H>(id: WorkerId, queue_id: i32, handlers: Arc<H>) -> Result<usize>
where
    H: JobHandlers,
{
    let queue = MessageQueue::from_id(queue_id);
    run_worker(
        id,
        MqJobReceiver::new(id, queue),
        MqCompletionSender::new(queue),
        handlers,
    )
    .await
}
