// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{Error, Result};
use crate::job::{Job, WorkerId};
use crate::job_handlers::{self, JobHandlers};
use crate::worker_io::{CompletionSender, JobReceiver};
use std::sync::Arc;
use tracing::{debug, trace};

/// Run one job to completion on the blocking pool.
///
/// Handlers do synchronous file I/O; the worker stays busy for the whole call.
pub async fn execute_job<H>(handlers: &Arc<H>, job: Job) -> Result<()>
where
    H: JobHandlers,
{
    let handlers = Arc::clone(handlers);
    tokio::task::spawn_blocking(move || {
        job_handlers::execute(handlers.as_ref(), &job);
    })
    .await
    .map_err(|e| Error::Io(std::io::Error::other(e)))
}

/// Persistent worker loop.
///
/// Receives jobs until the shutdown sentinel arrives. Any transport error ends
/// the loop with that error so the hosting process can exit non-zero.
pub async fn run_worker<R, S, H>(
    id: WorkerId,
    mut jobs: R,
    mut completions: S,
    handlers: Arc<H>,
) -> Result<usize>
where
    R: JobReceiver,
    S: CompletionSender,
    H: JobHandlers,
{
    let mut executed = 0;
    loop {
        let job = jobs.recv().await?;
        if job.is_shutdown() {
            debug!(worker = id, executed, "worker received shutdown");
            return Ok(executed);
        }

        trace!(worker = id, ?job, "executing job");
        execute_job(&handlers, job).await?;
        executed += 1;

        completions.send(id).await?;
    }
}
