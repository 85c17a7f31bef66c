// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::pool_monitor::{describe, exited_cleanly, PoolEvent, PoolMonitor};
use crate::worker_process::WorkerProgram;
use async_trait::async_trait;
use mail_scan_core::channel_binding::ChannelBinding;
use mail_scan_core::{Error, Job, Result, WorkerId};
use tracing::{debug, info};

/// One short-lived process per job.
///
/// The job travels on the command line and the process exit is the completion
/// signal. Worker ids are slots: a slot is busy while its process runs.
pub struct SpawnPerJob {
    program: WorkerProgram,
    pool_size: usize,
    monitor: PoolMonitor,
}

impl SpawnPerJob {
    pub fn new(program: WorkerProgram, pool_size: usize) -> Result<Self> {
        if pool_size == 0 {
            return Err(Error::Setup("worker pool must not be empty".into()));
        }
        info!(pool_size, executable = %program.executable().display(), "spawn-per-job pool ready");
        Ok(Self {
            program,
            pool_size,
            monitor: PoolMonitor::new(pool_size),
        })
    }

    pub fn live_workers(&self) -> usize {
        self.monitor.live()
    }
}

#[async_trait]
impl ChannelBinding for SpawnPerJob {
    fn pool_size(&self) -> usize {
        self.pool_size
    }

    async fn dispatch(&mut self, worker: WorkerId, job: Job) -> Result<()> {
        let encoded = serde_json::to_string(&job)?;
        let id = worker.to_string();
        let child = self
            .program
            .spawn(worker, ["job", "--id", id.as_str(), "--job", encoded.as_str()])?;
        debug!(worker, pid = ?child.id(), "job process started");
        self.monitor.watch(worker, child);
        Ok(())
    }

    async fn await_completion(&mut self) -> Result<WorkerId> {
        match self.monitor.next_event().await? {
            PoolEvent::Exited { worker, status } if exited_cleanly(&status) => Ok(worker),
            PoolEvent::Exited { worker, status } => Err(Error::WorkerExited {
                worker,
                status: describe(&status),
            }),
            PoolEvent::Completed(worker) => Ok(worker),
            PoolEvent::Failed(e) => Err(e),
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        if self.monitor.live() > 0 {
            debug!(live = self.monitor.live(), "waiting for job processes");
        }
        self.monitor.reap_all().await
    }
}
