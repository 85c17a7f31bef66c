// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::channel_binding::ChannelBinding;
use crate::error::{Error, Result};
use crate::job::{Completion, Job, WorkerId};
use crate::job_handlers::JobHandlers;
use crate::worker_io::{CompletionSender, JobReceiver};
use crate::worker_loop::run_worker;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::debug;

/// Tokio mpsc job receiver
pub struct ChannelJobReceiver {
    rx: UnboundedReceiver<Job>,
}

#[async_trait]
impl JobReceiver for ChannelJobReceiver {
    async fn recv(&mut self) -> Result<Job> {
        self.rx.recv().await.ok_or(Error::PoolClosed)
    }
}

/// Tokio mpsc completion sender
#[derive(Clone)]
pub struct ChannelCompletionSender {
    tx: UnboundedSender<Completion>,
}

#[async_trait]
impl CompletionSender for ChannelCompletionSender {
    async fn send(&mut self, worker: WorkerId) -> Result<()> {
        self.tx
            .send(Completion { worker })
            .map_err(|_| Error::PoolClosed)
    }
}

/// In-process pool: every worker is a tokio task running the worker loop.
pub struct TaskPool {
    job_txs: Vec<UnboundedSender<Job>>,
    completion_rx: UnboundedReceiver<Completion>,
    handles: Vec<JoinHandle<Result<usize>>>,
}

impl TaskPool {
    pub fn new<H>(pool_size: usize, handlers: Arc<H>) -> Self
    where
        H: JobHandlers,
    {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let mut job_txs = Vec::with_capacity(pool_size);
        let mut handles = Vec::with_capacity(pool_size);

        for worker in 0..pool_size {
            let (job_tx, job_rx) = mpsc::unbounded_channel();
            let jobs = ChannelJobReceiver { rx: job_rx };
            let completions = ChannelCompletionSender {
                tx: completion_tx.clone(),
            };
            handles.push(tokio::spawn(run_worker(
                worker,
                jobs,
                completions,
                Arc::clone(&handlers),
            )));
            job_txs.push(job_tx);
        }

        Self {
            job_txs,
            completion_rx,
            handles,
        }
    }
}

#[async_trait]
impl ChannelBinding for TaskPool {
    fn pool_size(&self) -> usize {
        self.job_txs.len()
    }

    async fn dispatch(&mut self, worker: WorkerId, job: Job) -> Result<()> {
        let tx = self.job_txs.get(worker).ok_or(Error::PoolClosed)?;
        tx.send(job).map_err(|_| Error::WorkerExited {
            worker,
            status: "task ended".into(),
        })
    }

    async fn await_completion(&mut self) -> Result<WorkerId> {
        self.completion_rx
            .recv()
            .await
            .map(|completion| completion.worker)
            .ok_or(Error::PoolClosed)
    }

    async fn shutdown(&mut self) -> Result<()> {
        for tx in &self.job_txs {
            let _ = tx.send(Job::Shutdown);
        }

        let mut first_error = None;
        for (worker, handle) in self.handles.drain(..).enumerate() {
            let outcome = match handle.await {
                Ok(Ok(executed)) => {
                    debug!(worker, executed, "task worker stopped");
                    Ok(())
                }
                Ok(Err(e)) => Err(e),
                Err(e) => Err(Error::WorkerExited {
                    worker,
                    status: e.to_string(),
                }),
            };
            if let Err(e) = outcome {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
