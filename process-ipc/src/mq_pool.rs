// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::message_queue::{is_removed, worker_topic, MessageQueue, COMPLETION_TOPIC};
use crate::pool_monitor::{describe, PoolEvent, PoolMonitor};
use crate::record::decode_shared;
use crate::worker_process::WorkerProgram;
use async_trait::async_trait;
use mail_scan_core::channel_binding::ChannelBinding;
use mail_scan_core::{Completion, Error, Job, Result, WorkerId};
use std::io;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Persistent workers sharing one System V message queue.
///
/// Jobs for worker `i` travel on topic `i + 2`; every completion travels on
/// topic 1 and carries the worker id.
pub struct MqPool {
    pool_size: usize,
    queue: MessageQueue,
    reader: Option<JoinHandle<()>>,
    monitor: PoolMonitor,
    removed: bool,
}

impl MqPool {
    /// Create the queue and start `pool_size` workers attached to it.
    ///
    /// Must be called from within a tokio runtime. On failure the workers
    /// already started are killed and the queue removed.
    pub fn new(program: &WorkerProgram, pool_size: usize) -> Result<Self> {
        if pool_size == 0 {
            return Err(Error::Setup("worker pool must not be empty".into()));
        }
        let queue = MessageQueue::create().map_err(Error::Queue)?;

        let mut pool = Self {
            pool_size,
            queue,
            reader: None,
            monitor: PoolMonitor::new(pool_size),
            removed: false,
        };
        pool.reader = Some(spawn_completion_reader(
            queue,
            pool_size,
            pool.monitor.events(),
        ));

        let queue_id = queue.id().to_string();
        for worker in 0..pool_size {
            let id = worker.to_string();
            let child = program.spawn(
                worker,
                ["mq", "--id", id.as_str(), "--queue", queue_id.as_str()],
            )?;
            debug!(worker, pid = ?child.id(), "mq worker started");
            pool.monitor.watch(worker, child);
        }

        info!(pool_size, queue = queue.id(), "message queue pool ready");
        Ok(pool)
    }

    pub fn live_workers(&self) -> usize {
        self.monitor.live()
    }

    pub fn worker_pid(&self, worker: WorkerId) -> Option<u32> {
        self.monitor.pid(worker)
    }

    pub fn queue(&self) -> MessageQueue {
        self.queue
    }

    fn remove_queue(&mut self) -> Result<()> {
        if self.removed {
            return Ok(());
        }
        self.removed = true;
        self.queue.remove().map_err(Error::Queue)
    }
}

async fn send_job(queue: MessageQueue, worker: WorkerId, job: &Job) -> Result<()> {
    let payload = serde_json::to_vec(job)?;
    let topic = worker_topic(worker);
    tokio::task::spawn_blocking(move || queue.send(topic, &payload))
        .await
        .map_err(|e| Error::Queue(io::Error::other(e)))?
        .map_err(|source| Error::Channel { worker, source })
}

/// Drain the completion topic on the blocking pool until the queue is removed.
/// Stops after the first undecodable record.
fn spawn_completion_reader(
    queue: MessageQueue,
    pool_size: usize,
    events: UnboundedSender<PoolEvent>,
) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || loop {
        let event = match queue.receive(COMPLETION_TOPIC) {
            Ok(payload) => match decode_shared::<Completion>(&payload) {
                Ok(completion) if completion.worker < pool_size => {
                    PoolEvent::Completed(completion.worker)
                }
                Ok(completion) => PoolEvent::Failed(Error::Malformed {
                    worker: Some(completion.worker),
                    reason: format!("no such worker in a pool of {}", pool_size),
                }),
                Err(e) => PoolEvent::Failed(e),
            },
            Err(e) if is_removed(&e) => return,
            Err(e) => PoolEvent::Failed(Error::Queue(e)),
        };
        let failed = matches!(event, PoolEvent::Failed(_));
        if events.send(event).is_err() || failed {
            return;
        }
    })
}

#[async_trait]
impl ChannelBinding for MqPool {
    fn pool_size(&self) -> usize {
        self.pool_size
    }

    async fn dispatch(&mut self, worker: WorkerId, job: Job) -> Result<()> {
        send_job(self.queue, worker, &job).await
    }

    async fn await_completion(&mut self) -> Result<WorkerId> {
        match self.monitor.next_event().await? {
            PoolEvent::Completed(worker) => Ok(worker),
            PoolEvent::Exited { worker, status } => Err(Error::WorkerExited {
                worker,
                status: describe(&status),
            }),
            PoolEvent::Failed(e) => Err(e),
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        if self.removed {
            return Ok(());
        }

        for worker in 0..self.pool_size {
            if let Err(e) = send_job(self.queue, worker, &Job::Shutdown).await {
                warn!(worker, error = %e, "failed to send shutdown");
            }
        }

        let reaped = self.monitor.reap_all().await;
        let removed = self.remove_queue();
        if let Some(reader) = self.reader.take() {
            let _ = reader.await;
        }
        reaped.and(removed)
    }
}

impl Drop for MqPool {
    fn drop(&mut self) {
        if let Err(e) = self.remove_queue() {
            warn!(queue = self.queue.id(), error = %e, "failed to remove message queue");
        }
    }
}
