// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use mail_scan_core::{Error, Result, WorkerId};
use std::io;
use std::process::ExitStatus;
use tokio::process::Child;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::debug;

/// Everything the coordinator can learn about its workers
#[derive(Debug)]
pub(crate) enum PoolEvent {
    /// A worker reported the end of its job over the transport
    Completed(WorkerId),
    /// A worker process was reaped
    Exited {
        worker: WorkerId,
        status: io::Result<ExitStatus>,
    },
    /// A transport reader gave up
    Failed(Error),
}

pub(crate) fn describe(status: &io::Result<ExitStatus>) -> String {
    match status {
        Ok(status) => status.to_string(),
        Err(e) => format!("wait failed: {}", e),
    }
}

pub(crate) fn exited_cleanly(status: &io::Result<ExitStatus>) -> bool {
    matches!(status, Ok(status) if status.success())
}

/// Owns the worker processes of one pool and funnels their events into one queue.
///
/// Each child is moved into a watcher task that reaps it. Dropping the monitor
/// aborts the watchers, which drops (and kills) any child still running.
pub(crate) struct PoolMonitor {
    tx: UnboundedSender<PoolEvent>,
    rx: UnboundedReceiver<PoolEvent>,
    watchers: Vec<Option<JoinHandle<()>>>,
    pids: Vec<Option<u32>>,
    live: usize,
}

impl PoolMonitor {
    pub fn new(pool_size: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            watchers: (0..pool_size).map(|_| None).collect(),
            pids: vec![None; pool_size],
            live: 0,
        }
    }

    pub fn events(&self) -> UnboundedSender<PoolEvent> {
        self.tx.clone()
    }

    pub fn live(&self) -> usize {
        self.live
    }

    /// Process id of `worker` while it has not been reaped.
    pub fn pid(&self, worker: WorkerId) -> Option<u32> {
        self.pids.get(worker).copied().flatten()
    }

    /// Take ownership of `child` as the process behind `worker`.
    pub fn watch(&mut self, worker: WorkerId, mut child: Child) {
        let tx = self.tx.clone();
        let pid = child.id();

        let handle = tokio::spawn(async move {
            let status = child.wait().await;
            debug!(worker, ?pid, ?status, "worker process reaped");
            let _ = tx.send(PoolEvent::Exited { worker, status });
        });

        self.watchers[worker] = Some(handle);
        self.pids[worker] = pid;
        self.live += 1;
    }

    /// Next event of the pool, with process bookkeeping applied.
    pub async fn next_event(&mut self) -> Result<PoolEvent> {
        let event = self.rx.recv().await.ok_or(Error::PoolClosed)?;
        if let PoolEvent::Exited { worker, .. } = &event {
            self.pids[*worker] = None;
            if self.watchers[*worker].take().is_some() {
                self.live -= 1;
            }
        }
        Ok(event)
    }

    /// Wait until every watched process has been reaped.
    /// Returns the first abnormal exit, if any.
    pub async fn reap_all(&mut self) -> Result<()> {
        let mut first_error = None;
        while self.live > 0 {
            match self.next_event().await? {
                PoolEvent::Exited { worker, status } if !exited_cleanly(&status) => {
                    first_error.get_or_insert(Error::WorkerExited {
                        worker,
                        status: describe(&status),
                    });
                }
                PoolEvent::Failed(e) => {
                    debug!(error = %e, "transport failure while reaping");
                }
                _ => {}
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for PoolMonitor {
    fn drop(&mut self) {
        for handle in self.watchers.iter().flatten() {
            handle.abort();
        }
    }
}
