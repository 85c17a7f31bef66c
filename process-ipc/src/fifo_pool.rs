// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::pool_monitor::{describe, PoolEvent, PoolMonitor};
use crate::record::{decode, encode_line};
use crate::worker_process::WorkerProgram;
use async_trait::async_trait;
use mail_scan_core::channel_binding::ChannelBinding;
use mail_scan_core::{Completion, Error, Job, Result, WorkerId};
use nix::sys::stat::Mode;
use nix::unistd::mkfifo;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::pipe;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Persistent workers, each with a private command FIFO and notification FIFO.
///
/// The coordinator opens both FIFOs of a worker read-write before spawning it,
/// so neither side blocks on open and neither side sees EOF while the pool
/// lives. Worker death is observed through the process, not the pipe.
pub struct FifoPool {
    pool_size: usize,
    commands: Vec<pipe::Sender>,
    fifos: Vec<PathBuf>,
    readers: Vec<JoinHandle<()>>,
    monitor: PoolMonitor,
    shut_down: bool,
}

pub fn command_fifo(dir: &Path, worker: WorkerId) -> PathBuf {
    dir.join(format!("commands-{}", worker))
}

pub fn notify_fifo(dir: &Path, worker: WorkerId) -> PathBuf {
    dir.join(format!("notify-{}", worker))
}

impl FifoPool {
    /// Create the FIFOs under `fifo_dir` and start `pool_size` workers.
    ///
    /// Must be called from within a tokio runtime. On failure the workers
    /// already started are killed and the FIFOs removed.
    pub fn new(program: &WorkerProgram, pool_size: usize, fifo_dir: &Path) -> Result<Self> {
        if pool_size == 0 {
            return Err(Error::Setup("worker pool must not be empty".into()));
        }
        fs::create_dir_all(fifo_dir)?;

        let mut pool = Self {
            pool_size,
            commands: Vec::with_capacity(pool_size),
            fifos: Vec::with_capacity(pool_size * 2),
            readers: Vec::with_capacity(pool_size),
            monitor: PoolMonitor::new(pool_size),
            shut_down: false,
        };

        for worker in 0..pool_size {
            let commands = command_fifo(fifo_dir, worker);
            let notify = notify_fifo(fifo_dir, worker);
            pool.create_fifo(worker, &commands)?;
            pool.create_fifo(worker, &notify)?;

            let sender = pipe::OpenOptions::new()
                .read_write(true)
                .open_sender(&commands)
                .map_err(|source| Error::Channel { worker, source })?;
            let receiver = pipe::OpenOptions::new()
                .read_write(true)
                .open_receiver(&notify)
                .map_err(|source| Error::Channel { worker, source })?;

            let id = worker.to_string();
            let child = program.spawn(
                worker,
                [
                    OsStr::new("fifo"),
                    OsStr::new("--id"),
                    OsStr::new(&id),
                    OsStr::new("--commands"),
                    commands.as_os_str(),
                    OsStr::new("--notify"),
                    notify.as_os_str(),
                ],
            )?;
            debug!(worker, pid = ?child.id(), "fifo worker started");

            pool.monitor.watch(worker, child);
            pool.commands.push(sender);
            pool.readers
                .push(spawn_completion_reader(worker, receiver, pool.monitor.events()));
        }

        info!(pool_size, dir = %fifo_dir.display(), "fifo pool ready");
        Ok(pool)
    }

    pub fn live_workers(&self) -> usize {
        self.monitor.live()
    }

    pub fn worker_pid(&self, worker: WorkerId) -> Option<u32> {
        self.monitor.pid(worker)
    }

    fn create_fifo(&mut self, worker: WorkerId, path: &Path) -> Result<()> {
        remove_if_exists(path)?;
        mkfifo(path, Mode::S_IRUSR | Mode::S_IWUSR).map_err(|errno| Error::Channel {
            worker,
            source: io::Error::from(errno),
        })?;
        self.fifos.push(path.to_path_buf());
        Ok(())
    }

    fn remove_fifos(&mut self) {
        for path in self.fifos.drain(..) {
            if let Err(e) = remove_if_exists(&path) {
                warn!(path = %path.display(), error = %e, "failed to remove fifo");
            }
        }
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Forward every completion line of one worker into the pool's event queue.
/// Stops after the first undecodable record.
fn spawn_completion_reader(
    worker: WorkerId,
    receiver: pipe::Receiver,
    events: UnboundedSender<PoolEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(receiver).lines();
        loop {
            let event = match lines.next_line().await {
                Ok(Some(line)) => match decode::<Completion>(worker, line.as_bytes()) {
                    Ok(completion) if completion.worker == worker => PoolEvent::Completed(worker),
                    Ok(completion) => PoolEvent::Failed(Error::Malformed {
                        worker: Some(worker),
                        reason: format!("completion names worker {}", completion.worker),
                    }),
                    Err(e) => PoolEvent::Failed(e),
                },
                Ok(None) => return,
                Err(source) => PoolEvent::Failed(Error::Channel { worker, source }),
            };
            let failed = matches!(event, PoolEvent::Failed(_));
            if events.send(event).is_err() || failed {
                return;
            }
        }
    })
}

#[async_trait]
impl ChannelBinding for FifoPool {
    fn pool_size(&self) -> usize {
        self.pool_size
    }

    async fn dispatch(&mut self, worker: WorkerId, job: Job) -> Result<()> {
        let record = encode_line(&job)?;
        let sender = self.commands.get_mut(worker).ok_or(Error::PoolClosed)?;
        sender
            .write_all(&record)
            .await
            .map_err(|source| Error::Channel { worker, source })
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
        if self.shut_down {
            return Ok(());
        }
        self.shut_down = true;

        let record = encode_line(&Job::Shutdown)?;
        for (worker, sender) in self.commands.iter_mut().enumerate() {
            if let Err(e) = sender.write_all(&record).await {
                warn!(worker, error = %e, "failed to send shutdown");
            }
        }

        let reaped = self.monitor.reap_all().await;
        for reader in self.readers.drain(..) {
            reader.abort();
        }
        self.commands.clear();
        self.remove_fifos();
        reaped
    }
}

impl Drop for FifoPool {
    fn drop(&mut self) {
        for reader in &self.readers {
            reader.abort();
        }
        self.remove_fifos();
    }
}
