// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::record::{decode, encode_line};
use async_trait::async_trait;
use mail_scan_core::worker_io::{CompletionSender, JobReceiver};
use mail_scan_core::{Completion, Error, Job, Result, WorkerId};
use std::io;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::unix::pipe;

/// Reads JSON job lines from the worker's command FIFO.
pub struct FifoJobReceiver {
    worker: WorkerId,
    lines: Lines<BufReader<pipe::Receiver>>,
}

impl FifoJobReceiver {
    /// Open the read end. The coordinator already holds the write end open.
    pub fn open(worker: WorkerId, path: &Path) -> Result<Self> {
        let receiver = pipe::OpenOptions::new()
            .open_receiver(path)
            .map_err(|source| Error::Channel { worker, source })?;
        Ok(Self {
            worker,
            lines: BufReader::new(receiver).lines(),
        })
    }
}

#[async_trait]
impl JobReceiver for FifoJobReceiver {
    async fn recv(&mut self) -> Result<Job> {
        let worker = self.worker;
        match self.lines.next_line().await {
            Ok(Some(line)) => decode(worker, line.as_bytes()),
            Ok(None) => Err(Error::Channel {
                worker,
                source: io::Error::new(io::ErrorKind::UnexpectedEof, "command pipe closed"),
            }),
            Err(source) => Err(Error::Channel { worker, source }),
        }
    }
}

/// Writes JSON completion lines to the worker's notification FIFO.
pub struct FifoCompletionSender {
    worker: WorkerId,
    sender: pipe::Sender,
}

impl FifoCompletionSender {
    /// Open the write end. Fails unless the coordinator holds the read end.
    pub fn open(worker: WorkerId, path: &Path) -> Result<Self> {
        let sender = pipe::OpenOptions::new()
            .open_sender(path)
            .map_err(|source| Error::Channel { worker, source })?;
        Ok(Self { worker, sender })
    }
}

#[async_trait]
impl CompletionSender for FifoCompletionSender {
    async fn send(&mut self, worker: WorkerId) -> Result<()> {
        let record = encode_line(&Completion { worker })?;
        self.sender
            .write_all(&record)
            .await
            .map_err(|source| Error::Channel {
                worker: self.worker,
                source,
            })
    }
}
