// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::message_queue::{worker_topic, MessageQueue, COMPLETION_TOPIC};
use crate::record::decode;
use async_trait::async_trait;
use mail_scan_core::worker_io::{CompletionSender, JobReceiver};
use mail_scan_core::{Completion, Error, Job, Result, WorkerId};
use std::io;

async fn blocking<T, F>(worker: WorkerId, f: F) -> Result<T>
where
    F: FnOnce() -> io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Channel {
            worker,
            source: io::Error::other(e),
        })?
        .map_err(|source| Error::Channel { worker, source })
}

/// Receives jobs addressed to one worker's topic.
pub struct MqJobReceiver {
    worker: WorkerId,
    queue: MessageQueue,
}

impl MqJobReceiver {
    pub fn new(worker: WorkerId, queue: MessageQueue) -> Self {
        Self { worker, queue }
    }
}

#[async_trait]
impl JobReceiver for MqJobReceiver {
    async fn recv(&mut self) -> Result<Job> {
        let queue = self.queue;
        let topic = worker_topic(self.worker);
        let payload = blocking(self.worker, move || queue.receive(topic)).await?;
        decode(self.worker, &payload)
    }
}

/// Reports completions on the shared completion topic.
pub struct MqCompletionSender {
    queue: MessageQueue,
}

impl MqCompletionSender {
    pub fn new(queue: MessageQueue) -> Self {
        Self { queue }
    }
}

#[async_trait]
impl CompletionSender for MqCompletionSender {
    async fn send(&mut self, worker: WorkerId) -> Result<()> {
        let payload = serde_json::to_vec(&Completion { worker })?;
        let queue = self.queue;
        blocking(worker, move || queue.send(COMPLETION_TOPIC, &payload)).await
    }
}
