// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::Result;
use crate::job::{Job, WorkerId};
use async_trait::async_trait;

/// Worker side of a transport: receives jobs one at a time.
#[async_trait]
pub trait JobReceiver: Send {
    /// Receive the next job.
    /// A closed channel or an undecodable record is an error, never a job.
    async fn recv(&mut self) -> Result<Job>;
}

/// Worker side of a transport: reports that the current job is done.
#[async_trait]
pub trait CompletionSender: Send {
    async fn send(&mut self, worker: WorkerId) -> Result<()>;
}
