// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::job::WorkerId;
use thiserror::Error;

/// Result type for scheduler, binding and reducer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a run.
///
/// Per-job I/O failures never reach this type: job handlers swallow them.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration or filesystem layout is unusable.
    #[error("invalid setup: {0}")]
    Setup(String),

    /// A worker process could not be started.
    #[error("failed to spawn worker {worker}: {source}")]
    Spawn {
        worker: WorkerId,
        source: std::io::Error,
    },

    /// A transport endpoint could not be opened, read or written.
    #[error("channel failure on worker {worker}: {source}")]
    Channel {
        worker: WorkerId,
        source: std::io::Error,
    },

    /// The shared message queue failed.
    #[error("message queue failure: {0}")]
    Queue(std::io::Error),

    /// A record on a transport could not be decoded.
    /// `worker` is unknown for records read from a channel shared by the pool.
    #[error("malformed record{}: {reason}", .worker.map(|w| format!(" from worker {}", w)).unwrap_or_default())]
    Malformed {
        worker: Option<WorkerId>,
        reason: String,
    },

    /// A worker terminated outside of an orderly shutdown.
    #[error("worker {worker} exited unexpectedly ({status})")]
    WorkerExited { worker: WorkerId, status: String },

    /// A completion arrived from a worker that had no job in flight.
    #[error("completion from idle worker {0}")]
    UnexpectedCompletion(WorkerId),

    /// Every event source of the pool is gone.
    #[error("worker pool closed while jobs were in flight")]
    PoolClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
