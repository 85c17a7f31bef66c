// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Stable logical identity of a worker within one pool (`0..pool_size`).
pub type WorkerId = usize;

/// A unit of work handed to exactly one worker.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Job {
    /// List every regular file below `source` into `destination`.
    ScanDirectory {
        source: PathBuf,
        destination: PathBuf,
    },
    /// Extract sender and recipients of the mail at `source` into `destination`.
    AnalyzeFile {
        source: PathBuf,
        destination: PathBuf,
    },
    /// Sentinel that terminates a persistent worker.
    Shutdown,
}

impl Job {
    pub fn is_shutdown(&self) -> bool {
        matches!(self, Job::Shutdown)
    }

    pub fn source(&self) -> Option<&PathBuf> {
        match self {
            Job::ScanDirectory { source, .. } | Job::AnalyzeFile { source, .. } => Some(source),
            Job::Shutdown => None,
        }
    }
}

/// Signal sent by a worker once its current job is done.
///
/// Carries no result: output travels through the job's destination file.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub worker: WorkerId,
}
