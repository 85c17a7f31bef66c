// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use mail_scan_core::{Error, Result, WorkerId};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};

/// Executable that hosts worker processes through its `worker` subcommand.
#[derive(Debug, Clone)]
pub struct WorkerProgram {
    executable: PathBuf,
}

impl WorkerProgram {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// The running executable, re-executed as a worker.
    pub fn current() -> Result<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Start `<executable> worker <args...>`.
    /// The child is killed if its handle is dropped before it is reaped.
    pub(crate) fn spawn<I, S>(&self, worker: WorkerId, args: I) -> Result<Child>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Command::new(&self.executable)
            .arg("worker")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::Spawn { worker, source })
    }
}
