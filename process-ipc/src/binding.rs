// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::direct_spawn::SpawnPerJob;
use crate::fifo_pool::FifoPool;
use crate::mq_pool::MqPool;
use crate::worker_process::WorkerProgram;
use clap::ValueEnum;
use mail_scan_core::channel_binding::ChannelBinding;
use mail_scan_core::scratch::ScratchLayout;
use mail_scan_core::Result;
use std::fmt;

/// How the coordinator talks to its worker processes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Method {
    /// One process per job, completion on exit
    Direct,
    /// Persistent workers over named pipes
    Fifo,
    /// Persistent workers over a System V message queue
    Mq,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Direct => "direct",
            Method::Fifo => "fifo",
            Method::Mq => "mq",
        };
        f.write_str(name)
    }
}

/// Start a pool of `pool_size` workers using `method`.
/// Must be called from within a tokio runtime.
pub fn create_binding(
    method: Method,
    program: &WorkerProgram,
    pool_size: usize,
    scratch: &ScratchLayout,
) -> Result<Box<dyn ChannelBinding>> {
    Ok(match method {
        Method::Direct => Box::new(SpawnPerJob::new(program.clone(), pool_size)?),
        Method::Fifo => Box::new(FifoPool::new(program, pool_size, &scratch.fifos_dir())?),
        Method::Mq => Box::new(MqPool::new(program, pool_size)?),
    })
}
