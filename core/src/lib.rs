// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod channel_binding;
pub mod config;
pub mod error;
pub mod job;
pub mod job_handlers;
pub mod job_source;
pub mod pipeline;
pub mod reducer;
pub mod scheduler;
pub mod scratch;
pub mod task_pool;
pub mod worker_io;
pub mod worker_loop;

pub use error::{Error, Result};
pub use job::{Completion, Job, WorkerId};
