// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod binding;
pub mod direct_spawn;
pub mod fifo_channel;
pub mod fifo_pool;
pub mod message_queue;
pub mod mq_channel;
pub mod mq_pool;
mod pool_monitor;
pub mod record;
pub mod worker;
pub mod worker_process;
