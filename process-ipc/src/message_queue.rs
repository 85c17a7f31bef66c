// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use mail_scan_core::WorkerId;
use std::io;
use std::ptr;

/// Largest record a single message can carry
pub const PAYLOAD_CAPACITY: usize = 4096;

/// Topic on which every worker reports completions
pub const COMPLETION_TOPIC: i64 = 1;

/// Topic on which `worker` receives its jobs. Never collides with completions.
pub fn worker_topic(worker: WorkerId) -> i64 {
    worker as i64 + 2
}

#[repr(C)]
struct RawMessage {
    mtype: libc::c_long,
    mtext: [u8; PAYLOAD_CAPACITY],
}

/// Handle to a System V message queue.
///
/// Handles are plain ids: copying one does not own the queue, and dropping one
/// does not remove it. The creator calls [`MessageQueue::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageQueue {
    id: libc::c_int,
}

impl MessageQueue {
    /// Create a private queue readable and writable by the current user.
    pub fn create() -> io::Result<Self> {
        let id = unsafe { libc::msgget(libc::IPC_PRIVATE, libc::IPC_CREAT | 0o600) };
        if id < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { id })
    }

    /// Attach to a queue created by another process.
    pub fn from_id(id: i32) -> Self {
        Self { id }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    /// Send `payload` on `topic`. Blocks while the queue is full.
    pub fn send(&self, topic: i64, payload: &[u8]) -> io::Result<()> {
        if topic <= 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("topic {} is not positive", topic),
            ));
        }
        if payload.len() > PAYLOAD_CAPACITY {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "payload of {} bytes exceeds {} bytes",
                    payload.len(),
                    PAYLOAD_CAPACITY
                ),
            ));
        }

        let mut message = RawMessage {
            mtype: topic as libc::c_long,
            mtext: [0; PAYLOAD_CAPACITY],
        };
        message.mtext[..payload.len()].copy_from_slice(payload);

        loop {
            let rc = unsafe {
                libc::msgsnd(
                    self.id,
                    ptr::addr_of!(message).cast(),
                    payload.len(),
                    0,
                )
            };
            if rc == 0 {
                return Ok(());
            }
            let error = io::Error::last_os_error();
            if error.kind() != io::ErrorKind::Interrupted {
                return Err(error);
            }
        }
    }

    /// Block until a message arrives on `topic` and return its payload.
    /// Fails with `EIDRM` once the queue is removed.
    pub fn receive(&self, topic: i64) -> io::Result<Vec<u8>> {
        if topic <= 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("topic {} is not positive", topic),
            ));
        }

        let mut message = RawMessage {
            mtype: 0,
            mtext: [0; PAYLOAD_CAPACITY],
        };

        loop {
            let received = unsafe {
                libc::msgrcv(
                    self.id,
                    ptr::addr_of_mut!(message).cast(),
                    PAYLOAD_CAPACITY,
                    topic as libc::c_long,
                    0,
                )
            };
            if received >= 0 {
                return Ok(message.mtext[..received as usize].to_vec());
            }
            let error = io::Error::last_os_error();
            if error.kind() != io::ErrorKind::Interrupted {
                return Err(error);
            }
        }
    }

    /// Destroy the queue. Blocked receivers wake up with an error.
    pub fn remove(&self) -> io::Result<()> {
        let rc = unsafe { libc::msgctl(self.id, libc::IPC_RMID, ptr::null_mut()) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

/// True when `error` means the queue no longer exists.
pub fn is_removed(error: &io::Error) -> bool {
    matches!(
        error.raw_os_error(),
        Some(libc::EIDRM) | Some(libc::EINVAL)
    )
}
