// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use nix::fcntl::{Flock, FlockArg};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Append `line` and a newline to `destination` under an exclusive advisory lock.
///
/// The lock covers this single append and is released when the guard drops.
pub fn append_line(destination: &Path, line: &str) -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(destination)?;
    let mut locked = Flock::lock(file, FlockArg::LockExclusive)
        .map_err(|(_, errno)| io::Error::from(errno))?;

    let mut record = String::with_capacity(line.len() + 1);
    record.push_str(line);
    record.push('\n');
    locked.write_all(record.as_bytes())?;
    locked.flush()
}
