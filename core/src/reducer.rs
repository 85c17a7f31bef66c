// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::Result;
use crate::scratch::sync_directory;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Stage one: concatenate every partial listing in `partials_dir` into `destination`.
///
/// Files are visited sorted by name and copied whole, so lines from different
/// partials are never interleaved. `destination` itself is skipped if it lives
/// in the same directory. Returns the number of lines written.
pub fn reduce_listings(partials_dir: &Path, destination: &Path) -> Result<usize> {
    let mut partials = Vec::new();
    for entry in fs::read_dir(partials_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() || is_same_file(&path, destination) {
            continue;
        }
        partials.push(path);
    }
    partials.sort();

    let file = fs::File::create(destination)?;
    let mut output = BufWriter::new(file);
    let mut lines = 0;

    let mut line = Vec::new();
    for partial in &partials {
        let mut reader = BufReader::new(fs::File::open(partial)?);
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            if !line.ends_with(b"\n") {
                line.push(b'\n');
            }
            output.write_all(&line)?;
            lines += 1;
        }
    }

    let file = output.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        sync_directory(parent)?;
    }

    info!(partials = partials.len(), lines, "listings reduced");
    Ok(lines)
}

fn is_same_file(candidate: &Path, destination: &Path) -> bool {
    if candidate == destination {
        return true;
    }
    match (candidate.canonicalize(), destination.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Recipients of one sender with their occurrence counts
pub type Recipients = BTreeMap<String, u32>;

/// Sender to recipient occurrence counts.
///
/// Both levels are ordered maps: serialization is sorted by sender, then by
/// recipient, independent of the order lines were recorded in.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SenderAggregate {
    senders: BTreeMap<String, Recipients>,
}

impl SenderAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one `sender recipient...` line.
    /// Returns false when the line holds no token and was skipped.
    pub fn record_line(&mut self, line: &str) -> bool {
        let mut tokens = line.split_whitespace();
        let Some(sender) = tokens.next() else {
            return false;
        };

        let recipients = self.senders.entry(sender.to_string()).or_default();
        for recipient in tokens {
            *recipients.entry(recipient.to_string()).or_insert(0) += 1;
        }
        true
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    pub fn recipients(&self, sender: &str) -> Option<&Recipients> {
        self.senders.get(sender)
    }

    /// Write one line per sender: `sender count:recipient count:recipient...`
    pub fn write_to<W: Write>(&self, mut output: W) -> io::Result<()> {
        for (sender, recipients) in &self.senders {
            output.write_all(sender.as_bytes())?;
            for (recipient, count) in recipients {
                write!(output, " {}:{}", count, recipient)?;
            }
            output.write_all(b"\n")?;
        }
        output.flush()
    }

    pub fn read_from<R: BufRead>(&mut self, input: R) -> io::Result<usize> {
        let mut skipped = 0;
        for line in input.lines() {
            if !self.record_line(&line?) {
                skipped += 1;
            }
        }
        Ok(skipped)
    }
}

/// Stage two: aggregate the per-message lines of `input` into `output`.
/// Returns the number of distinct senders written.
pub fn reduce_messages(input: &Path, output: &Path) -> Result<usize> {
    let mut aggregate = SenderAggregate::new();
    let skipped = aggregate.read_from(BufReader::new(fs::File::open(input)?))?;
    if skipped > 0 {
        debug!(skipped, "skipped empty message records");
    }

    let file = fs::File::create(output)?;
    aggregate.write_to(BufWriter::new(file))?;

    info!(senders = aggregate.len(), "messages reduced");
    Ok(aggregate.len())
}
