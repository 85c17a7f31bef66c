// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::Result;
use crate::job::Job;
use std::fs;
use std::ffi::OsStr;
use std::io::{BufRead, BufReader};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use tracing::debug;

/// One `ScanDirectory` job per immediate subdirectory of `root`, sorted by name.
///
/// Each job writes its listing to `listings_dir/<subdirectory name>`.
/// Entries that are not directories are skipped.
pub fn directory_jobs(root: &Path, listings_dir: &Path) -> Result<Vec<Job>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if entry.path().is_dir() {
            names.push(entry.file_name());
        } else {
            debug!(path = %entry.path().display(), "skipping non-directory entry");
        }
    }
    names.sort();

    Ok(names
        .into_iter()
        .map(|name| Job::ScanDirectory {
            source: root.join(&name),
            destination: listings_dir.join(&name),
        })
        .collect())
}

/// One `AnalyzeFile` job per line of `listing` naming an existing regular file.
///
/// Lines are raw path bytes, so names need not be valid UTF-8.
/// Every job appends to the same `destination`.
pub fn file_jobs(listing: &Path, destination: &Path) -> Result<Vec<Job>> {
    let reader = BufReader::new(fs::File::open(listing)?);
    let mut jobs = Vec::new();
    for line in reader.split(b'\n') {
        let line = line?;
        let line = line.strip_suffix(b"\r").unwrap_or(&line);
        let path = Path::new(OsStr::from_bytes(line));
        if line.is_empty() || !path.is_file() {
            debug!(path = %path.display(), "skipping listing entry");
            continue;
        }
        jobs.push(Job::AnalyzeFile {
            source: path.to_path_buf(),
            destination: destination.to_path_buf(),
        });
    }
    Ok(jobs)
}
