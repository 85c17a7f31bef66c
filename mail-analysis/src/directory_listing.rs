// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Append the full path of every regular file below `directory` to `destination`.
///
/// Entries are visited sorted by name. Unreadable subdirectories are skipped.
/// Paths are written as raw bytes, one per line. Returns the number of paths
/// written.
pub fn write_listing(directory: &Path, destination: &Path) -> io::Result<usize> {
    let mut files = Vec::new();
    for entry in WalkDir::new(directory)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                debug!(error = %e, "unreadable entry skipped");
                continue;
            }
        };
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(destination)?;
    let mut output = BufWriter::new(file);
    write_paths(&mut output, &files)?;
    output.flush()?;
    Ok(files.len())
}

fn write_paths<W: Write>(output: &mut W, files: &[PathBuf]) -> io::Result<()> {
    for path in files {
        output.write_all(path.as_os_str().as_bytes())?;
        output.write_all(b"\n")?;
    }
    Ok(())
}
