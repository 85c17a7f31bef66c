// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::job::Job;
use std::path::Path;

/// The analysis performed by workers, one method per job kind.
///
/// Handlers degrade instead of failing: an unreadable source or destination
/// yields missing output, never an error, so a job always completes.
pub trait JobHandlers: Send + Sync + 'static {
    /// Append the full path of every regular file below `directory` to `destination`.
    fn scan_directory(&self, directory: &Path, destination: &Path);

    /// Append one `sender recipient...` line for the mail at `file` to `destination`.
    fn analyze_file(&self, file: &Path, destination: &Path);
}

/// Run the handler matching `job`. Returns false for the shutdown sentinel.
pub fn execute<H>(handlers: &H, job: &Job) -> bool
where
    H: JobHandlers + ?Sized,
{
    match job {
        Job::ScanDirectory {
            source,
            destination,
        } => {
            handlers.scan_directory(source, destination);
            true
        }
        Job::AnalyzeFile {
            source,
            destination,
        } => {
            handlers.analyze_file(source, destination);
            true
        }
        Job::Shutdown => false,
    }
}
