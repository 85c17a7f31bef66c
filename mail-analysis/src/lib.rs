// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod directory_listing;
pub mod locked_append;
pub mod mail_headers;

use mail_scan_core::job_handlers::JobHandlers;
use std::path::Path;
use tracing::{debug, warn};

/// Job handlers of the mail scan: directory listings and header analysis.
#[derive(Debug, Default, Clone, Copy)]
pub struct MailAnalysis;

impl JobHandlers for MailAnalysis {
    fn scan_directory(&self, directory: &Path, destination: &Path) {
        match directory_listing::write_listing(directory, destination) {
            Ok(files) => debug!(directory = %directory.display(), files, "directory listed"),
            Err(e) => warn!(directory = %directory.display(), error = %e, "directory skipped"),
        }
    }

    fn analyze_file(&self, file: &Path, destination: &Path) {
        let headers = match mail_headers::parse_file(file) {
            Ok(Some(headers)) => headers,
            Ok(None) => {
                debug!(file = %file.display(), "no sender header");
                return;
            }
            Err(e) => {
                warn!(file = %file.display(), error = %e, "mail skipped");
                return;
            }
        };

        if let Err(e) = locked_append::append_line(destination, &headers.to_record()) {
            warn!(destination = %destination.display(), error = %e, "record lost");
        }
    }
}
