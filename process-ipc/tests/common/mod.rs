// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(dead_code)]

use mail_scan_core::Job;
use mail_scan_process_ipc::worker_process::WorkerProgram;
use std::fs;
use std::path::{Path, PathBuf};

pub const BINARY: &str = env!("CARGO_BIN_EXE_mail-scan");

pub fn program() -> WorkerProgram {
    WorkerProgram::new(BINARY)
}

/// `count` single-recipient mails with distinct senders, as analysis jobs
/// appending to `destination`.
pub fn mail_jobs(dir: &Path, count: usize, destination: &Path) -> Vec<Job> {
    fs::create_dir_all(dir).unwrap();
    (0..count)
        .map(|i| {
            let source = dir.join(format!("{}.", i));
            fs::write(
                &source,
                format!(
                    "Message-ID: <{}@example.com>\nFrom: sender{}@example.com\nTo: inbox@example.com\n\nbody\n",
                    i, i
                ),
            )
            .unwrap();
            Job::AnalyzeFile {
                source,
                destination: destination.to_path_buf(),
            }
        })
        .collect()
}

/// Lines of `destination`, sorted.
pub fn sorted_lines(destination: &Path) -> Vec<String> {
    let mut lines: Vec<String> = fs::read_to_string(destination)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect();
    lines.sort();
    lines
}

pub fn expected_records(count: usize) -> Vec<String> {
    let mut records: Vec<String> = (0..count)
        .map(|i| format!("sender{}@example.com inbox@example.com", i))
        .collect();
    records.sort();
    records
}

/// A small mailbox tree: two users, one mail without a sender.
pub fn write_mailboxes(root: &Path) -> PathBuf {
    let data = root.join("maildir");
    let files = [
        (
            "allen-p/inbox/1.",
            "From: alice@example.com\nTo: bob@example.com,\n\tcarol@example.com\nSubject: hi\n\nTo: nobody@example.com\n",
        ),
        (
            "allen-p/inbox/2.",
            "From: alice@example.com\nTo: bob@example.com\n\n",
        ),
        (
            "bass-e/sent/1.",
            "From: \"Bob\" <bob@example.com>\nTo: alice@example.com\nCc: dave@example.com\n\n",
        ),
        ("bass-e/notes", "no headers here\n"),
    ];
    for (name, contents) in files {
        let path = data.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
    data
}

pub const EXPECTED_OUTPUT: &str = "alice@example.com 2:bob@example.com 1:carol@example.com\n\
bob@example.com 1:alice@example.com 1:dave@example.com\n";
