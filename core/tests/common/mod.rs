// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(dead_code)]

use async_trait::async_trait;
use mail_scan_core::channel_binding::ChannelBinding;
use mail_scan_core::job_handlers::JobHandlers;
use mail_scan_core::{Error, Job, Result, WorkerId};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Handlers with trivial semantics: listings of file names, and files whose
/// first line is already a `sender recipient...` record.
#[derive(Default)]
pub struct CopyHandlers {
    pub executed: Mutex<Vec<PathBuf>>,
}

impl CopyHandlers {
    pub fn executed(&self) -> Vec<PathBuf> {
        self.executed.lock().unwrap().clone()
    }
}

fn append(destination: &Path, line: &str) {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(destination)
        .unwrap();
    file.write_all(format!("{}\n", line).as_bytes()).unwrap();
}

fn list_files(directory: &Path, out: &mut Vec<PathBuf>) {
    let mut entries: Vec<_> = fs::read_dir(directory)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    entries.sort();
    for path in entries {
        if path.is_dir() {
            list_files(&path, out);
        } else {
            out.push(path);
        }
    }
}

impl JobHandlers for CopyHandlers {
    fn scan_directory(&self, directory: &Path, destination: &Path) {
        self.executed.lock().unwrap().push(directory.to_path_buf());
        let mut files = Vec::new();
        list_files(directory, &mut files);
        for file in files {
            append(destination, &file.display().to_string());
        }
    }

    fn analyze_file(&self, file: &Path, destination: &Path) {
        self.executed.lock().unwrap().push(file.to_path_buf());
        let contents = fs::read_to_string(file).unwrap();
        if let Some(line) = contents.lines().next() {
            append(destination, line);
        }
    }
}

/// Binding that never runs anything: jobs complete in reverse dispatch order.
pub struct FakeBinding {
    pub pool_size: usize,
    pub in_flight: Vec<(WorkerId, Job)>,
    pub dispatched: Vec<(WorkerId, Job)>,
    pub max_in_flight: usize,
    pub injected: Vec<WorkerId>,
    pub shutdowns: usize,
}

impl FakeBinding {
    pub fn new(pool_size: usize) -> Self {
        Self {
            pool_size,
            in_flight: Vec::new(),
            dispatched: Vec::new(),
            max_in_flight: 0,
            injected: Vec::new(),
            shutdowns: 0,
        }
    }
}

#[async_trait]
impl ChannelBinding for FakeBinding {
    fn pool_size(&self) -> usize {
        self.pool_size
    }

    async fn dispatch(&mut self, worker: WorkerId, job: Job) -> Result<()> {
        assert!(worker < self.pool_size, "worker {} out of range", worker);
        assert!(
            self.in_flight.iter().all(|(busy, _)| *busy != worker),
            "worker {} dispatched while busy",
            worker
        );
        self.in_flight.push((worker, job.clone()));
        self.dispatched.push((worker, job));
        self.max_in_flight = self.max_in_flight.max(self.in_flight.len());
        Ok(())
    }

    async fn await_completion(&mut self) -> Result<WorkerId> {
        if let Some(worker) = self.injected.pop() {
            return Ok(worker);
        }
        self.in_flight
            .pop()
            .map(|(worker, _)| worker)
            .ok_or(Error::PoolClosed)
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.shutdowns += 1;
        Ok(())
    }
}

pub fn scan_jobs(count: usize) -> Vec<Job> {
    (0..count)
        .map(|i| Job::ScanDirectory {
            source: PathBuf::from(format!("/data/d{}", i)),
            destination: PathBuf::from(format!("/tmp/listings/d{}", i)),
        })
        .collect()
}

/// Two subdirectories `d1`, `d2`, each holding `f1.txt` and `f2.txt`.
pub fn write_mail_tree(root: &Path) {
    let records = [
        ("d1", "f1.txt", "a x y"),
        ("d1", "f2.txt", "a x"),
        ("d2", "f1.txt", "b x"),
        ("d2", "f2.txt", "c"),
    ];
    for (dir, file, record) in records {
        let dir = root.join(dir);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), format!("{}\n", record)).unwrap();
    }
}
