// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod common;

use common::BINARY;
use mail_scan_core::{Completion, Job};
use mail_scan_process_ipc::message_queue::{worker_topic, MessageQueue, COMPLETION_TOPIC};
use mail_scan_process_ipc::record::decode;
use nix::sys::stat::Mode;
use nix::unistd::mkfifo;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command};

/// Both FIFOs of one worker, held open read-write as the coordinator holds them.
struct FifoEnds {
    commands: File,
    notify: BufReader<File>,
    paths: (PathBuf, PathBuf),
}

fn open_fifo_ends(dir: &Path) -> FifoEnds {
    let commands = dir.join("commands-0");
    let notify = dir.join("notify-0");
    for path in [&commands, &notify] {
        mkfifo(path, Mode::S_IRUSR | Mode::S_IWUSR).unwrap();
    }
    let open = |path: &Path| OpenOptions::new().read(true).write(true).open(path).unwrap();
    FifoEnds {
        commands: open(&commands),
        notify: BufReader::new(open(&notify)),
        paths: (commands, notify),
    }
}

fn spawn_fifo_worker(ends: &FifoEnds) -> Child {
    Command::new(BINARY)
        .args(["worker", "fifo", "--id", "0", "--commands"])
        .arg(&ends.paths.0)
        .arg("--notify")
        .arg(&ends.paths.1)
        .spawn()
        .unwrap()
}

#[test]
fn test_job_process_executes_its_job() {
    // Arrange
    let root = tempfile::tempdir().unwrap();
    let source = root.path().join("1.");
    let destination = root.path().join("out");
    fs::write(&source, "From: a@example.com\nTo: b@example.com\n\n").unwrap();
    let job = serde_json::to_string(&Job::AnalyzeFile {
        source,
        destination: destination.clone(),
    })
    .unwrap();

    // Act
    let status = Command::new(BINARY)
        .args(["worker", "job", "--id", "0", "--job", &job])
        .status()
        .unwrap();

    // Assert
    assert!(status.success());
    assert_eq!(
        fs::read_to_string(&destination).unwrap(),
        "a@example.com b@example.com\n"
    );
}

#[test]
fn test_job_process_rejects_malformed_job() {
    // Act
    let status = Command::new(BINARY)
        .args(["worker", "job", "--id", "0", "--job", "{not json"])
        .status()
        .unwrap();

    // Assert
    assert!(!status.success());
}

#[test]
fn test_mq_worker_completes_then_stops_on_shutdown() {
    // Arrange
    let root = tempfile::tempdir().unwrap();
    let queue = MessageQueue::create().unwrap();
    let mut child = Command::new(BINARY)
        .args(["worker", "mq", "--id", "3", "--queue", &queue.id().to_string()])
        .spawn()
        .unwrap();
    let job = Job::ScanDirectory {
        source: root.path().to_path_buf(),
        destination: root.path().join("listing"),
    };

    // Act
    queue
        .send(worker_topic(3), &serde_json::to_vec(&job).unwrap())
        .unwrap();
    let completion: Completion = decode(3, &queue.receive(COMPLETION_TOPIC).unwrap()).unwrap();
    queue
        .send(worker_topic(3), &serde_json::to_vec(&Job::Shutdown).unwrap())
        .unwrap();
    let status = child.wait().unwrap();

    // Assert
    assert_eq!(completion, Completion { worker: 3 });
    assert!(status.success());
    queue.remove().unwrap();
}

#[test]
fn test_mq_worker_exits_on_garbage_record() {
    // Arrange
    let queue = MessageQueue::create().unwrap();
    let mut child = Command::new(BINARY)
        .args(["worker", "mq", "--id", "0", "--queue", &queue.id().to_string()])
        .spawn()
        .unwrap();

    // Act
    queue.send(worker_topic(0), b"garbage").unwrap();
    let status = child.wait().unwrap();

    // Assert
    assert!(!status.success());
    queue.remove().unwrap();
}

#[test]
fn test_fifo_worker_completes_then_stops_on_shutdown() {
    // Arrange
    let root = tempfile::tempdir().unwrap();
    let mut ends = open_fifo_ends(root.path());
    let mut child = spawn_fifo_worker(&ends);
    let job = Job::ScanDirectory {
        source: root.path().join("missing"),
        destination: root.path().join("listing"),
    };

    // Act
    let mut record = serde_json::to_vec(&job).unwrap();
    record.push(b'\n');
    ends.commands.write_all(&record).unwrap();
    let mut line = String::new();
    ends.notify.read_line(&mut line).unwrap();
    ends.commands.write_all(b"{\"kind\":\"shutdown\"}\n").unwrap();
    let status = child.wait().unwrap();

    // Assert
    let completion: Completion = decode(0, line.trim_end().as_bytes()).unwrap();
    assert_eq!(completion, Completion { worker: 0 });
    assert!(status.success());
}

#[test]
fn test_fifo_worker_exits_on_garbage_record() {
    // Arrange
    let root = tempfile::tempdir().unwrap();
    let mut ends = open_fifo_ends(root.path());
    let mut child = spawn_fifo_worker(&ends);

    // Act
    ends.commands.write_all(b"garbage\n").unwrap();
    let status = child.wait().unwrap();

    // Assert
    assert!(!status.success());
}
