// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use mail_scan_core::job_source::{directory_jobs, file_jobs};
use mail_scan_core::Job;
use std::ffi::OsStr;
use std::fs;
use std::os::unix::ffi::OsStrExt;

#[test]
fn test_directory_jobs_sorted_and_filtered() {
    // Arrange
    let scratch = tempfile::tempdir().unwrap();
    let data = scratch.path().join("data");
    for name in ["kean-s", "allen-p", "lay-k"] {
        fs::create_dir_all(data.join(name)).unwrap();
    }
    fs::write(data.join("README"), "not a mailbox").unwrap();
    let listings = scratch.path().join("listings");

    // Act
    let jobs = directory_jobs(&data, &listings).unwrap();

    // Assert
    assert_eq!(
        jobs,
        vec![
            Job::ScanDirectory {
                source: data.join("allen-p"),
                destination: listings.join("allen-p"),
            },
            Job::ScanDirectory {
                source: data.join("kean-s"),
                destination: listings.join("kean-s"),
            },
            Job::ScanDirectory {
                source: data.join("lay-k"),
                destination: listings.join("lay-k"),
            },
        ]
    );
}

#[test]
fn test_directory_jobs_missing_root_fails() {
    // Arrange
    let scratch = tempfile::tempdir().unwrap();

    // Act
    let result = directory_jobs(&scratch.path().join("missing"), scratch.path());

    // Assert
    assert!(result.is_err());
}

#[test]
fn test_file_jobs_skip_missing_and_directories() {
    // Arrange
    let scratch = tempfile::tempdir().unwrap();
    let mail = scratch.path().join("1.");
    fs::write(&mail, "From: a@x.com\n").unwrap();
    let listing = scratch.path().join("step1_output");
    fs::write(
        &listing,
        format!(
            "{}\n{}\n\n{}\n",
            mail.display(),
            scratch.path().join("gone").display(),
            scratch.path().display()
        ),
    )
    .unwrap();
    let destination = scratch.path().join("step2_output");

    // Act
    let jobs = file_jobs(&listing, &destination).unwrap();

    // Assert
    assert_eq!(
        jobs,
        vec![Job::AnalyzeFile {
            source: mail,
            destination,
        }]
    );
}

#[test]
fn test_file_jobs_keep_non_utf8_names() {
    // Arrange
    let scratch = tempfile::tempdir().unwrap();
    let mail = scratch.path().join(OsStr::from_bytes(b"mail\xff."));
    fs::write(&mail, "From: a@x.com\n").unwrap();
    let listing = scratch.path().join("step1_output");
    let mut contents = mail.as_os_str().as_bytes().to_vec();
    contents.push(b'\n');
    fs::write(&listing, contents).unwrap();
    let destination = scratch.path().join("step2_output");

    // Act
    let jobs = file_jobs(&listing, &destination).unwrap();

    // Assert
    assert_eq!(
        jobs,
        vec![Job::AnalyzeFile {
            source: mail,
            destination,
        }]
    );
}
