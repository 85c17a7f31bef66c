// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::Result;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const LISTINGS_DIR: &str = "listings";
pub const FIFOS_DIR: &str = "fifos";
pub const STEP1_OUTPUT: &str = "step1_output";
pub const STEP2_OUTPUT: &str = "step2_output";

/// Paths of intermediate files under the temporary directory
#[derive(Debug, Clone)]
pub struct ScratchLayout {
    root: PathBuf,
}

impl ScratchLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Per-directory partial listings written during the first pass
    pub fn listings_dir(&self) -> PathBuf {
        self.root.join(LISTINGS_DIR)
    }

    pub fn fifos_dir(&self) -> PathBuf {
        self.root.join(FIFOS_DIR)
    }

    pub fn step1_output(&self) -> PathBuf {
        self.root.join(STEP1_OUTPUT)
    }

    pub fn step2_output(&self) -> PathBuf {
        self.root.join(STEP2_OUTPUT)
    }

    /// Remove what a previous run left and recreate an empty layout.
    pub fn prepare(&self) -> Result<()> {
        remove_dir_if_exists(&self.listings_dir())?;
        remove_file_if_exists(&self.step1_output())?;
        fs::create_dir_all(self.listings_dir())?;
        fs::File::create(self.step2_output())?;
        Ok(())
    }
}

fn remove_dir_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn remove_file_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Flush directory metadata so files created in it are durable.
pub fn sync_directory(path: &Path) -> io::Result<()> {
    fs::File::open(path)?.sync_all()
}
