// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::thread;

pub const CPU_MULTIPLIER_RANGE: RangeInclusive<u8> = 1..=10;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root whose immediate subdirectories become directory jobs
    #[serde(default)]
    pub data_path: PathBuf,
    /// Scratch directory for partial and intermediate files
    #[serde(default)]
    pub temporary_directory: PathBuf,
    /// Final aggregated output, truncated at run start
    #[serde(default)]
    pub output_file: PathBuf,
    #[serde(default)]
    pub verbose: bool,
    /// Workers per available CPU (1-10)
    #[serde(default = "default_cpu_core_multiplier")]
    pub cpu_core_multiplier: u8,
    /// Explicit pool size, bypassing the CPU multiplier
    #[serde(default)]
    pub process_count: Option<usize>,
}

fn default_cpu_core_multiplier() -> u8 {
    2
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::new(),
            temporary_directory: PathBuf::new(),
            output_file: PathBuf::new(),
            verbose: false,
            cpu_core_multiplier: default_cpu_core_multiplier(),
            process_count: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Setup(format!("cannot read {}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Number of workers in the pool
    pub fn process_count(&self) -> usize {
        if let Some(count) = self.process_count {
            return count;
        }
        let cpus = thread::available_parallelism().map_or(1, |n| n.get());
        cpus * usize::from(self.cpu_core_multiplier)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.data_path.is_dir() {
            return Err(Error::Setup(format!(
                "data source {} is not a directory",
                self.data_path.display()
            )));
        }
        if !self.temporary_directory.is_dir() {
            return Err(Error::Setup(format!(
                "temporary directory {} is not a directory",
                self.temporary_directory.display()
            )));
        }
        if self.output_file.as_os_str().is_empty() || self.output_file.is_dir() {
            return Err(Error::Setup(format!(
                "output file {} is not a file path",
                self.output_file.display()
            )));
        }
        let output_dir = match self.output_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !output_dir.is_dir() {
            return Err(Error::Setup(format!(
                "output directory {} does not exist",
                output_dir.display()
            )));
        }
        if !CPU_MULTIPLIER_RANGE.contains(&self.cpu_core_multiplier) {
            return Err(Error::Setup(format!(
                "cpu core multiplier {} is outside {:?}",
                self.cpu_core_multiplier, CPU_MULTIPLIER_RANGE
            )));
        }
        if self.process_count == Some(0) {
            return Err(Error::Setup("process count must be positive".into()));
        }
        Ok(())
    }

    pub fn print_summary(&self) {
        println!("Current configuration:");
        println!("\tData source: {}", self.data_path.display());
        println!("\tTemporary directory: {}", self.temporary_directory.display());
        println!("\tOutput file: {}", self.output_file.display());
        println!("\tVerbose mode is {}", if self.verbose { "on" } else { "off" });
        println!("\tCPU multiplier is {}", self.cpu_core_multiplier);
        println!("\tProcess count is {}", self.process_count());
    }
}
