// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::channel_binding::ChannelBinding;
use crate::error::Result;
use crate::job_source::{directory_jobs, file_jobs};
use crate::reducer::{reduce_listings, reduce_messages};
use crate::scheduler::{run_pass, PassReport};
use crate::scratch::{sync_directory, ScratchLayout};
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

/// Inputs and outputs of one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisPaths {
    pub data_path: PathBuf,
    pub scratch: ScratchLayout,
    pub output_file: PathBuf,
}

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub directories: PassReport,
    pub listed_files: usize,
    pub files: PassReport,
    pub senders: usize,
}

/// Truncate the final output and reset the scratch layout.
/// Called before any worker exists so a failure leaves nothing to clean up.
pub fn prepare_run(paths: &AnalysisPaths) -> Result<()> {
    fs::File::create(&paths.output_file)?;
    paths.scratch.prepare()
}

/// Run both passes and both reductions over `binding`, then shut it down.
///
/// The pool is shut down even when a pass fails; the pass error wins over a
/// shutdown error.
pub async fn run_analysis<B>(binding: &mut B, paths: &AnalysisPaths) -> Result<AnalysisReport>
where
    B: ChannelBinding + ?Sized,
{
    let passes = run_passes(binding, paths).await;

    info!("closing worker pool");
    let shutdown = binding.shutdown().await;

    let (directories, listed_files, files) = match (passes, shutdown) {
        (Ok(passes), Ok(())) => passes,
        (Err(e), shutdown) => {
            if let Err(shutdown_error) = shutdown {
                error!(error = %shutdown_error, "pool shutdown failed after pass error");
            }
            return Err(e);
        }
        (Ok(_), Err(e)) => return Err(e),
    };

    info!("reducing messages");
    let senders = reduce_messages(&paths.scratch.step2_output(), &paths.output_file)?;

    Ok(AnalysisReport {
        directories,
        listed_files,
        files,
        senders,
    })
}

async fn run_passes<B>(binding: &mut B, paths: &AnalysisPaths) -> Result<(PassReport, usize, PassReport)>
where
    B: ChannelBinding + ?Sized,
{
    let scratch = &paths.scratch;

    info!(data = %paths.data_path.display(), "processing directories");
    let jobs = directory_jobs(&paths.data_path, &scratch.listings_dir())?;
    let directories = run_pass(binding, jobs).await?;
    sync_directory(&scratch.listings_dir())?;

    info!("reducing file listings");
    let listed_files = reduce_listings(&scratch.listings_dir(), &scratch.step1_output())?;

    info!(files = listed_files, "processing files");
    let jobs = file_jobs(&scratch.step1_output(), &scratch.step2_output())?;
    let files = run_pass(binding, jobs).await?;
    sync_directory(scratch.root())?;

    Ok((directories, listed_files, files))
}
