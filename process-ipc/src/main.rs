// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mail_scan_analysis::MailAnalysis;
use mail_scan_core::config::Config;
use mail_scan_core::pipeline::{prepare_run, run_analysis, AnalysisPaths};
use mail_scan_core::scratch::ScratchLayout;
use mail_scan_core::WorkerId;
use mail_scan_process_ipc::binding::{create_binding, Method};
use mail_scan_process_ipc::worker::{run_fifo_worker, run_job_process, run_mq_worker};
use mail_scan_process_ipc::worker_process::WorkerProgram;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Count who mails whom in a mail directory tree", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// JSON configuration file; command line values override it
    #[arg(short = 'f', long = "config")]
    config: Option<PathBuf>,

    /// Root directory of the mail tree
    #[arg(short = 'd', long = "data")]
    data_path: Option<PathBuf>,

    /// Scratch directory for intermediate files
    #[arg(short = 't', long = "temp")]
    temporary_directory: Option<PathBuf>,

    /// Final output file
    #[arg(short = 'o', long = "output")]
    output_file: Option<PathBuf>,

    /// Workers per CPU core
    #[arg(short = 'c', long = "cpu-multiplier")]
    cpu_core_multiplier: Option<u8>,

    /// Exact number of workers
    #[arg(short = 'n', long = "processes")]
    process_count: Option<usize>,

    #[arg(short = 'v', long)]
    verbose: bool,

    /// Worker transport
    #[arg(short = 'm', long, value_enum, default_value_t = Method::Fifo)]
    method: Method,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Internal: run as a worker process
    #[command(hide = true)]
    Worker {
        #[command(subcommand)]
        kind: WorkerKind,
    },
}

#[derive(Subcommand)]
enum WorkerKind {
    /// Execute one job and exit
    Job {
        #[arg(long)]
        id: WorkerId,
        #[arg(long)]
        job: String,
    },
    /// Serve jobs from a command FIFO until shutdown
    Fifo {
        #[arg(long)]
        id: WorkerId,
        #[arg(long)]
        commands: PathBuf,
        #[arg(long)]
        notify: PathBuf,
    },
    /// Serve jobs from a message queue topic until shutdown
    Mq {
        #[arg(long)]
        id: WorkerId,
        #[arg(long)]
        queue: i32,
    },
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Some(Command::Worker { ref kind }) => {
            init_logging("warn");
            run_worker(kind).await
        }
        None => match load_config(&cli) {
            Ok(config) => {
                init_logging(if config.verbose { "debug" } else { "info" });
                run_coordinator(cli.method, config).await
            }
            Err(e) => {
                init_logging("info");
                Err(e)
            }
        },
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_worker(kind: &WorkerKind) -> Result<()> {
    let handlers = Arc::new(MailAnalysis);
    match kind {
        WorkerKind::Job { id, job } => run_job_process(*id, job, handlers)
            .await
            .with_context(|| format!("job process {} failed", id)),
        WorkerKind::Fifo {
            id,
            commands,
            notify,
        } => run_fifo_worker(*id, commands, notify, handlers)
            .await
            .map(drop)
            .with_context(|| format!("fifo worker {} failed", id)),
        WorkerKind::Mq { id, queue } => run_mq_worker(*id, *queue, handlers)
            .await
            .map(drop)
            .with_context(|| format!("mq worker {} failed", id)),
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(data_path) = &cli.data_path {
        config.data_path = data_path.clone();
    }
    if let Some(temporary_directory) = &cli.temporary_directory {
        config.temporary_directory = temporary_directory.clone();
    }
    if let Some(output_file) = &cli.output_file {
        config.output_file = output_file.clone();
    }
    if let Some(multiplier) = cli.cpu_core_multiplier {
        config.cpu_core_multiplier = multiplier;
    }
    if cli.process_count.is_some() {
        config.process_count = cli.process_count;
    }
    config.verbose |= cli.verbose;

    config.validate().context("invalid configuration")?;
    Ok(config)
}

async fn run_coordinator(method: Method, config: Config) -> Result<()> {
    let start_time = Instant::now();
    config.print_summary();

    let paths = AnalysisPaths {
        data_path: config.data_path.clone(),
        scratch: ScratchLayout::new(&config.temporary_directory),
        output_file: config.output_file.clone(),
    };
    prepare_run(&paths).context("failed to prepare the run")?;

    let program = WorkerProgram::current().context("cannot locate the worker executable")?;
    let pool_size = config.process_count();
    info!(method = %method, pool_size, "starting worker pool");

    let mut binding = create_binding(method, &program, pool_size, &paths.scratch)
        .context("failed to start the worker pool")?;
    let report = run_analysis(binding.as_mut(), &paths)
        .await
        .context("analysis failed")?;

    info!(
        directories = report.directories.dispatched,
        files = report.files.dispatched,
        listed_files = report.listed_files,
        senders = report.senders,
        workers_used = report.files.workers_used(),
        elapsed = ?start_time.elapsed(),
        output = %paths.output_file.display(),
        "analysis complete"
    );
    Ok(())
}
