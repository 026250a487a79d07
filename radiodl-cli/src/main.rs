use std::{sync::Arc, time::Instant};

use clap::Parser;
use error::AppError;
use radiodl_engine::OnProgress;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::FmtSubscriber;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

mod cli;
mod config;
mod error;
mod utils;

use cli::CliArgs;
use utils::progress::ProgressManager;
use utils::{create_dirs, default_output_dir, format_duration};

fn main() {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = bootstrap(args) {
        eprintln!("Error: {e}");
        // Log the full error for debugging
        error!(error = ?e, "Application failed");
        std::process::exit(1);
    }
}

fn init_logging(args: &CliArgs) -> Result<(), AppError> {
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&args.log_file)?;

    // Keep the terminal quiet while the progress bar owns it.
    let stdout = if args.show_progress {
        BoxMakeWriter::new(std::io::stdout.with_max_level(Level::WARN))
    } else {
        BoxMakeWriter::new(std::io::stdout)
    };
    let multi_writer = stdout.and(log_file);

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(multi_writer)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AppError::Initialization(e.to_string()))
}

#[tokio::main]
async fn bootstrap(args: CliArgs) -> Result<(), AppError> {
    init_logging(&args)?;

    info!("radiodl {} - segmented radio show downloader", env!("CARGO_PKG_VERSION"));
    info!("==================================================================");

    let (source, output_dir) = args.resolve_inputs()?;
    let output_dir = output_dir.unwrap_or_else(default_output_dir);

    info!(
        "HTTP timeout configuration: overall={}s, connect={}s",
        args.timeout, args.connect_timeout
    );

    let progress_manager = if args.show_progress {
        ProgressManager::new()
    } else {
        ProgressManager::new_disabled()
    };

    let mut downloader = config::build_downloader(&args)?;
    info!(ffmpeg = %downloader.tool().path().display(), "Using ffmpeg");

    if !progress_manager.is_disabled() {
        let on_progress: OnProgress = Arc::new(move |event| {
            progress_manager.handle_event(event);
        });
        downloader = downloader.with_progress(on_progress);
    }

    create_dirs(&output_dir).await?;
    info!(source = %source, output_dir = %output_dir.display(), "Starting download");

    let start = Instant::now();
    let output = tokio::select! {
        result = downloader.run(&source, &output_dir) => result?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, discarding partial download");
            return Err(AppError::Interrupted);
        }
    };

    info!(
        output = %output.display(),
        "Download finished in {}",
        format_duration(start.elapsed().as_secs_f64())
    );
    Ok(())
}
